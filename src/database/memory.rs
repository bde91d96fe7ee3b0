//! In-memory database with per-connection snapshot workspaces
//!
//! Each connection that writes gets a private workspace: a copy of the
//! committed catalog taken at BEGIN, or at its first write when it is
//! auto-committing. Reads see the workspace when one exists. Auto-commit
//! publishes only the calling connection's workspace, so a conflict is
//! always reported to the connection whose work was discarded.
//!
//! Publishing a workspace is first-committer-wins per table. A table
//! written by the workspace must still carry the generation it had when
//! the snapshot was taken, otherwise the publish fails with
//! `WriteConflict` and the workspace is discarded.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::observability::{Event, Logger};
use crate::value::Value;

use super::errors::{DatabaseError, DatabaseResult};
use super::schema::TableDef;
use super::{ConnectionId, Database, RowKey, StoredRow, TransactionState};

#[derive(Debug, Clone)]
struct Table {
    def: TableDef,
    rows: BTreeMap<RowKey, Vec<Value>>,
    next_key: u64,
    /// Assigned on publish; unique across the lifetime of the database
    generation: u64,
}

impl Table {
    fn new(def: TableDef) -> Self {
        Self {
            def,
            rows: BTreeMap::new(),
            next_key: 1,
            generation: 0,
        }
    }
}

/// Tables keyed by lowercase name
#[derive(Debug, Clone, Default)]
struct Catalog {
    tables: BTreeMap<String, Table>,
}

impl Catalog {
    fn get(&self, name: &str) -> DatabaseResult<&Table> {
        self.tables
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| DatabaseError::TableNotFound(name.to_string()))
    }
}

#[derive(Debug, Clone)]
struct Workspace {
    catalog: Catalog,
    /// Generation of each written table as seen by the snapshot (`None` if absent)
    base: BTreeMap<String, Option<u64>>,
}

impl Workspace {
    fn snapshot(committed: &Catalog) -> Self {
        Self {
            catalog: committed.clone(),
            base: BTreeMap::new(),
        }
    }

    /// Record the snapshot generation of a table before its first write
    fn touch(&mut self, key: &str) {
        if !self.base.contains_key(key) {
            let generation = self.catalog.tables.get(key).map(|t| t.generation);
            self.base.insert(key.to_string(), generation);
        }
    }

    fn table_mut(&mut self, name: &str) -> DatabaseResult<&mut Table> {
        let key = name.to_ascii_lowercase();
        if !self.catalog.tables.contains_key(&key) {
            return Err(DatabaseError::TableNotFound(name.to_string()));
        }
        self.touch(&key);
        self.catalog
            .tables
            .get_mut(&key)
            .ok_or_else(|| DatabaseError::TableNotFound(name.to_string()))
    }
}

#[derive(Debug, Default)]
struct Session {
    state: TransactionState,
    workspace: Option<Workspace>,
}

#[derive(Debug, Default)]
struct State {
    committed: Catalog,
    sessions: HashMap<ConnectionId, Session>,
    next_generation: u64,
}

impl State {
    /// Apply a workspace to the committed catalog.
    ///
    /// All conflicts are checked before anything is applied.
    fn publish(&mut self, workspace: Workspace) -> DatabaseResult<()> {
        for (key, base) in &workspace.base {
            let current = self.committed.tables.get(key).map(|t| t.generation);
            if current != *base {
                Logger::event(Event::WriteConflict, &[("table", key.as_str())]);
                return Err(DatabaseError::WriteConflict(key.clone()));
            }
        }

        let Workspace { mut catalog, base } = workspace;
        for key in base.keys() {
            match catalog.tables.remove(key) {
                Some(mut table) => {
                    self.next_generation += 1;
                    table.generation = self.next_generation;
                    self.committed.tables.insert(key.clone(), table);
                }
                None => {
                    self.committed.tables.remove(key);
                }
            }
        }
        Ok(())
    }
}

/// In-memory `Database` implementation
///
/// Thread-safe; one instance is shared by all connections.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    state: RwLock<State>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DatabaseResult<RwLockReadGuard<'_, State>> {
        self.state.read().map_err(|_| DatabaseError::LockPoisoned)
    }

    fn write(&self) -> DatabaseResult<RwLockWriteGuard<'_, State>> {
        self.state.write().map_err(|_| DatabaseError::LockPoisoned)
    }

    /// Run a read against the connection's view of the catalog
    fn with_catalog<T>(
        &self,
        connection_id: ConnectionId,
        f: impl FnOnce(&Catalog) -> DatabaseResult<T>,
    ) -> DatabaseResult<T> {
        let state = self.read()?;
        let catalog = state
            .sessions
            .get(&connection_id)
            .and_then(|s| s.workspace.as_ref())
            .map(|w| &w.catalog)
            .unwrap_or(&state.committed);
        f(catalog)
    }

    /// Run a write against the connection's workspace, creating it if needed.
    ///
    /// `f` must validate everything before mutating. A workspace created
    /// for a write that fails is dropped again.
    fn with_workspace<T>(
        &self,
        connection_id: ConnectionId,
        f: impl FnOnce(&mut Workspace) -> DatabaseResult<T>,
    ) -> DatabaseResult<T> {
        let mut state = self.write()?;
        let State {
            committed,
            sessions,
            ..
        } = &mut *state;

        let session = sessions.entry(connection_id).or_default();
        let fresh = session.workspace.is_none();
        let workspace = session
            .workspace
            .get_or_insert_with(|| Workspace::snapshot(committed));

        let result = f(workspace);
        if result.is_err() && fresh {
            session.workspace = None;
        }
        result
    }
}

/// Check arity, NOT NULL and declared types of a row
fn conform_row(def: &TableDef, values: Vec<Value>) -> DatabaseResult<Vec<Value>> {
    if values.len() != def.columns.len() {
        return Err(DatabaseError::ConstraintViolation(format!(
            "table {} has {} columns but {} values were supplied",
            def.name,
            def.columns.len(),
            values.len()
        )));
    }

    def.columns
        .iter()
        .zip(values)
        .map(|(column, value)| {
            if column.not_null && value.is_null() {
                return Err(DatabaseError::ConstraintViolation(format!(
                    "NOT NULL constraint failed: {}.{}",
                    def.name, column.name
                )));
            }
            let type_name = value.type_name();
            value.coerce_to(column.data_type).ok_or_else(|| {
                DatabaseError::ConstraintViolation(format!(
                    "column {}.{} expects {}, found {}",
                    def.name, column.name, column.data_type, type_name
                ))
            })
        })
        .collect()
}

impl Database for MemoryDatabase {
    fn begin_transaction(&self, connection_id: ConnectionId) -> DatabaseResult<()> {
        let mut state = self.write()?;
        let State {
            committed,
            sessions,
            ..
        } = &mut *state;

        let session = sessions.entry(connection_id).or_default();
        if session.state == TransactionState::InTransaction {
            return Err(DatabaseError::AlreadyInTransaction(connection_id));
        }

        // Work not yet auto-committed becomes part of the transaction
        if session.workspace.is_none() {
            session.workspace = Some(Workspace::snapshot(committed));
        }
        session.state = TransactionState::InTransaction;
        Ok(())
    }

    fn commit_transaction(&self, connection_id: ConnectionId) -> DatabaseResult<()> {
        let mut state = self.write()?;

        let workspace = match state.sessions.get_mut(&connection_id) {
            Some(session) if session.state == TransactionState::InTransaction => {
                session.state = TransactionState::Idle;
                session.workspace.take()
            }
            _ => return Err(DatabaseError::NotInTransaction(connection_id)),
        };

        match workspace {
            Some(workspace) => state.publish(workspace),
            None => Ok(()),
        }
    }

    fn rollback_transaction(&self, connection_id: ConnectionId) -> DatabaseResult<()> {
        let mut state = self.write()?;

        match state.sessions.get_mut(&connection_id) {
            Some(session) if session.state == TransactionState::InTransaction => {
                session.state = TransactionState::Idle;
                session.workspace = None;
                Ok(())
            }
            _ => Err(DatabaseError::NotInTransaction(connection_id)),
        }
    }

    fn commit(&self, connection_id: ConnectionId) -> DatabaseResult<()> {
        let mut state = self.write()?;

        let workspace = match state.sessions.get_mut(&connection_id) {
            Some(session) if session.state == TransactionState::Idle => session.workspace.take(),
            _ => None,
        };

        match workspace {
            Some(workspace) => state.publish(workspace),
            None => Ok(()),
        }
    }

    fn transaction_state(&self, connection_id: ConnectionId) -> DatabaseResult<TransactionState> {
        let state = self.read()?;
        Ok(state
            .sessions
            .get(&connection_id)
            .map(|s| s.state)
            .unwrap_or_default())
    }

    fn disconnect(&self, connection_id: ConnectionId) -> DatabaseResult<()> {
        let mut state = self.write()?;
        state.sessions.remove(&connection_id);
        Ok(())
    }

    fn create_table(&self, connection_id: ConnectionId, table: TableDef) -> DatabaseResult<()> {
        if table.columns.is_empty() {
            return Err(DatabaseError::ConstraintViolation(format!(
                "table {} must have at least one column",
                table.name
            )));
        }
        for (i, column) in table.columns.iter().enumerate() {
            if table.column_index(&column.name) != Some(i) {
                return Err(DatabaseError::ConstraintViolation(format!(
                    "duplicate column {} in table {}",
                    column.name, table.name
                )));
            }
        }
        self.with_workspace(connection_id, |workspace| {
            let key = table.name.to_ascii_lowercase();
            if workspace.catalog.tables.contains_key(&key) {
                return Err(DatabaseError::TableExists(table.name.clone()));
            }
            workspace.touch(&key);
            workspace.catalog.tables.insert(key, Table::new(table));
            Ok(())
        })
    }

    fn drop_table(&self, connection_id: ConnectionId, name: &str) -> DatabaseResult<()> {
        self.with_workspace(connection_id, |workspace| {
            let key = name.to_ascii_lowercase();
            if !workspace.catalog.tables.contains_key(&key) {
                return Err(DatabaseError::TableNotFound(name.to_string()));
            }
            workspace.touch(&key);
            workspace.catalog.tables.remove(&key);
            Ok(())
        })
    }

    fn table(&self, connection_id: ConnectionId, name: &str) -> DatabaseResult<TableDef> {
        self.with_catalog(connection_id, |catalog| Ok(catalog.get(name)?.def.clone()))
    }

    fn scan(&self, connection_id: ConnectionId, table: &str) -> DatabaseResult<Vec<StoredRow>> {
        self.with_catalog(connection_id, |catalog| {
            Ok(catalog
                .get(table)?
                .rows
                .iter()
                .map(|(key, values)| StoredRow {
                    key: *key,
                    values: values.clone(),
                })
                .collect())
        })
    }

    fn insert_rows(
        &self,
        connection_id: ConnectionId,
        table: &str,
        rows: Vec<Vec<Value>>,
    ) -> DatabaseResult<usize> {
        self.with_workspace(connection_id, |workspace| {
            let def = workspace.catalog.get(table)?.def.clone();
            let rows = rows
                .into_iter()
                .map(|values| conform_row(&def, values))
                .collect::<DatabaseResult<Vec<_>>>()?;

            let count = rows.len();
            let target = workspace.table_mut(table)?;
            for values in rows {
                let key = RowKey(target.next_key);
                target.next_key += 1;
                target.rows.insert(key, values);
            }
            Ok(count)
        })
    }

    fn update_rows(
        &self,
        connection_id: ConnectionId,
        table: &str,
        rows: Vec<StoredRow>,
    ) -> DatabaseResult<usize> {
        self.with_workspace(connection_id, |workspace| {
            let existing = workspace.catalog.get(table)?;
            let def = existing.def.clone();
            let rows = rows
                .into_iter()
                .map(|row| {
                    if !existing.rows.contains_key(&row.key) {
                        return Err(DatabaseError::ConstraintViolation(format!(
                            "row {} not found in {}",
                            row.key.0, def.name
                        )));
                    }
                    Ok((row.key, conform_row(&def, row.values)?))
                })
                .collect::<DatabaseResult<Vec<_>>>()?;

            let count = rows.len();
            let target = workspace.table_mut(table)?;
            for (key, values) in rows {
                target.rows.insert(key, values);
            }
            Ok(count)
        })
    }

    fn delete_rows(
        &self,
        connection_id: ConnectionId,
        table: &str,
        keys: Vec<RowKey>,
    ) -> DatabaseResult<usize> {
        self.with_workspace(connection_id, |workspace| {
            workspace.catalog.get(table)?;
            let target = workspace.table_mut(table)?;
            Ok(keys
                .into_iter()
                .filter(|key| target.rows.remove(key).is_some())
                .count())
        })
    }
}
