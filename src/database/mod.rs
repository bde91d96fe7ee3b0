//! Database collaborator for the aerosql executor
//!
//! The executor never touches storage directly. Everything it needs goes
//! through the `Database` trait:
//!
//! - Per-connection transaction state (`begin_transaction`,
//!   `commit_transaction`, `rollback_transaction`)
//! - Auto-commit (`commit`), safe to call when nothing is pending
//! - Schema and row access used by data statements
//!
//! # Invariants
//!
//! - Every mutating call is atomic: it applies fully or not at all
//! - `commit` never publishes work of a connection inside an explicit
//!   transaction

mod errors;
mod memory;
mod schema;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value::Value;

pub use errors::{DatabaseError, DatabaseResult};
pub use memory::MemoryDatabase;
pub use schema::{ColumnDef, TableDef};

/// Opaque identifier of a client session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Allocate a fresh connection identity
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for ConnectionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction state of one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransactionState {
    /// No explicit transaction; statements auto-commit
    #[default]
    Idle,
    /// Opened by BEGIN, closed by COMMIT or ROLLBACK
    InTransaction,
}

/// Stable identity of a stored row within its table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey(pub u64);

/// A row as returned by a scan
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub key: RowKey,
    pub values: Vec<Value>,
}

/// Storage and transaction primitives consumed by the executor
pub trait Database: Send + Sync {
    /// Open an explicit transaction for the connection
    fn begin_transaction(&self, connection_id: ConnectionId) -> DatabaseResult<()>;

    /// Durably apply the connection's transaction and return it to idle
    fn commit_transaction(&self, connection_id: ConnectionId) -> DatabaseResult<()>;

    /// Discard the connection's transaction and return it to idle
    fn rollback_transaction(&self, connection_id: ConnectionId) -> DatabaseResult<()>;

    /// Auto-commit: apply the connection's pending work.
    ///
    /// A no-op while the connection is inside an explicit transaction or
    /// has nothing pending.
    fn commit(&self, connection_id: ConnectionId) -> DatabaseResult<()>;

    /// Current transaction state of the connection
    fn transaction_state(&self, connection_id: ConnectionId) -> DatabaseResult<TransactionState>;

    /// Forget the connection, discarding any uncommitted work
    fn disconnect(&self, connection_id: ConnectionId) -> DatabaseResult<()>;

    /// Create a table
    fn create_table(&self, connection_id: ConnectionId, table: TableDef) -> DatabaseResult<()>;

    /// Drop a table with all its rows
    fn drop_table(&self, connection_id: ConnectionId, name: &str) -> DatabaseResult<()>;

    /// Look up a table definition
    fn table(&self, connection_id: ConnectionId, name: &str) -> DatabaseResult<TableDef>;

    /// Read all rows of a table in key order
    fn scan(&self, connection_id: ConnectionId, table: &str) -> DatabaseResult<Vec<StoredRow>>;

    /// Insert rows, returning the number inserted
    fn insert_rows(
        &self,
        connection_id: ConnectionId,
        table: &str,
        rows: Vec<Vec<Value>>,
    ) -> DatabaseResult<usize>;

    /// Replace rows by key, returning the number updated
    fn update_rows(
        &self,
        connection_id: ConnectionId,
        table: &str,
        rows: Vec<StoredRow>,
    ) -> DatabaseResult<usize>;

    /// Delete rows by key, returning the number deleted
    fn delete_rows(
        &self,
        connection_id: ConnectionId,
        table: &str,
        keys: Vec<RowKey>,
    ) -> DatabaseResult<usize>;
}
