//! Per-statement execution context

use crate::ast::Statement;
use crate::config::ExecutorConfig;
use crate::database::{ConnectionId, Database, TableDef};
use crate::value::Value;

use super::errors::{ExecutionError, ExecutionResult};

/// The row an expression is evaluated against
#[derive(Debug, Clone, Copy)]
pub struct RowScope<'a> {
    pub table: &'a TableDef,
    pub values: &'a [Value],
}

impl<'a> RowScope<'a> {
    pub fn new(table: &'a TableDef, values: &'a [Value]) -> Self {
        Self { table, values }
    }

    /// Value of a column in this row
    pub fn column(&self, name: &str) -> ExecutionResult<&'a Value> {
        self.table
            .column_index(name)
            .and_then(|index| self.values.get(index))
            .ok_or_else(|| {
                ExecutionError::column_not_found(format!("{}.{}", self.table.name, name))
            })
    }
}

/// Everything a statement needs while it runs
///
/// Built once per execution by the driver and discarded afterwards.
/// Sub-statements run against a [`nested`](Self::nested) context that
/// shares the same database and connection.
#[derive(Clone, Copy)]
pub struct ExecutionContext<'a> {
    pub database: &'a dyn Database,
    pub connection_id: ConnectionId,
    pub statement: &'a Statement,
    pub placeholder_values: &'a [Value],
    pub current_row: Option<RowScope<'a>>,
    pub config: &'a ExecutorConfig,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        database: &'a dyn Database,
        connection_id: ConnectionId,
        statement: &'a Statement,
        placeholder_values: &'a [Value],
        config: &'a ExecutorConfig,
    ) -> Self {
        Self {
            database,
            connection_id,
            statement,
            placeholder_values,
            current_row: None,
            config,
        }
    }

    /// A context for a sub-statement, with no row in scope
    pub fn nested(&self) -> ExecutionContext<'a> {
        ExecutionContext {
            current_row: None,
            ..*self
        }
    }

    /// A context that evaluates expressions against one row
    pub fn with_row<'b>(&self, table: &'b TableDef, values: &'b [Value]) -> ExecutionContext<'b>
    where
        'a: 'b,
    {
        ExecutionContext {
            database: self.database,
            connection_id: self.connection_id,
            statement: self.statement,
            placeholder_values: self.placeholder_values,
            current_row: Some(RowScope::new(table, values)),
            config: self.config,
        }
    }

    /// Bound value for a placeholder index
    pub fn placeholder(&self, index: usize) -> ExecutionResult<&'a Value> {
        self.placeholder_values.get(index).ok_or_else(|| {
            ExecutionError::placeholder_binding(format!(
                "placeholder {} is not bound ({} values supplied)",
                index,
                self.placeholder_values.len()
            ))
        })
    }
}
