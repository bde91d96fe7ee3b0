//! Result types for statement execution

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

use super::errors::{ExecutionError, ExecutionResult};

/// Identifies which statement kind produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SQLCommand {
    Create,
    Drop,
    Describe,
    Insert,
    Select,
    Update,
    Delete,
    BeginTransaction,
    CommitTransaction,
    RollbackTransaction,
}

impl SQLCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            SQLCommand::Create => "CREATE",
            SQLCommand::Drop => "DROP",
            SQLCommand::Describe => "DESCRIBE",
            SQLCommand::Insert => "INSERT",
            SQLCommand::Select => "SELECT",
            SQLCommand::Update => "UPDATE",
            SQLCommand::Delete => "DELETE",
            SQLCommand::BeginTransaction => "BEGIN",
            SQLCommand::CommitTransaction => "COMMIT",
            SQLCommand::RollbackTransaction => "ROLLBACK",
        }
    }
}

impl fmt::Display for SQLCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One output row
pub type Row = Vec<Value>;

/// Output of a successful statement
///
/// Never mutated after construction. Every row has exactly
/// `columns().len()` values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    command: SQLCommand,
    columns: Vec<String>,
    rows: Vec<Row>,
    rows_affected: usize,
}

impl ResultSet {
    /// A result with no columns and no rows
    pub fn new(command: SQLCommand) -> Self {
        Self {
            command,
            columns: Vec::new(),
            rows: Vec::new(),
            rows_affected: 0,
        }
    }

    /// A row-less result reporting how many rows a statement changed
    pub fn affected(command: SQLCommand, rows_affected: usize) -> Self {
        Self {
            rows_affected,
            ..Self::new(command)
        }
    }

    /// A result with rows; fails if any row's arity differs from the columns
    pub fn with_rows(
        command: SQLCommand,
        columns: Vec<String>,
        rows: Vec<Row>,
    ) -> ExecutionResult<Self> {
        if let Some(bad) = rows.iter().find(|row| row.len() != columns.len()) {
            return Err(ExecutionError::ColumnCount {
                expected: columns.len(),
                found: bad.len(),
            });
        }

        Ok(Self {
            command,
            columns,
            rows,
            rows_affected: 0,
        })
    }

    pub fn command(&self) -> SQLCommand {
        self.command
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows inserted, updated or deleted by a data modification
    pub fn rows_affected(&self) -> usize {
        self.rows_affected
    }

    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Take ownership of the rows
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}
