//! Execution error types
//!
//! Error codes:
//! - SQL_PLACEHOLDER_BINDING (ERROR)
//! - SQL_TRANSACTION_USAGE (ERROR)
//! - SQL_STORAGE (ERROR)
//! - SQL_AUTO_COMMIT_FAILED (FATAL)
//! - SQL_TYPE_MISMATCH, SQL_COLUMN_NOT_FOUND, SQL_DUPLICATE_COLUMN (ERROR)
//! - SQL_COLUMN_COUNT (ERROR)
//! - SQL_EXECUTION_LIMIT (ERROR)

use std::fmt;

use thiserror::Error;

use crate::ast::Expression;
use crate::database::DatabaseError;

/// Result type for executor operations
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Severity levels for execution errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The statement failed; the connection is healthy
    Error,
    /// The caller must escalate rather than report and continue
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Broad category of an execution error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Supplied placeholder values do not fit the statement
    PlaceholderBinding,
    /// BEGIN inside a transaction, COMMIT or ROLLBACK outside one
    TransactionUsage,
    /// Reported verbatim by the database
    Storage,
    /// The statement succeeded but its auto-commit did not
    AutoCommit,
    /// Type, column or arity problems found while evaluating
    Semantic,
    /// A configured execution limit was exceeded
    Limit,
}

/// Execution error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    #[error("Placeholder binding error: {0}")]
    PlaceholderBinding(String),

    #[error("Transaction usage error: {0}")]
    TransactionUsage(DatabaseError),

    #[error("Storage error: {0}")]
    Storage(DatabaseError),

    #[error("Auto-commit failed: {0}")]
    AutoCommit(DatabaseError),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Column count mismatch: expected {expected}, found {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("Execution limit exceeded: {0}")]
    ExecutionLimit(String),
}

impl ExecutionError {
    pub fn placeholder_binding(msg: impl Into<String>) -> Self {
        Self::PlaceholderBinding(msg.into())
    }

    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::TypeMismatch(msg.into())
    }

    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound(name.into())
    }

    /// A type mismatch on a bare placeholder is a binding error
    pub fn bound_to(self, source: &Expression) -> Self {
        match (self, source) {
            (Self::TypeMismatch(msg), Expression::Placeholder(index)) => {
                Self::PlaceholderBinding(format!("placeholder {}: {}", index, msg))
            }
            (e, _) => e,
        }
    }

    /// Returns the error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PlaceholderBinding(_) => ErrorKind::PlaceholderBinding,
            Self::TransactionUsage(_) => ErrorKind::TransactionUsage,
            Self::Storage(_) => ErrorKind::Storage,
            Self::AutoCommit(_) => ErrorKind::AutoCommit,
            Self::TypeMismatch(_)
            | Self::ColumnNotFound(_)
            | Self::DuplicateColumn(_)
            | Self::ColumnCount { .. } => ErrorKind::Semantic,
            Self::ExecutionLimit(_) => ErrorKind::Limit,
        }
    }

    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            Self::PlaceholderBinding(_) => "SQL_PLACEHOLDER_BINDING",
            Self::TransactionUsage(_) => "SQL_TRANSACTION_USAGE",
            Self::Storage(_) => "SQL_STORAGE",
            Self::AutoCommit(_) => "SQL_AUTO_COMMIT_FAILED",
            Self::TypeMismatch(_) => "SQL_TYPE_MISMATCH",
            Self::ColumnNotFound(_) => "SQL_COLUMN_NOT_FOUND",
            Self::DuplicateColumn(_) => "SQL_DUPLICATE_COLUMN",
            Self::ColumnCount { .. } => "SQL_COLUMN_COUNT",
            Self::ExecutionLimit(_) => "SQL_EXECUTION_LIMIT",
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        match self {
            Self::AutoCommit(_) | Self::Storage(DatabaseError::LockPoisoned) => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// The database error carried by this error, if any
    pub fn database_error(&self) -> Option<&DatabaseError> {
        match self {
            Self::TransactionUsage(e) | Self::Storage(e) | Self::AutoCommit(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DatabaseError> for ExecutionError {
    fn from(e: DatabaseError) -> Self {
        if e.is_transaction_usage() {
            Self::TransactionUsage(e)
        } else {
            Self::Storage(e)
        }
    }
}
