//! Database error types

use thiserror::Error;

use super::ConnectionId;

/// Result type for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Errors reported by the database collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatabaseError {
    #[error("Table already exists: {0}")]
    TableExists(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Connection {0} is already in a transaction")]
    AlreadyInTransaction(ConnectionId),

    #[error("Connection {0} is not in a transaction")]
    NotInTransaction(ConnectionId),

    #[error("Write conflict on table {0}: modified by a concurrent commit")]
    WriteConflict(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

impl DatabaseError {
    /// Returns true for errors caused by misuse of transaction control
    pub fn is_transaction_usage(&self) -> bool {
        matches!(
            self,
            DatabaseError::AlreadyInTransaction(_) | DatabaseError::NotInTransaction(_)
        )
    }
}
