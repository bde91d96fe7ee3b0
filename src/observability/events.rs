//! Observable events for statement execution
//!
//! Events are explicit and typed. Every log line emitted by aerosql
//! names one of these.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Executor configuration loaded
    ConfigLoaded,

    // Statements
    /// Top-level statement execution begins
    StatementBegin,
    /// Statement and its auto-commit succeeded
    StatementComplete,
    /// Statement failed before auto-commit
    StatementFailed,

    // Auto-commit
    /// Auto-commit applied after a successful statement
    AutoCommit,
    /// Auto-commit failed after a successful statement
    AutoCommitFailed,

    // Explicit transactions
    /// BEGIN
    TransactionBegin,
    /// COMMIT
    TransactionCommit,
    /// ROLLBACK
    TransactionRollback,

    // Storage
    /// Publishing a workspace lost a first-committer-wins race
    WriteConflict,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::StatementBegin => "STATEMENT_BEGIN",
            Event::StatementComplete => "STATEMENT_COMPLETE",
            Event::StatementFailed => "STATEMENT_FAILED",

            Event::AutoCommit => "AUTO_COMMIT",
            Event::AutoCommitFailed => "AUTO_COMMIT_FAILED",

            Event::TransactionBegin => "TRANSACTION_BEGIN",
            Event::TransactionCommit => "TRANSACTION_COMMIT",
            Event::TransactionRollback => "TRANSACTION_ROLLBACK",

            Event::WriteConflict => "WRITE_CONFLICT",
        }
    }

    /// Default severity for the event
    pub fn severity(&self) -> Severity {
        match self {
            Event::StatementBegin | Event::StatementComplete | Event::AutoCommit => {
                Severity::Trace
            }
            Event::StatementFailed => Severity::Error,
            Event::AutoCommitFailed => Severity::Fatal,
            Event::WriteConflict => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
