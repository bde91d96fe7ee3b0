//! Statement executor for aerosql
//!
//! Runs parsed statements against a [`Database`](crate::database::Database)
//! and applies the auto-commit policy.
//!
//! # Execution Flow (strict order)
//!
//! 1. Check placeholder bindings
//! 2. Build an `ExecutionContext` for the call
//! 3. Dispatch to the statement's own `Execute` implementation
//! 4. Auto-commit once on success, never on failure
//! 5. Return the typed `ResultSet`
//!
//! # Invariants
//!
//! - Statements touch the database only through their context
//! - Statement errors are returned unchanged
//! - The same statement may be executed any number of times

mod context;
mod errors;
mod executor;
mod expression;
mod modify;
mod query;
mod result;
mod schema;
mod sorter;
mod statement;
mod transaction;

pub use context::{ExecutionContext, RowScope};
pub use errors::{ErrorKind, ExecutionError, ExecutionResult, Severity};
pub use executor::{execute, StatementExecutor};
pub use result::{ResultSet, Row, SQLCommand};
pub use sorter::{ResultSorter, SortableRow};
pub use statement::Execute;
