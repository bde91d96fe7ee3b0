//! aerosql - Statement execution and transaction control for an embedded SQL engine
//!
//! Executes parsed statements against a shared database on behalf of
//! client connections, with auto-commit and explicit transactions.

pub mod ast;
pub mod config;
pub mod database;
pub mod executor;
pub mod observability;
pub mod value;
