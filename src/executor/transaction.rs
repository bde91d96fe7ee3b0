//! Transaction control execution
//!
//! BEGIN, COMMIT and ROLLBACK delegate to the database for the issuing
//! connection. The database owns the transaction state; these statements
//! only request transitions and report misuse.

use crate::ast::{BeginTransaction, CommitTransaction, RollbackTransaction};
use crate::observability::{Event, Logger};

use super::context::ExecutionContext;
use super::errors::ExecutionResult;
use super::result::{ResultSet, SQLCommand};
use super::statement::Execute;

impl Execute for BeginTransaction {
    fn execute(&self, ctx: &ExecutionContext<'_>) -> ExecutionResult<ResultSet> {
        ctx.database.begin_transaction(ctx.connection_id)?;
        log_transition(Event::TransactionBegin, ctx);
        Ok(ResultSet::new(SQLCommand::BeginTransaction))
    }
}

impl Execute for CommitTransaction {
    fn execute(&self, ctx: &ExecutionContext<'_>) -> ExecutionResult<ResultSet> {
        ctx.database.commit_transaction(ctx.connection_id)?;
        log_transition(Event::TransactionCommit, ctx);
        Ok(ResultSet::new(SQLCommand::CommitTransaction))
    }
}

impl Execute for RollbackTransaction {
    fn execute(&self, ctx: &ExecutionContext<'_>) -> ExecutionResult<ResultSet> {
        ctx.database.rollback_transaction(ctx.connection_id)?;
        log_transition(Event::TransactionRollback, ctx);
        Ok(ResultSet::new(SQLCommand::RollbackTransaction))
    }
}

fn log_transition(event: Event, ctx: &ExecutionContext<'_>) {
    let connection = ctx.connection_id.to_string();
    Logger::event(event, &[("connection", connection.as_str())]);
}
