//! Statement dispatch

use crate::ast::Statement;

use super::context::ExecutionContext;
use super::errors::ExecutionResult;
use super::result::ResultSet;

/// Executes one statement kind within a context
///
/// Every statement node implements this. Implementations read and write
/// through `ctx.database` only and never commit on their own.
pub trait Execute {
    fn execute(&self, ctx: &ExecutionContext<'_>) -> ExecutionResult<ResultSet>;
}

impl Execute for Statement {
    fn execute(&self, ctx: &ExecutionContext<'_>) -> ExecutionResult<ResultSet> {
        match self {
            Statement::CreateTable(s) => s.execute(ctx),
            Statement::DropTable(s) => s.execute(ctx),
            Statement::DescribeTable(s) => s.execute(ctx),
            Statement::Insert(s) => s.execute(ctx),
            Statement::Update(s) => s.execute(ctx),
            Statement::Delete(s) => s.execute(ctx),
            Statement::Select(s) => s.execute(ctx),
            Statement::BeginTransaction(s) => s.execute(ctx),
            Statement::CommitTransaction(s) => s.execute(ctx),
            Statement::RollbackTransaction(s) => s.execute(ctx),
        }
    }
}
