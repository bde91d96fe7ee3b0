//! CREATE TABLE, DROP TABLE and DESCRIBE TABLE execution

use crate::ast::{CreateTable, DescribeTable, DropTable};
use crate::database::{DatabaseError, TableDef};
use crate::value::Value;

use super::context::ExecutionContext;
use super::errors::ExecutionResult;
use super::result::{ResultSet, SQLCommand};
use super::statement::Execute;

/// Output columns of DESCRIBE TABLE
const DESCRIBE_COLUMNS: [&str; 3] = ["name", "type", "not_null"];

impl Execute for CreateTable {
    fn execute(&self, ctx: &ExecutionContext<'_>) -> ExecutionResult<ResultSet> {
        let def = TableDef::new(self.table.clone(), self.columns.clone());
        match ctx.database.create_table(ctx.connection_id, def) {
            Ok(()) => {}
            Err(DatabaseError::TableExists(_)) if self.if_not_exists => {}
            Err(e) => return Err(e.into()),
        }
        Ok(ResultSet::new(SQLCommand::Create))
    }
}

impl Execute for DropTable {
    fn execute(&self, ctx: &ExecutionContext<'_>) -> ExecutionResult<ResultSet> {
        match ctx.database.drop_table(ctx.connection_id, &self.table) {
            Ok(()) => {}
            Err(DatabaseError::TableNotFound(_)) if self.if_exists => {}
            Err(e) => return Err(e.into()),
        }
        Ok(ResultSet::new(SQLCommand::Drop))
    }
}

impl Execute for DescribeTable {
    fn execute(&self, ctx: &ExecutionContext<'_>) -> ExecutionResult<ResultSet> {
        let def = ctx.database.table(ctx.connection_id, &self.table)?;

        let rows = def
            .columns
            .into_iter()
            .map(|column| {
                vec![
                    Value::Text(column.name),
                    Value::text(column.data_type.as_str()),
                    Value::Boolean(column.not_null),
                ]
            })
            .collect();

        ResultSet::with_rows(
            SQLCommand::Describe,
            DESCRIBE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Statement;
    use crate::config::ExecutorConfig;
    use crate::database::{ColumnDef, ConnectionId, Database, MemoryDatabase};
    use crate::executor::ExecutionError;
    use crate::value::DataType;

    fn run(db: &MemoryDatabase, conn: ConnectionId, stmt: Statement) -> ExecutionResult<ResultSet> {
        let config = ExecutorConfig::default();
        let ctx = ExecutionContext::new(db, conn, &stmt, &[], &config);
        stmt.execute(&ctx)
    }

    fn create(if_not_exists: bool) -> Statement {
        Statement::CreateTable(CreateTable {
            table: "accounts".to_string(),
            columns: vec![
                ColumnDef::new("id", DataType::Integer).not_null(),
                ColumnDef::new("balance", DataType::Float),
            ],
            if_not_exists,
        })
    }

    fn drop_table(if_exists: bool) -> Statement {
        Statement::DropTable(DropTable {
            table: "accounts".to_string(),
            if_exists,
        })
    }

    #[test]
    fn test_create_and_describe() {
        let db = MemoryDatabase::new();
        let conn = ConnectionId::generate();

        let result = run(&db, conn, create(false)).unwrap();
        assert_eq!(result.command(), SQLCommand::Create);
        assert!(result.is_empty());

        let describe = Statement::DescribeTable(DescribeTable {
            table: "ACCOUNTS".to_string(),
        });
        let result = run(&db, conn, describe).unwrap();

        assert_eq!(result.columns(), &["name", "type", "not_null"]);
        assert_eq!(
            result.rows(),
            &[
                vec![Value::text("id"), Value::text("INTEGER"), Value::Boolean(true)],
                vec![Value::text("balance"), Value::text("FLOAT"), Value::Boolean(false)],
            ]
        );
    }

    #[test]
    fn test_create_existing_table() {
        let db = MemoryDatabase::new();
        let conn = ConnectionId::generate();
        run(&db, conn, create(false)).unwrap();

        let err = run(&db, conn, create(false)).unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Storage(DatabaseError::TableExists(_))
        ));

        run(&db, conn, create(true)).unwrap();
    }

    #[test]
    fn test_drop_missing_table() {
        let db = MemoryDatabase::new();
        let conn = ConnectionId::generate();

        let err = run(&db, conn, drop_table(false)).unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Storage(DatabaseError::TableNotFound(_))
        ));

        let result = run(&db, conn, drop_table(true)).unwrap();
        assert_eq!(result.command(), SQLCommand::Drop);
    }

    #[test]
    fn test_drop_removes_table() {
        let db = MemoryDatabase::new();
        let conn = ConnectionId::generate();
        run(&db, conn, create(false)).unwrap();
        run(&db, conn, drop_table(false)).unwrap();

        assert!(db.table(conn, "accounts").is_err());
    }
}
