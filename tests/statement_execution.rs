//! Statement Execution Tests
//!
//! End-to-end tests for data and schema statements through the executor:
//! - Result shape (command tag, uniform row arity)
//! - CRUD round trips
//! - Idempotent re-execution of read statements
//! - Statements exchanged as JSON

use std::sync::Arc;

use aerosql::ast::{
    Assignment, BinaryOperator, CreateTable, Delete, DescribeTable, DropTable, Expression, Insert,
    InsertSource, Select, SelectItem, Statement, Update,
};
use aerosql::config::ExecutorConfig;
use aerosql::database::{ColumnDef, ConnectionId, Database, MemoryDatabase};
use aerosql::executor::{ExecutionError, ResultSet, SQLCommand, StatementExecutor};
use aerosql::value::{DataType, Value};

// =============================================================================
// Helper Functions
// =============================================================================

struct Session {
    db: Arc<dyn Database>,
    executor: StatementExecutor,
    conn: ConnectionId,
}

impl Session {
    fn new() -> Self {
        Self::with_config(ExecutorConfig::default())
    }

    fn with_config(config: ExecutorConfig) -> Self {
        Self {
            db: Arc::new(MemoryDatabase::new()),
            executor: StatementExecutor::new(config),
            conn: ConnectionId::generate(),
        }
    }

    fn run(&self, stmt: &Statement) -> Result<ResultSet, ExecutionError> {
        self.executor.execute(&self.db, self.conn, stmt, &[])
    }

    fn create_people(&self) {
        self.run(&Statement::CreateTable(CreateTable {
            table: "people".to_string(),
            columns: vec![
                ColumnDef::new("id", DataType::Integer).not_null(),
                ColumnDef::new("name", DataType::Text),
                ColumnDef::new("age", DataType::Integer),
            ],
            if_not_exists: false,
        }))
        .unwrap();

        self.run(&Statement::Insert(Insert {
            table: "people".to_string(),
            columns: None,
            source: InsertSource::Values(vec![
                person(1, "ada", 36),
                person(2, "grace", 45),
                person(3, "linus", 21),
            ]),
        }))
        .unwrap();
    }
}

fn person(id: i64, name: &str, age: i64) -> Vec<Expression> {
    vec![
        Expression::literal(id),
        Expression::literal(name),
        Expression::literal(age),
    ]
}

fn column_gt(column: &str, value: i64) -> Expression {
    Expression::binary(
        BinaryOperator::GreaterThan,
        Expression::column(column),
        Expression::literal(value),
    )
}

fn assert_uniform_arity(result: &ResultSet) {
    for row in result.rows() {
        assert_eq!(row.len(), result.columns().len());
    }
}

// =============================================================================
// Result Shape Tests
// =============================================================================

/// Every data statement returns rows of identical arity.
#[test]
fn test_result_rows_have_uniform_arity() {
    let session = Session::new();
    session.create_people();

    let select = session.run(&Statement::Select(Select::all_from("people"))).unwrap();
    assert_eq!(select.len(), 3);
    assert_uniform_arity(&select);

    let describe = session
        .run(&Statement::DescribeTable(DescribeTable {
            table: "people".to_string(),
        }))
        .unwrap();
    assert_eq!(describe.command(), SQLCommand::Describe);
    assert_eq!(describe.len(), 3);
    assert_uniform_arity(&describe);
}

/// An empty result still carries its command tag.
#[test]
fn test_empty_result_has_command_tag() {
    let session = Session::new();
    session.create_people();

    let result = session
        .run(&Statement::Select(
            Select::all_from("people").with_filter(column_gt("age", 100)),
        ))
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(result.command(), SQLCommand::Select);
    assert_eq!(result.columns().len(), 3);
}

// =============================================================================
// CRUD Tests
// =============================================================================

/// UPDATE and DELETE report affected rows and are visible to later reads.
#[test]
fn test_update_then_delete() {
    let session = Session::new();
    session.create_people();

    let updated = session
        .run(&Statement::Update(Update {
            table: "people".to_string(),
            assignments: vec![Assignment {
                column: "age".to_string(),
                value: Expression::binary(
                    BinaryOperator::Add,
                    Expression::column("age"),
                    Expression::literal(1),
                ),
            }],
            filter: Some(column_gt("age", 30)),
        }))
        .unwrap();
    assert_eq!(updated.command(), SQLCommand::Update);
    assert_eq!(updated.rows_affected(), 2);

    let deleted = session
        .run(&Statement::Delete(Delete {
            table: "people".to_string(),
            filter: Some(column_gt("age", 40)),
        }))
        .unwrap();
    assert_eq!(deleted.rows_affected(), 1);

    let remaining = session
        .run(&Statement::Select(
            Select {
                projection: vec![SelectItem::Expression {
                    expr: Expression::column("age"),
                    alias: None,
                }],
                ..Select::all_from("people")
            }
            .with_order_by(Expression::column("age"), false),
        ))
        .unwrap();
    assert_eq!(
        remaining.rows(),
        &[vec![Value::Integer(21)], vec![Value::Integer(37)]]
    );
}

/// INSERT ... SELECT runs its sub-select through the same connection.
#[test]
fn test_insert_select() {
    let session = Session::new();
    session.create_people();
    session
        .run(&Statement::CreateTable(CreateTable {
            table: "seniors".to_string(),
            columns: vec![ColumnDef::new("name", DataType::Text)],
            if_not_exists: false,
        }))
        .unwrap();

    let result = session
        .run(&Statement::Insert(Insert {
            table: "seniors".to_string(),
            columns: Some(vec!["name".to_string()]),
            source: InsertSource::Select(Box::new(Select {
                projection: vec![SelectItem::Expression {
                    expr: Expression::column("name"),
                    alias: None,
                }],
                ..Select::all_from("people").with_filter(column_gt("age", 30))
            })),
        }))
        .unwrap();

    assert_eq!(result.rows_affected(), 2);
    let seniors = session.run(&Statement::Select(Select::all_from("seniors"))).unwrap();
    assert_eq!(
        seniors.rows(),
        &[vec![Value::text("ada")], vec![Value::text("grace")]]
    );
}

/// DROP TABLE removes the table for later statements.
#[test]
fn test_drop_table() {
    let session = Session::new();
    session.create_people();

    let result = session
        .run(&Statement::DropTable(DropTable {
            table: "people".to_string(),
            if_exists: false,
        }))
        .unwrap();
    assert_eq!(result.command(), SQLCommand::Drop);

    let err = session
        .run(&Statement::Select(Select::all_from("people")))
        .unwrap_err();
    assert!(matches!(err, ExecutionError::Storage(_)));
}

/// A query exceeding the configured row limit fails.
#[test]
fn test_result_row_limit() {
    let session = Session::with_config(ExecutorConfig {
        max_result_rows: Some(2),
        ..ExecutorConfig::default()
    });
    session.create_people();

    let err = session
        .run(&Statement::Select(Select::all_from("people")))
        .unwrap_err();
    assert!(matches!(err, ExecutionError::ExecutionLimit(_)));
}

// =============================================================================
// Idempotence Tests
// =============================================================================

/// Re-executing the same read statement yields equal results.
#[test]
fn test_read_statement_idempotent() {
    let session = Session::new();
    session.create_people();

    let stmt = Statement::Select(
        Select::all_from("people")
            .with_filter(column_gt("age", 25))
            .with_order_by(Expression::column("name"), true),
    );

    let first = session.run(&stmt).unwrap();
    let second = session.run(&stmt).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

// =============================================================================
// JSON Statement Tests
// =============================================================================

/// Statements parsed from JSON execute like hand-built ones.
#[test]
fn test_json_statements() {
    let session = Session::new();

    let script = [
        r#"{"create_table": {"table": "kv", "columns": [
            {"name": "k", "data_type": "text", "not_null": true},
            {"name": "v", "data_type": "float"}]}}"#,
        r#"{"insert": {"table": "kv", "source": {"values": [
            [{"literal": "a"}, {"literal": 1}],
            [{"literal": "b"}, {"literal": 2.5}]]}}}"#,
    ];
    for json in script {
        let stmt: Statement = serde_json::from_str(json).unwrap();
        session.run(&stmt).unwrap();
    }

    let query: Statement = serde_json::from_str(
        r#"{"select": {"table": "kv", "projection": ["wildcard"],
            "order_by": [{"expr": {"column": "v"}, "descending": true}]}}"#,
    )
    .unwrap();
    let result = session.run(&query).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["command"], "select");
    assert_eq!(json["columns"], serde_json::json!(["k", "v"]));
    assert_eq!(json["rows"], serde_json::json!([["b", 2.5], ["a", 1.0]]));
}
