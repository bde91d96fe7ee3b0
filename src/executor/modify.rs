//! INSERT, UPDATE and DELETE execution
//!
//! All three follow the same pattern:
//! 1. Resolve the target table and columns
//! 2. Compute every new or changed row in memory
//! 3. Hand the complete batch to the database in one call
//!
//! A statement that fails in step 1 or 2 leaves the database untouched.

use crate::ast::{Delete, Expression, Insert, InsertSource, Update};
use crate::database::{StoredRow, TableDef};
use crate::value::Value;

use super::context::ExecutionContext;
use super::errors::{ExecutionError, ExecutionResult};
use super::result::{ResultSet, Row, SQLCommand};
use super::statement::Execute;

impl Execute for Insert {
    fn execute(&self, ctx: &ExecutionContext<'_>) -> ExecutionResult<ResultSet> {
        let def = ctx.database.table(ctx.connection_id, &self.table)?;
        let targets = self.target_columns(&def)?;

        // Each value keeps the expression it came from, if any
        let source_rows: Vec<Vec<(Value, Option<&Expression>)>> = match &self.source {
            InsertSource::Values(rows) => rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|expr| Ok((expr.evaluate(ctx)?, Some(expr))))
                        .collect::<ExecutionResult<Vec<_>>>()
                })
                .collect::<ExecutionResult<_>>()?,
            InsertSource::Select(select) => select
                .execute(&ctx.nested())?
                .into_rows()
                .into_iter()
                .map(|row: Row| row.into_iter().map(|value| (value, None)).collect())
                .collect(),
        };

        let rows = source_rows
            .into_iter()
            .map(|values| {
                if values.len() != targets.len() {
                    return Err(ExecutionError::ColumnCount {
                        expected: targets.len(),
                        found: values.len(),
                    });
                }

                let mut row = vec![Value::Null; def.columns.len()];
                for (&index, (value, source)) in targets.iter().zip(values) {
                    row[index] = coerce(&def, index, value, source)?;
                }
                Ok(row)
            })
            .collect::<ExecutionResult<Vec<_>>>()?;

        if rows.is_empty() {
            return Ok(ResultSet::affected(SQLCommand::Insert, 0));
        }

        let inserted = ctx
            .database
            .insert_rows(ctx.connection_id, &self.table, rows)?;
        Ok(ResultSet::affected(SQLCommand::Insert, inserted))
    }
}

impl Insert {
    /// Positions of the target columns in the table
    fn target_columns(&self, def: &TableDef) -> ExecutionResult<Vec<usize>> {
        let Some(names) = &self.columns else {
            return Ok((0..def.columns.len()).collect());
        };

        let mut targets = Vec::with_capacity(names.len());
        for name in names {
            let index = def
                .column_index(name)
                .ok_or_else(|| ExecutionError::column_not_found(format!("{}.{}", def.name, name)))?;
            if targets.contains(&index) {
                return Err(ExecutionError::DuplicateColumn(format!("{}.{}", def.name, name)));
            }
            targets.push(index);
        }
        Ok(targets)
    }
}

impl Execute for Update {
    fn execute(&self, ctx: &ExecutionContext<'_>) -> ExecutionResult<ResultSet> {
        let def = ctx.database.table(ctx.connection_id, &self.table)?;

        let assignments = self
            .assignments
            .iter()
            .map(|a| {
                def.column_index(&a.column)
                    .map(|index| (index, &a.value))
                    .ok_or_else(|| {
                        ExecutionError::column_not_found(format!("{}.{}", def.name, a.column))
                    })
            })
            .collect::<ExecutionResult<Vec<_>>>()?;

        let mut changed = Vec::new();
        for stored in ctx.database.scan(ctx.connection_id, &self.table)? {
            let row_ctx = ctx.with_row(&def, &stored.values);
            if let Some(filter) = &self.filter {
                if !filter.matches(&row_ctx)? {
                    continue;
                }
            }

            // Every assignment sees the row as it was before the update
            let mut values = stored.values.clone();
            for (index, expr) in &assignments {
                values[*index] = coerce(&def, *index, expr.evaluate(&row_ctx)?, Some(expr))?;
            }
            changed.push(StoredRow {
                key: stored.key,
                values,
            });
        }

        if changed.is_empty() {
            return Ok(ResultSet::affected(SQLCommand::Update, 0));
        }

        let updated = ctx
            .database
            .update_rows(ctx.connection_id, &self.table, changed)?;
        Ok(ResultSet::affected(SQLCommand::Update, updated))
    }
}

impl Execute for Delete {
    fn execute(&self, ctx: &ExecutionContext<'_>) -> ExecutionResult<ResultSet> {
        let def = ctx.database.table(ctx.connection_id, &self.table)?;

        let mut keys = Vec::new();
        for stored in ctx.database.scan(ctx.connection_id, &self.table)? {
            if let Some(filter) = &self.filter {
                if !filter.matches(&ctx.with_row(&def, &stored.values))? {
                    continue;
                }
            }
            keys.push(stored.key);
        }

        if keys.is_empty() {
            return Ok(ResultSet::affected(SQLCommand::Delete, 0));
        }

        let deleted = ctx
            .database
            .delete_rows(ctx.connection_id, &self.table, keys)?;
        Ok(ResultSet::affected(SQLCommand::Delete, deleted))
    }
}

/// Coerce a value to the declared type of a column
fn coerce(
    def: &TableDef,
    index: usize,
    value: Value,
    source: Option<&Expression>,
) -> ExecutionResult<Value> {
    let column = &def.columns[index];
    let found = value.type_name();
    value.coerce_to(column.data_type).ok_or_else(|| {
        let e = ExecutionError::type_mismatch(format!(
            "column {}.{} expects {}, found {}",
            def.name, column.name, column.data_type, found
        ));
        match source {
            Some(expr) => e.bound_to(expr),
            None => e,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Assignment, BinaryOperator, Expression, Select, Statement};
    use crate::config::ExecutorConfig;
    use crate::database::{ColumnDef, ConnectionId, Database, DatabaseError, MemoryDatabase};
    use crate::value::DataType;

    fn setup() -> (MemoryDatabase, ConnectionId) {
        let db = MemoryDatabase::new();
        let conn = ConnectionId::generate();
        db.create_table(
            conn,
            TableDef::new(
                "items",
                vec![
                    ColumnDef::new("id", DataType::Integer).not_null(),
                    ColumnDef::new("price", DataType::Float),
                    ColumnDef::new("label", DataType::Text),
                ],
            ),
        )
        .unwrap();
        db.commit(conn).unwrap();
        (db, conn)
    }

    fn run(db: &MemoryDatabase, conn: ConnectionId, stmt: Statement) -> ExecutionResult<ResultSet> {
        let config = ExecutorConfig::default();
        let ctx = ExecutionContext::new(db, conn, &stmt, &[], &config);
        stmt.execute(&ctx)
    }

    fn insert(rows: Vec<Vec<Expression>>) -> Statement {
        Statement::Insert(Insert {
            table: "items".to_string(),
            columns: None,
            source: InsertSource::Values(rows),
        })
    }

    fn row(id: i64, price: i64, label: &str) -> Vec<Expression> {
        vec![
            Expression::literal(id),
            Expression::literal(price),
            Expression::literal(label),
        ]
    }

    fn scan(db: &MemoryDatabase, conn: ConnectionId) -> Vec<Vec<Value>> {
        db.scan(conn, "items")
            .unwrap()
            .into_iter()
            .map(|r| r.values)
            .collect()
    }

    #[test]
    fn test_insert_coerces_integer_to_float() {
        let (db, conn) = setup();
        let result = run(&db, conn, insert(vec![row(1, 5, "a"), row(2, 7, "b")])).unwrap();

        assert_eq!(result.command(), SQLCommand::Insert);
        assert_eq!(result.rows_affected(), 2);
        assert_eq!(scan(&db, conn)[0][1], Value::Float(5.0));
    }

    #[test]
    fn test_insert_named_columns_fills_null() {
        let (db, conn) = setup();
        let stmt = Statement::Insert(Insert {
            table: "items".to_string(),
            columns: Some(vec!["label".to_string(), "id".to_string()]),
            source: InsertSource::Values(vec![vec![
                Expression::literal("x"),
                Expression::literal(9),
            ]]),
        });

        run(&db, conn, stmt).unwrap();

        assert_eq!(
            scan(&db, conn),
            vec![vec![Value::Integer(9), Value::Null, Value::text("x")]]
        );
    }

    #[test]
    fn test_insert_wrong_arity_writes_nothing() {
        let (db, conn) = setup();
        let stmt = insert(vec![row(1, 1, "a"), vec![Expression::literal(2)]]);

        let err = run(&db, conn, stmt).unwrap_err();

        assert_eq!(
            err,
            ExecutionError::ColumnCount {
                expected: 3,
                found: 1
            }
        );
        assert!(scan(&db, conn).is_empty());
    }

    #[test]
    fn test_insert_type_mismatch() {
        let (db, conn) = setup();
        let stmt = insert(vec![vec![
            Expression::literal("not a number"),
            Expression::null(),
            Expression::null(),
        ]]);

        let err = run(&db, conn, stmt).unwrap_err();
        assert!(matches!(err, ExecutionError::TypeMismatch(_)));
    }

    #[test]
    fn test_bound_value_mismatch_is_binding_error() {
        let (db, conn) = setup();
        let stmt = insert(vec![vec![
            Expression::placeholder(0),
            Expression::null(),
            Expression::null(),
        ]]);
        let config = ExecutorConfig::default();
        let values = [Value::text("x")];
        let ctx = ExecutionContext::new(&db, conn, &stmt, &values, &config);

        let err = stmt.execute(&ctx).unwrap_err();
        assert!(matches!(err, ExecutionError::PlaceholderBinding(_)));
        assert!(scan(&db, conn).is_empty());
    }

    #[test]
    fn test_insert_not_null_violation_is_storage_error() {
        let (db, conn) = setup();
        let stmt = insert(vec![vec![
            Expression::null(),
            Expression::null(),
            Expression::null(),
        ]]);

        let err = run(&db, conn, stmt).unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Storage(DatabaseError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn test_insert_unknown_column() {
        let (db, conn) = setup();
        let stmt = Statement::Insert(Insert {
            table: "items".to_string(),
            columns: Some(vec!["nope".to_string()]),
            source: InsertSource::Values(vec![vec![Expression::literal(1)]]),
        });

        let err = run(&db, conn, stmt).unwrap_err();
        assert_eq!(err, ExecutionError::ColumnNotFound("items.nope".to_string()));
    }

    #[test]
    fn test_insert_select_copies_rows() {
        let (db, conn) = setup();
        run(&db, conn, insert(vec![row(1, 1, "a"), row(2, 2, "b")])).unwrap();

        let stmt = Statement::Insert(Insert {
            table: "items".to_string(),
            columns: None,
            source: InsertSource::Select(Box::new(Select::all_from("items").with_filter(
                Expression::equals(Expression::column("id"), Expression::literal(2)),
            ))),
        });
        let result = run(&db, conn, stmt).unwrap();

        assert_eq!(result.rows_affected(), 1);
        assert_eq!(scan(&db, conn).len(), 3);
    }

    #[test]
    fn test_update_uses_pre_update_values() {
        let (db, conn) = setup();
        run(&db, conn, insert(vec![row(1, 10, "a"), row(2, 20, "b")])).unwrap();

        let stmt = Statement::Update(Update {
            table: "items".to_string(),
            assignments: vec![
                Assignment {
                    column: "price".to_string(),
                    value: Expression::binary(
                        BinaryOperator::Multiply,
                        Expression::column("price"),
                        Expression::literal(2),
                    ),
                },
                Assignment {
                    column: "label".to_string(),
                    value: Expression::binary(
                        BinaryOperator::Concatenate,
                        Expression::column("label"),
                        Expression::literal("!"),
                    ),
                },
            ],
            filter: Some(Expression::equals(
                Expression::column("id"),
                Expression::literal(2),
            )),
        });
        let result = run(&db, conn, stmt).unwrap();

        assert_eq!(result.rows_affected(), 1);
        let rows = scan(&db, conn);
        assert_eq!(rows[0][1], Value::Float(10.0));
        assert_eq!(rows[1][1], Value::Float(40.0));
        assert_eq!(rows[1][2], Value::text("b!"));
    }

    #[test]
    fn test_update_no_match_affects_nothing() {
        let (db, conn) = setup();
        let stmt = Statement::Update(Update {
            table: "items".to_string(),
            assignments: vec![Assignment {
                column: "label".to_string(),
                value: Expression::literal("z"),
            }],
            filter: None,
        });

        assert_eq!(run(&db, conn, stmt).unwrap().rows_affected(), 0);
    }

    #[test]
    fn test_delete_with_filter() {
        let (db, conn) = setup();
        run(&db, conn, insert(vec![row(1, 1, "a"), row(2, 2, "b"), row(3, 3, "c")])).unwrap();

        let stmt = Statement::Delete(Delete {
            table: "items".to_string(),
            filter: Some(Expression::binary(
                BinaryOperator::GreaterThanOrEquals,
                Expression::column("id"),
                Expression::literal(2),
            )),
        });
        let result = run(&db, conn, stmt).unwrap();

        assert_eq!(result.rows_affected(), 2);
        assert_eq!(scan(&db, conn).len(), 1);
    }
}
