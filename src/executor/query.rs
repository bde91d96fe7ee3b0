//! SELECT execution
//!
//! # Execution Flow (strict order)
//!
//! 1. Scan the source table (or produce one empty row without FROM)
//! 2. Filter rows by the WHERE predicate
//! 3. Project each row and compute its ORDER BY keys
//! 4. Sort
//! 5. Apply OFFSET, then LIMIT
//! 6. Enforce the configured result row limit

use crate::ast::{Expression, Select, SelectItem};
use crate::database::TableDef;
use crate::value::Value;

use super::context::ExecutionContext;
use super::errors::{ExecutionError, ExecutionResult};
use super::result::{ResultSet, Row, SQLCommand};
use super::sorter::{ResultSorter, SortableRow};
use super::statement::Execute;

impl Execute for Select {
    fn execute(&self, ctx: &ExecutionContext<'_>) -> ExecutionResult<ResultSet> {
        let source = match &self.table {
            Some(name) => Some((
                ctx.database.table(ctx.connection_id, name)?,
                ctx.database.scan(ctx.connection_id, name)?,
            )),
            None => None,
        };

        let columns = self.output_columns(source.as_ref().map(|(def, _)| def))?;

        let mut output = Vec::new();
        match &source {
            Some((def, rows)) => {
                for stored in rows {
                    let row_ctx = ctx.with_row(def, &stored.values);
                    if let Some(row) = self.process_row(&row_ctx, Some(stored.values.as_slice()))? {
                        output.push(row);
                    }
                }
            }
            None => {
                if let Some(row) = self.process_row(&ctx.nested(), None)? {
                    output.push(row);
                }
            }
        }

        if !self.order_by.is_empty() {
            let descending: Vec<bool> = self.order_by.iter().map(|o| o.descending).collect();
            ResultSorter::sort(&mut output, &descending);
        }

        let offset = count(self.offset.as_ref(), ctx)?.unwrap_or(0);
        let limit = count(self.limit.as_ref(), ctx)?;

        let rows: Vec<Row> = output
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .map(|r| r.row)
            .collect();

        if let Some(max) = ctx.config.max_result_rows {
            if rows.len() > max {
                return Err(ExecutionError::ExecutionLimit(format!(
                    "query produced {} rows, at most {} allowed",
                    rows.len(),
                    max
                )));
            }
        }

        ResultSet::with_rows(SQLCommand::Select, columns, rows)
    }
}

impl Select {
    /// Names of the output columns
    fn output_columns(&self, table: Option<&TableDef>) -> ExecutionResult<Vec<String>> {
        let mut columns = Vec::new();
        for (position, item) in self.projection.iter().enumerate() {
            match item {
                SelectItem::Wildcard => match table {
                    Some(def) => columns.extend(def.column_names()),
                    None => {
                        return Err(ExecutionError::column_not_found(
                            "* (no table in scope)",
                        ))
                    }
                },
                SelectItem::Expression { alias: Some(alias), .. } => columns.push(alias.clone()),
                SelectItem::Expression {
                    expr: Expression::Column(name),
                    ..
                } => {
                    // Report the declared spelling of the column
                    let name = table
                        .and_then(|def| def.column_index(name).map(|i| def.columns[i].name.clone()))
                        .unwrap_or_else(|| name.clone());
                    columns.push(name);
                }
                SelectItem::Expression { .. } => columns.push(format!("column{}", position + 1)),
            }
        }
        Ok(columns)
    }

    /// Filter and project one source row
    fn process_row(
        &self,
        ctx: &ExecutionContext<'_>,
        values: Option<&[Value]>,
    ) -> ExecutionResult<Option<SortableRow>> {
        if let Some(filter) = &self.filter {
            if !filter.matches(ctx)? {
                return Ok(None);
            }
        }

        let mut row = Vec::with_capacity(self.projection.len());
        for item in &self.projection {
            match item {
                SelectItem::Wildcard => row.extend(values.unwrap_or_default().iter().cloned()),
                SelectItem::Expression { expr, .. } => row.push(expr.evaluate(ctx)?),
            }
        }

        let keys = self
            .order_by
            .iter()
            .map(|o| o.expr.evaluate(ctx))
            .collect::<ExecutionResult<Vec<_>>>()?;

        Ok(Some(SortableRow { keys, row }))
    }
}

/// Evaluates a LIMIT or OFFSET clause
fn count(clause: Option<&Expression>, ctx: &ExecutionContext<'_>) -> ExecutionResult<Option<usize>> {
    clause
        .map(|expr| {
            expr.evaluate(&ctx.nested())?
                .as_count()
                .map_err(|e| e.bound_to(expr))
        })
        .transpose()
}
