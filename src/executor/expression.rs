//! Expression evaluation
//!
//! Follows SQL three-valued logic:
//! - comparisons involving NULL yield NULL
//! - `AND` is false if either side is false, otherwise NULL if either is NULL
//! - `OR` is true if either side is true, otherwise NULL if either is NULL
//! - a WHERE clause keeps a row only when its predicate is exactly true

use std::cmp::Ordering;

use crate::ast::{BinaryOperator, Expression, UnaryOperator};
use crate::value::Value;

use super::context::ExecutionContext;
use super::errors::{ExecutionError, ExecutionResult};

impl Expression {
    /// Evaluate against the context's placeholders and current row
    pub fn evaluate(&self, ctx: &ExecutionContext<'_>) -> ExecutionResult<Value> {
        match self {
            Expression::Literal(value) => Ok(value.clone()),
            Expression::Placeholder(index) => ctx.placeholder(*index).cloned(),
            Expression::Column(name) => match &ctx.current_row {
                Some(row) => row.column(name).cloned(),
                None => Err(ExecutionError::column_not_found(format!(
                    "{} (no table in scope)",
                    name
                ))),
            },
            Expression::Unary { op, expr } => {
                let value = expr.evaluate(ctx)?;
                match op {
                    UnaryOperator::Negate => value.negate(),
                    UnaryOperator::Not => Ok(value.as_bool()?.map(|b| !b).into()),
                }
            }
            Expression::Binary { op, left, right } => evaluate_binary(*op, left, right, ctx),
            Expression::IsNull { expr, negated } => {
                let value = expr.evaluate(ctx)?;
                Ok(Value::Boolean(value.is_null() != *negated))
            }
            Expression::InList {
                expr,
                list,
                negated,
            } => {
                let value = expr.evaluate(ctx)?;
                if value.is_null() {
                    return Ok(Value::Null);
                }

                let mut saw_null = false;
                for item in list {
                    match value.compare(&item.evaluate(ctx)?)? {
                        Some(Ordering::Equal) => return Ok(Value::Boolean(!*negated)),
                        Some(_) => {}
                        None => saw_null = true,
                    }
                }

                if saw_null {
                    Ok(Value::Null)
                } else {
                    Ok(Value::Boolean(*negated))
                }
            }
            Expression::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let value = expr.evaluate(ctx)?;
                let above = value
                    .compare(&low.evaluate(ctx)?)?
                    .map(|o| o != Ordering::Less);
                let below = value
                    .compare(&high.evaluate(ctx)?)?
                    .map(|o| o != Ordering::Greater);

                let within = and(above, below);
                Ok(within.map(|b| b != *negated).into())
            }
        }
    }

    /// Evaluate as a row filter; NULL and false both reject
    pub fn matches(&self, ctx: &ExecutionContext<'_>) -> ExecutionResult<bool> {
        let value = self.evaluate(ctx)?;
        value.as_bool()?;
        Ok(value.is_true())
    }
}

fn evaluate_binary(
    op: BinaryOperator,
    left: &Expression,
    right: &Expression,
    ctx: &ExecutionContext<'_>,
) -> ExecutionResult<Value> {
    // Logical operators short-circuit on the deciding value
    match op {
        BinaryOperator::And => {
            let l = left.evaluate(ctx)?.as_bool()?;
            if l == Some(false) {
                return Ok(Value::Boolean(false));
            }
            let r = right.evaluate(ctx)?.as_bool()?;
            return Ok(and(l, r).into());
        }
        BinaryOperator::Or => {
            let l = left.evaluate(ctx)?.as_bool()?;
            if l == Some(true) {
                return Ok(Value::Boolean(true));
            }
            let r = right.evaluate(ctx)?.as_bool()?;
            return Ok(or(l, r).into());
        }
        _ => {}
    }

    let l = left.evaluate(ctx)?;
    let r = right.evaluate(ctx)?;

    match op {
        BinaryOperator::Add => l.add(&r),
        BinaryOperator::Subtract => l.subtract(&r),
        BinaryOperator::Multiply => l.multiply(&r),
        BinaryOperator::Divide => l.divide(&r),
        BinaryOperator::Modulo => l.modulo(&r),
        BinaryOperator::Concatenate => l.concat(&r),
        BinaryOperator::Equals => compare(&l, &r, |o| o == Ordering::Equal),
        BinaryOperator::NotEquals => compare(&l, &r, |o| o != Ordering::Equal),
        BinaryOperator::LessThan => compare(&l, &r, |o| o == Ordering::Less),
        BinaryOperator::LessThanOrEquals => compare(&l, &r, |o| o != Ordering::Greater),
        BinaryOperator::GreaterThan => compare(&l, &r, |o| o == Ordering::Greater),
        BinaryOperator::GreaterThanOrEquals => compare(&l, &r, |o| o != Ordering::Less),
        BinaryOperator::And => Ok(and(l.as_bool()?, r.as_bool()?).into()),
        BinaryOperator::Or => Ok(or(l.as_bool()?, r.as_bool()?).into()),
    }
}

fn compare(l: &Value, r: &Value, test: impl Fn(Ordering) -> bool) -> ExecutionResult<Value> {
    Ok(l.compare(r)?.map(test).into())
}

fn and(l: Option<bool>, r: Option<bool>) -> Option<bool> {
    match (l, r) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

fn or(l: Option<bool>, r: Option<bool>) -> Option<bool> {
    match (l, r) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}
