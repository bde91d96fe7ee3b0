//! Expression trees

use serde::{Deserialize, Serialize};

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOperator {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Concatenate,

    // Comparison
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEquals,
    GreaterThan,
    GreaterThanOrEquals,

    // Logical
    And,
    Or,
}

/// A scalar expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    Literal(Value),
    /// Zero-based index into the bound placeholder values
    Placeholder(usize),
    Column(String),
    Unary {
        op: UnaryOperator,
        expr: Box<Expression>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    IsNull {
        expr: Box<Expression>,
        #[serde(default)]
        negated: bool,
    },
    InList {
        expr: Box<Expression>,
        list: Vec<Expression>,
        #[serde(default)]
        negated: bool,
    },
    Between {
        expr: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
        #[serde(default)]
        negated: bool,
    },
}

impl Expression {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    pub fn null() -> Self {
        Expression::Literal(Value::Null)
    }

    pub fn placeholder(index: usize) -> Self {
        Expression::Placeholder(index)
    }

    pub fn column(name: impl Into<String>) -> Self {
        Expression::Column(name.into())
    }

    pub fn unary(op: UnaryOperator, expr: Expression) -> Self {
        Expression::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    pub fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `left = right`
    pub fn equals(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOperator::Equals, left, right)
    }

    /// Highest placeholder index referenced by this expression
    pub fn max_placeholder(&self) -> Option<usize> {
        match self {
            Expression::Literal(_) | Expression::Column(_) => None,
            Expression::Placeholder(index) => Some(*index),
            Expression::Unary { expr, .. } | Expression::IsNull { expr, .. } => {
                expr.max_placeholder()
            }
            Expression::Binary { left, right, .. } => {
                left.max_placeholder().max(right.max_placeholder())
            }
            Expression::InList { expr, list, .. } => list
                .iter()
                .map(Expression::max_placeholder)
                .fold(expr.max_placeholder(), |acc, p| acc.max(p)),
            Expression::Between {
                expr, low, high, ..
            } => expr
                .max_placeholder()
                .max(low.max_placeholder())
                .max(high.max_placeholder()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_placeholder_walks_tree() {
        let expr = Expression::binary(
            BinaryOperator::And,
            Expression::equals(Expression::column("a"), Expression::placeholder(0)),
            Expression::InList {
                expr: Box::new(Expression::column("b")),
                list: vec![Expression::literal(1), Expression::placeholder(3)],
                negated: false,
            },
        );

        assert_eq!(expr.max_placeholder(), Some(3));
        assert_eq!(Expression::column("a").max_placeholder(), None);
    }

    #[test]
    fn test_expression_from_json() {
        let json = r#"{"binary": {"op": "equals", "left": {"column": "id"}, "right": {"placeholder": 0}}}"#;
        let expr: Expression = serde_json::from_str(json).unwrap();

        assert_eq!(
            expr,
            Expression::equals(Expression::column("id"), Expression::placeholder(0))
        );
    }
}
