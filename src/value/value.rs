//! Value and DataType definitions

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::executor::{ExecutionError, ExecutionResult};

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Boolean,
    Integer,
    Float,
    Text,
}

impl DataType {
    /// Returns the SQL name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Integer => "INTEGER",
            DataType::Float => "FLOAT",
            DataType::Text => "TEXT",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed scalar
///
/// Serialized as a plain JSON scalar. Variant order matters for
/// deserialization: integers must be tried before floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Create a text value
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Returns the type of this value, `None` for NULL
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Integer(_) => Some(DataType::Integer),
            Value::Float(_) => Some(DataType::Float),
            Value::Text(_) => Some(DataType::Text),
        }
    }

    /// Returns the type name used in error messages
    pub fn type_name(&self) -> &'static str {
        self.data_type().map(|t| t.as_str()).unwrap_or("NULL")
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true only for `Boolean(true)`.
    ///
    /// Used by WHERE evaluation, where NULL and false both reject a row.
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Boolean(true))
    }

    /// Converts to a boolean for logical operators, NULL stays `None`
    pub fn as_bool(&self) -> ExecutionResult<Option<bool>> {
        match self {
            Value::Null => Ok(None),
            Value::Boolean(b) => Ok(Some(*b)),
            other => Err(ExecutionError::TypeMismatch(format!(
                "expected BOOLEAN, found {}",
                other.type_name()
            ))),
        }
    }

    /// Converts to a non-negative count, as used by LIMIT and OFFSET
    pub fn as_count(&self) -> ExecutionResult<usize> {
        match self {
            Value::Integer(n) if *n >= 0 => Ok(*n as usize),
            Value::Integer(n) => Err(ExecutionError::TypeMismatch(format!(
                "expected a non-negative integer, found {}",
                n
            ))),
            other => Err(ExecutionError::TypeMismatch(format!(
                "expected INTEGER, found {}",
                other.type_name()
            ))),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Coerces this value to a column type, `None` if incompatible.
    ///
    /// NULL is accepted by every type (nullability is checked elsewhere).
    /// The only implicit conversion is INTEGER to FLOAT.
    pub fn coerce_to(self, target: DataType) -> Option<Value> {
        match (self, target) {
            (Value::Null, _) => Some(Value::Null),
            (Value::Integer(n), DataType::Float) => Some(Value::Float(n as f64)),
            (v, t) if v.data_type() == Some(t) => Some(v),
            _ => None,
        }
    }

    /// SQL comparison.
    ///
    /// Returns `Ok(None)` when either side is NULL.
    pub fn compare(&self, other: &Value) -> ExecutionResult<Option<Ordering>> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => Ok(None),
            (Value::Integer(a), Value::Integer(b)) => Ok(Some(a.cmp(b))),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Some(a.cmp(b))),
            (Value::Text(a), Value::Text(b)) => Ok(Some(a.cmp(b))),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).map(Some).ok_or_else(|| {
                    ExecutionError::TypeMismatch("cannot compare NaN".to_string())
                }),
                _ => Err(ExecutionError::TypeMismatch(format!(
                    "cannot compare {} with {}",
                    a.type_name(),
                    b.type_name()
                ))),
            },
        }
    }

    /// Total ordering used for sorting.
    ///
    /// Ordering rules:
    /// - NULL < BOOLEAN < numbers < TEXT
    /// - Integers and floats sort together numerically
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        let rank = |v: &Value| -> u8 {
            match v {
                Value::Null => 0,
                Value::Boolean(_) => 1,
                Value::Integer(_) | Value::Float(_) => 2,
                Value::Text(_) => 3,
            }
        };

        match rank(self).cmp(&rank(other)) {
            Ordering::Equal => {}
            unequal => return unequal,
        }

        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (a, b) => {
                let x = a.as_f64().unwrap_or(0.0);
                let y = b.as_f64().unwrap_or(0.0);
                x.total_cmp(&y)
            }
        }
    }

    /// Arithmetic negation
    pub fn negate(&self) -> ExecutionResult<Value> {
        match self {
            Value::Null => Ok(Value::Null),
            Value::Integer(n) => n
                .checked_neg()
                .map(Value::Integer)
                .ok_or_else(|| ExecutionError::TypeMismatch("integer overflow".to_string())),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(ExecutionError::TypeMismatch(format!(
                "cannot negate {}",
                other.type_name()
            ))),
        }
    }

    pub fn add(&self, other: &Value) -> ExecutionResult<Value> {
        self.arithmetic(other, "+", i64::checked_add, |a, b| a + b)
    }

    pub fn subtract(&self, other: &Value) -> ExecutionResult<Value> {
        self.arithmetic(other, "-", i64::checked_sub, |a, b| a - b)
    }

    pub fn multiply(&self, other: &Value) -> ExecutionResult<Value> {
        self.arithmetic(other, "*", i64::checked_mul, |a, b| a * b)
    }

    pub fn divide(&self, other: &Value) -> ExecutionResult<Value> {
        if other.is_zero() {
            return Err(ExecutionError::TypeMismatch("division by zero".to_string()));
        }
        self.arithmetic(other, "/", i64::checked_div, |a, b| a / b)
    }

    pub fn modulo(&self, other: &Value) -> ExecutionResult<Value> {
        if other.is_zero() {
            return Err(ExecutionError::TypeMismatch("division by zero".to_string()));
        }
        self.arithmetic(other, "%", i64::checked_rem, |a, b| a % b)
    }

    /// String concatenation (`||`)
    pub fn concat(&self, other: &Value) -> ExecutionResult<Value> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
            (Value::Text(a), Value::Text(b)) => Ok(Value::Text(format!("{}{}", a, b))),
            (a, b) => Err(ExecutionError::TypeMismatch(format!(
                "cannot concatenate {} and {}",
                a.type_name(),
                b.type_name()
            ))),
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Value::Integer(n) => *n == 0,
            Value::Float(f) => *f == 0.0,
            _ => false,
        }
    }

    fn arithmetic(
        &self,
        other: &Value,
        symbol: &str,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> ExecutionResult<Value> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
            (Value::Integer(a), Value::Integer(b)) => int_op(*a, *b)
                .map(Value::Integer)
                .ok_or_else(|| ExecutionError::TypeMismatch("integer overflow".to_string())),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => match float_op(x, y) {
                    r if r.is_nan() => Err(ExecutionError::TypeMismatch(format!(
                        "{} {} {} is not a number",
                        a, symbol, b
                    ))),
                    r => Ok(Value::Float(r)),
                },
                _ => Err(ExecutionError::TypeMismatch(format!(
                    "cannot apply {} to {} and {}",
                    symbol,
                    a.type_name(),
                    b.type_name()
                ))),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// `None` becomes NULL
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
