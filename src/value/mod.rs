//! Scalar values for aerosql
//!
//! A `Value` is used as literal data, column content, and placeholder
//! binding. Values are immutable once constructed.
//!
//! # Comparison
//!
//! - Comparisons involving NULL yield no ordering (three-valued logic)
//! - Integer and float compare numerically
//! - Any other type mismatch is an execution error

mod value;

pub use value::{DataType, Value};
