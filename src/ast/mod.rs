//! Statement trees consumed by the executor
//!
//! The parser (outside this crate) produces these nodes. They can also be
//! exchanged as JSON: every node is serde-serializable with snake_case
//! variant names, e.g.
//!
//! ```json
//! {"delete": {"table": "users", "filter": {"binary": {
//!     "op": "equals", "left": {"column": "id"}, "right": {"placeholder": 0}}}}}
//! ```

mod expression;
mod statement;

pub use expression::{BinaryOperator, Expression, UnaryOperator};
pub use statement::{
    Assignment, BeginTransaction, CommitTransaction, CreateTable, Delete, DescribeTable,
    DropTable, Insert, InsertSource, OrderBy, RollbackTransaction, Select, SelectItem, Statement,
    Update,
};
