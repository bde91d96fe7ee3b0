//! Statement nodes
//!
//! Statements are immutable once parsed. The same tree may be executed
//! any number of times with different placeholder bindings.

use serde::{Deserialize, Serialize};

use crate::database::ColumnDef;
use crate::executor::SQLCommand;

use super::expression::Expression;

/// A parsed, executable SQL statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    // Schema definition
    CreateTable(CreateTable),
    DropTable(DropTable),
    DescribeTable(DescribeTable),

    // Data modification
    Insert(Insert),
    Update(Update),
    Delete(Delete),

    // Data query
    Select(Select),

    // Transaction control
    BeginTransaction(BeginTransaction),
    CommitTransaction(CommitTransaction),
    RollbackTransaction(RollbackTransaction),
}

impl Statement {
    /// Command tag of the result this statement produces
    pub fn command(&self) -> SQLCommand {
        match self {
            Self::CreateTable(_) => SQLCommand::Create,
            Self::DropTable(_) => SQLCommand::Drop,
            Self::DescribeTable(_) => SQLCommand::Describe,
            Self::Insert(_) => SQLCommand::Insert,
            Self::Update(_) => SQLCommand::Update,
            Self::Delete(_) => SQLCommand::Delete,
            Self::Select(_) => SQLCommand::Select,
            Self::BeginTransaction(_) => SQLCommand::BeginTransaction,
            Self::CommitTransaction(_) => SQLCommand::CommitTransaction,
            Self::RollbackTransaction(_) => SQLCommand::RollbackTransaction,
        }
    }

    /// Statement name for logging
    pub fn name(&self) -> &'static str {
        self.command().as_str()
    }

    pub fn is_transaction_control(&self) -> bool {
        matches!(
            self,
            Self::BeginTransaction(_) | Self::CommitTransaction(_) | Self::RollbackTransaction(_)
        )
    }

    /// Number of placeholder values this statement must be bound with.
    ///
    /// One past the highest placeholder index anywhere in the tree,
    /// nested sub-selects included.
    pub fn placeholder_count(&self) -> usize {
        let max = match self {
            Self::Insert(insert) => insert.max_placeholder(),
            Self::Update(update) => update.max_placeholder(),
            Self::Delete(delete) => delete.filter.as_ref().and_then(Expression::max_placeholder),
            Self::Select(select) => select.max_placeholder(),
            _ => None,
        };
        max.map_or(0, |index| index.saturating_add(1))
    }
}

/// CREATE TABLE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTable {
    pub table: String,
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub if_not_exists: bool,
}

/// DROP TABLE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTable {
    pub table: String,
    #[serde(default)]
    pub if_exists: bool,
}

/// DESCRIBE TABLE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribeTable {
    pub table: String,
}

/// Row source of an INSERT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertSource {
    Values(Vec<Vec<Expression>>),
    Select(Box<Select>),
}

/// INSERT INTO ... VALUES / INSERT INTO ... SELECT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insert {
    pub table: String,
    /// Target columns; all columns in declared order when absent
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    pub source: InsertSource,
}

impl Insert {
    fn max_placeholder(&self) -> Option<usize> {
        match &self.source {
            InsertSource::Values(rows) => rows
                .iter()
                .flatten()
                .map(Expression::max_placeholder)
                .max()
                .flatten(),
            InsertSource::Select(select) => select.max_placeholder(),
        }
    }
}

/// `column = value` in an UPDATE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub column: String,
    pub value: Expression,
}

/// UPDATE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub table: String,
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub filter: Option<Expression>,
}

impl Update {
    fn max_placeholder(&self) -> Option<usize> {
        self.assignments
            .iter()
            .map(|a| a.value.max_placeholder())
            .fold(
                self.filter.as_ref().and_then(Expression::max_placeholder),
                |acc, p| acc.max(p),
            )
    }
}

/// DELETE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delete {
    pub table: String,
    #[serde(default)]
    pub filter: Option<Expression>,
}

/// One item of a SELECT list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectItem {
    Wildcard,
    Expression {
        expr: Expression,
        #[serde(default)]
        alias: Option<String>,
    },
}

/// ORDER BY term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub expr: Expression,
    #[serde(default)]
    pub descending: bool,
}

/// SELECT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    /// Source table; a SELECT without FROM yields one row
    #[serde(default)]
    pub table: Option<String>,
    pub projection: Vec<SelectItem>,
    #[serde(default)]
    pub filter: Option<Expression>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    #[serde(default)]
    pub limit: Option<Expression>,
    #[serde(default)]
    pub offset: Option<Expression>,
}

impl Select {
    /// `SELECT * FROM table`
    pub fn all_from(table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            projection: vec![SelectItem::Wildcard],
            filter: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn with_filter(mut self, filter: Expression) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_order_by(mut self, expr: Expression, descending: bool) -> Self {
        self.order_by.push(OrderBy { expr, descending });
        self
    }

    fn max_placeholder(&self) -> Option<usize> {
        let projection = self.projection.iter().map(|item| match item {
            SelectItem::Wildcard => None,
            SelectItem::Expression { expr, .. } => expr.max_placeholder(),
        });
        let order_by = self.order_by.iter().map(|o| o.expr.max_placeholder());
        let clauses = [&self.filter, &self.limit, &self.offset]
            .into_iter()
            .map(|e| e.as_ref().and_then(Expression::max_placeholder));

        projection
            .chain(order_by)
            .chain(clauses)
            .fold(None, |acc, p| acc.max(p))
    }
}

/// BEGIN TRANSACTION
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BeginTransaction;

/// COMMIT TRANSACTION
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommitTransaction;

/// ROLLBACK TRANSACTION
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RollbackTransaction;
