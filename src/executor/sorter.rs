//! ORDER BY sorting
//!
//! Sorts rows by precomputed sort keys, deterministically.

use std::cmp::Ordering;

use crate::value::Value;

use super::result::Row;

/// A projected row paired with its ORDER BY key values
#[derive(Debug, Clone)]
pub struct SortableRow {
    pub keys: Vec<Value>,
    pub row: Row,
}

/// Sorts query output
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts rows by their keys; `descending[i]` applies to `keys[i]`.
    ///
    /// Sort is stable: rows with equal keys keep scan order.
    pub fn sort(rows: &mut [SortableRow], descending: &[bool]) {
        rows.sort_by(|a, b| Self::compare_keys(&a.keys, &b.keys, descending));
    }

    /// Compares key vectors term by term.
    ///
    /// Ordering rules (see [`Value::sort_cmp`]):
    /// - NULL sorts first ascending, last descending
    /// - INTEGER and FLOAT compare numerically
    fn compare_keys(a: &[Value], b: &[Value], descending: &[bool]) -> Ordering {
        a.iter()
            .zip(b)
            .zip(descending)
            .map(|((a, b), desc)| {
                let ordering = a.sort_cmp(b);
                if *desc {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}
