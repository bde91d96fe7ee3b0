//! Metrics registry for statement execution
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe but lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Registry of execution counters
///
/// All counters use Relaxed ordering; exactness per counter is all that
/// is required.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    statements_executed: AtomicU64,
    statements_failed: AtomicU64,
    auto_commits: AtomicU64,
    auto_commit_failures: AtomicU64,
    transactions_begun: AtomicU64,
    transactions_committed: AtomicU64,
    transactions_rolled_back: AtomicU64,
    rows_returned: AtomicU64,
    rows_affected: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_statements_executed(&self) {
        self.statements_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_statements_failed(&self) {
        self.statements_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_auto_commits(&self) {
        self.auto_commits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_auto_commit_failures(&self) {
        self.auto_commit_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_transactions_begun(&self) {
        self.transactions_begun.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_transactions_committed(&self) {
        self.transactions_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_transactions_rolled_back(&self) {
        self.transactions_rolled_back.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rows_returned(&self, rows: u64) {
        self.rows_returned.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn add_rows_affected(&self, rows: u64) {
        self.rows_affected.fetch_add(rows, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            statements_executed: self.statements_executed.load(Ordering::Relaxed),
            statements_failed: self.statements_failed.load(Ordering::Relaxed),
            auto_commits: self.auto_commits.load(Ordering::Relaxed),
            auto_commit_failures: self.auto_commit_failures.load(Ordering::Relaxed),
            transactions_begun: self.transactions_begun.load(Ordering::Relaxed),
            transactions_committed: self.transactions_committed.load(Ordering::Relaxed),
            transactions_rolled_back: self.transactions_rolled_back.load(Ordering::Relaxed),
            rows_returned: self.rows_returned.load(Ordering::Relaxed),
            rows_affected: self.rows_affected.load(Ordering::Relaxed),
        }
    }

    /// Export metrics as a JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| String::from("{}"))
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub statements_executed: u64,
    pub statements_failed: u64,
    pub auto_commits: u64,
    pub auto_commit_failures: u64,
    pub transactions_begun: u64,
    pub transactions_committed: u64,
    pub transactions_rolled_back: u64,
    pub rows_returned: u64,
    pub rows_affected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let snapshot = MetricsRegistry::new().snapshot();
        assert_eq!(snapshot.statements_executed, 0);
        assert_eq!(snapshot.auto_commits, 0);
        assert_eq!(snapshot.rows_returned, 0);
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_statements_executed();
        registry.increment_statements_executed();
        registry.increment_statements_failed();
        registry.increment_auto_commits();
        registry.increment_transactions_begun();
        registry.increment_transactions_committed();
        registry.add_rows_returned(5);
        registry.add_rows_affected(2);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.statements_executed, 2);
        assert_eq!(snapshot.statements_failed, 1);
        assert_eq!(snapshot.auto_commits, 1);
        assert_eq!(snapshot.transactions_begun, 1);
        assert_eq!(snapshot.transactions_committed, 1);
        assert_eq!(snapshot.transactions_rolled_back, 0);
        assert_eq!(snapshot.rows_returned, 5);
        assert_eq!(snapshot.rows_affected, 2);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.increment_auto_commit_failures();

        let parsed: serde_json::Value = serde_json::from_str(&registry.to_json()).unwrap();
        assert_eq!(parsed["auto_commit_failures"], 1);
        assert_eq!(parsed["statements_executed"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        reg.increment_statements_executed();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.snapshot().statements_executed, 800);
    }
}
