//! Observability for aerosql
//!
//! This module provides:
//! - Structured logging (JSON lines through the `log` facade)
//! - Typed execution events
//! - Execution counters
//! - Statement timing
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use aerosql::observability::{Event, Logger, MetricsRegistry};
//!
//! Logger::event(Event::TransactionBegin, &[("connection", "…")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_statements_executed();
//! ```

mod events;
mod logger;
mod metrics;
mod timer;

pub use events::Event;
pub use logger::{Logger, Severity, LOG_TARGET};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use timer::Timer;
