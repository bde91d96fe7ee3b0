//! Statement executor (auto-commit driver)
//!
//! # Execution Flow (strict order)
//!
//! 1. Check placeholder bindings against the statement
//! 2. Build the execution context
//! 3. Execute the statement
//! 4. On failure: report and return the error unchanged, never commit
//! 5. Call the database's auto-commit exactly once
//! 6. Record metrics and return the result
//!
//! Auto-commit runs after every successful statement, transaction control
//! included. Auto-commit is scoped to the issuing connection and publishes
//! nothing while it is inside an explicit transaction, so BEGIN followed by
//! auto-commit leaves the connection inside its transaction.

use std::sync::Arc;

use crate::ast::Statement;
use crate::config::ExecutorConfig;
use crate::database::{ConnectionId, Database};
use crate::observability::{Event, Logger, MetricsRegistry, Severity, Timer};
use crate::value::Value;

use super::context::ExecutionContext;
use super::errors::{ExecutionError, ExecutionResult};
use super::result::{ResultSet, SQLCommand};
use super::statement::Execute;

/// Executes statements against a shared database
///
/// Holds no per-connection state; one executor serves every connection.
#[derive(Debug, Default)]
pub struct StatementExecutor {
    config: ExecutorConfig,
    metrics: Arc<MetricsRegistry>,
}

impl StatementExecutor {
    /// Create an executor with its own metrics registry
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Report into an existing metrics registry
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Execute one top-level statement for a connection.
    ///
    /// Statement errors are returned verbatim and skip auto-commit. An
    /// auto-commit failure is returned as [`ExecutionError::AutoCommit`]
    /// even though the statement itself succeeded.
    pub fn execute(
        &self,
        database: &Arc<dyn Database>,
        connection_id: ConnectionId,
        statement: &Statement,
        placeholder_values: &[Value],
    ) -> ExecutionResult<ResultSet> {
        let timer = Timer::new();
        let connection = connection_id.to_string();
        let fields = [
            ("connection", connection.as_str()),
            ("statement", statement.name()),
        ];
        self.log_statement(Event::StatementBegin, &fields);

        let result = self
            .check_bindings(statement, placeholder_values)
            .and_then(|()| {
                let ctx = ExecutionContext::new(
                    database.as_ref(),
                    connection_id,
                    statement,
                    placeholder_values,
                    &self.config,
                );
                statement.execute(&ctx)
            });

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                self.metrics.increment_statements_failed();
                let message = e.to_string();
                Logger::log(
                    statement_failure_severity(&e),
                    Event::StatementFailed.as_str(),
                    &[
                        fields[0],
                        fields[1],
                        ("code", e.code()),
                        ("error", message.as_str()),
                    ],
                );
                return Err(e);
            }
        };

        if let Err(e) = database.commit(connection_id) {
            self.metrics.increment_auto_commit_failures();
            let message = e.to_string();
            Logger::event(
                Event::AutoCommitFailed,
                &[fields[0], fields[1], ("error", message.as_str())],
            );
            return Err(ExecutionError::AutoCommit(e));
        }
        self.metrics.increment_auto_commits();
        Logger::event(Event::AutoCommit, &fields);

        self.record_success(&result);
        let elapsed = timer.elapsed_us();
        let rows = result.len().to_string();
        let affected = result.rows_affected().to_string();
        self.log_statement(
            Event::StatementComplete,
            &[
                fields[0],
                fields[1],
                ("duration_us", elapsed.as_str()),
                ("rows", rows.as_str()),
                ("rows_affected", affected.as_str()),
            ],
        );

        Ok(result)
    }

    /// Placeholder values must match the statement exactly
    fn check_bindings(&self, statement: &Statement, values: &[Value]) -> ExecutionResult<()> {
        if values.len() > self.config.max_placeholders {
            return Err(ExecutionError::placeholder_binding(format!(
                "{} placeholder values supplied, at most {} allowed",
                values.len(),
                self.config.max_placeholders
            )));
        }

        let expected = statement.placeholder_count();
        if values.len() != expected {
            return Err(ExecutionError::placeholder_binding(format!(
                "{} statement expects {} placeholder values, {} supplied",
                statement.name(),
                expected,
                values.len()
            )));
        }
        Ok(())
    }

    fn record_success(&self, result: &ResultSet) {
        self.metrics.increment_statements_executed();
        match result.command() {
            SQLCommand::BeginTransaction => self.metrics.increment_transactions_begun(),
            SQLCommand::CommitTransaction => self.metrics.increment_transactions_committed(),
            SQLCommand::RollbackTransaction => self.metrics.increment_transactions_rolled_back(),
            SQLCommand::Select | SQLCommand::Describe => {
                self.metrics.add_rows_returned(result.len() as u64)
            }
            SQLCommand::Insert | SQLCommand::Update | SQLCommand::Delete => {
                self.metrics.add_rows_affected(result.rows_affected() as u64)
            }
            SQLCommand::Create | SQLCommand::Drop => {}
        }
    }

    /// Begin/complete lines are promoted to INFO when statement logging is on
    fn log_statement(&self, event: Event, fields: &[(&str, &str)]) {
        if self.config.log_statements {
            Logger::log(Severity::Info, event.as_str(), fields);
        } else {
            Logger::event(event, fields);
        }
    }
}

/// Fatal statement errors keep their severity in the log
fn statement_failure_severity(e: &ExecutionError) -> Severity {
    if e.is_fatal() {
        Severity::Fatal
    } else {
        Event::StatementFailed.severity()
    }
}

/// Execute a statement with a default [`StatementExecutor`]
pub fn execute(
    database: &Arc<dyn Database>,
    connection_id: ConnectionId,
    statement: &Statement,
    placeholder_values: &[Value],
) -> ExecutionResult<ResultSet> {
    StatementExecutor::default().execute(database, connection_id, statement, placeholder_values)
}
