//! Logging configuration and error reporting for ToolBox.
//!
//! The binary initializes a stderr subscriber. Library code only emits
//! `tracing` events; failures swallowed by [`crate::db::QueryExecutor::query`]
//! go through an [`ErrorReporter`] so callers can observe them.

use crate::error::ToolboxError;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Diagnostic prefix for connection failures.
pub const CONNECTION_FAILURE_PREFIX: &str = "Database connection failed";

/// Diagnostic prefix for every other query failure.
pub const QUERY_FAILURE_PREFIX: &str = "Query execution failed";

/// Initializes logging to stderr.
///
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` when
/// `verbose` is true.
pub fn init_stderr_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Returns the fixed diagnostic prefix for an error.
pub fn prefix_for(error: &ToolboxError) -> &'static str {
    match error {
        ToolboxError::Connection(_) => CONNECTION_FAILURE_PREFIX,
        _ => QUERY_FAILURE_PREFIX,
    }
}

/// Receives failures that are suppressed instead of returned.
///
/// Implementations must not panic.
pub trait ErrorReporter: Send + Sync {
    /// Reports one failure with a human-readable prefix.
    fn report(&self, prefix: &str, error: &ToolboxError);
}

/// Default reporter: one `tracing::error!` event per failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, prefix: &str, error: &ToolboxError) {
        tracing::error!(category = error.category(), "{prefix}: {error}");
    }
}

/// Reporter that keeps every failure in memory.
///
/// Useful in tests and for callers that want to inspect failures after the fact.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<(String, ToolboxError)>>,
}

impl RecordingReporter {
    /// Creates an empty recording reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything reported so far.
    pub fn reports(&self) -> Vec<(String, ToolboxError)> {
        self.reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }

    /// Returns the number of failures reported so far.
    pub fn count(&self) -> usize {
        self.reports.lock().map(|reports| reports.len()).unwrap_or(0)
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, prefix: &str, error: &ToolboxError) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push((prefix.to_string(), error.clone()));
        }
    }
}
