//! Blocking SQL executor.
//!
//! Provides `QueryExecutor`, which owns at most one driver connection and
//! drives it on a private current-thread tokio runtime so callers never see
//! async code.

use super::driver::{DriverConnection, DriverOptions};
use super::params::{bind_named, BoundStatement};
use super::types::{Params, ResultSet};
use super::{redact_connection_string, ConnectionPolicy, DatabaseBackend};
use crate::error::{Result, ToolboxError};
use crate::logging::{prefix_for, ErrorReporter, TracingReporter};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

/// Everything needed to open a connection, resolved once at construction.
struct Target {
    options: DriverOptions,
    backend: DatabaseBackend,
    display: String,
    runtime: Runtime,
}

/// Runs raw SQL against one database connection and returns string rows.
///
/// The connection is opened lazily on the first query. With
/// [`ConnectionPolicy::KeepOpen`] it stays open between queries; with
/// [`ConnectionPolicy::CloseAfterQuery`] it is closed when each query ends.
///
/// Calls take `&mut self`: one instance serves one caller at a time.
pub struct QueryExecutor {
    // Declared before `target` so it is dropped while the runtime still exists.
    connection: Option<DriverConnection>,
    target: std::result::Result<Target, ToolboxError>,
    policy: ConnectionPolicy,
    reporter: Arc<dyn ErrorReporter>,
}

impl QueryExecutor {
    /// Creates an executor that keeps its connection open and logs failures
    /// through `tracing`.
    pub fn new(connection_string: &str) -> Self {
        Self::with_reporter(
            connection_string,
            ConnectionPolicy::default(),
            Arc::new(TracingReporter),
        )
    }

    /// Creates an executor with an explicit policy and reporter.
    ///
    /// Nothing is opened here. An invalid connection string is reported once
    /// and every later query fails with the same connection error.
    pub fn with_reporter(
        connection_string: &str,
        policy: ConnectionPolicy,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let target = Self::resolve_target(connection_string);
        if let Err(e) = &target {
            reporter.report(prefix_for(e), e);
        }

        Self {
            connection: None,
            target,
            policy,
            reporter,
        }
    }

    fn resolve_target(connection_string: &str) -> Result<Target> {
        let backend = DatabaseBackend::from_connection_string(connection_string)?;
        let options = DriverOptions::parse(backend, connection_string)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ToolboxError::connection(format!("Failed to create runtime: {e}")))?;

        Ok(Target {
            options,
            backend,
            display: redact_connection_string(connection_string),
            runtime,
        })
    }

    /// Returns the backend, or `None` if construction failed.
    pub fn backend(&self) -> Option<DatabaseBackend> {
        self.target.as_ref().ok().map(|t| t.backend)
    }

    /// Returns the connection policy.
    pub fn policy(&self) -> ConnectionPolicy {
        self.policy
    }

    /// Returns true while a connection is held open.
    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// Executes `statement` and returns every row.
    ///
    /// Never fails: any error is sent to the reporter and an empty result is
    /// returned, so a failed query looks the same as one that matched nothing.
    /// Use [`QueryExecutor::try_query`] to tell them apart.
    pub fn query(&mut self, statement: &str, params: Option<&Params>) -> ResultSet {
        match self.try_query(statement, params) {
            Ok(rows) => rows,
            Err(e) => {
                self.reporter.report(prefix_for(&e), &e);
                Vec::new()
            }
        }
    }

    /// Executes `statement` and returns every row, or the first failure.
    ///
    /// With `params`, `@name`/`:name` placeholders are bound as strings.
    /// Without, the statement runs verbatim.
    pub fn try_query(&mut self, statement: &str, params: Option<&Params>) -> Result<ResultSet> {
        let target = self.target.as_ref().map_err(Clone::clone)?;

        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(ToolboxError::execution(
                "QueryExecutor blocks and cannot be called from inside an async runtime",
            ));
        }

        let bound = match params {
            Some(params) => bind_named(statement, params, target.backend)?,
            None => BoundStatement::verbatim(statement),
        };

        let mut connection = match self.connection.take() {
            Some(connection) => connection,
            None => open(target)?,
        };

        let result = target.runtime.block_on(connection.fetch_rows(&bound));

        match self.policy {
            ConnectionPolicy::KeepOpen => self.connection = Some(connection),
            ConnectionPolicy::CloseAfterQuery => {
                // A failed close is logged; the query outcome still wins.
                let _ = close(target, connection);
            }
        }

        result
    }

    /// Closes the connection if one is open.
    ///
    /// Inside an async runtime the connection is dropped without the
    /// graceful close handshake.
    pub fn close(&mut self) -> Result<()> {
        match (self.connection.take(), self.target.as_ref()) {
            (Some(connection), Ok(target)) => {
                if tokio::runtime::Handle::try_current().is_ok() {
                    drop(connection);
                    return Ok(());
                }
                close(target, connection)
            }
            _ => Ok(()),
        }
    }
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field(
                "target",
                &self.target.as_ref().map(|t| t.display.as_str()),
            )
            .field("open", &self.is_open())
            .field("policy", &self.policy)
            .finish()
    }
}

fn open(target: &Target) -> Result<DriverConnection> {
    debug!("Opening connection to {}", target.display);
    target
        .runtime
        .block_on(target.options.connect())
        .map_err(|e| ToolboxError::connection(format!("Cannot open {}: {e}", target.display)))
}

fn close(target: &Target, connection: DriverConnection) -> Result<()> {
    debug!("Closing connection to {}", target.display);
    target.runtime.block_on(connection.close()).map_err(|e| {
        warn!("Closing connection to {} failed: {e}", target.display);
        ToolboxError::connection(format!("Failed to close connection: {e}"))
    })
}
