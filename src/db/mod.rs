//! Database access for ToolBox.
//!
//! A single [`QueryExecutor`] wraps one driver connection, runs raw SQL and
//! returns every row as an ordered string mapping.

mod driver;
mod executor;
mod params;
mod types;

pub use driver::NULL_PLACEHOLDER;
pub use executor::QueryExecutor;
pub use params::{bind_named, BoundStatement, PlaceholderStyle};
pub use types::{Params, ResultSet, Row};

use crate::error::{Result, ToolboxError};
use serde::{Deserialize, Serialize};
use url::Url;

/// Supported database backends, selected by connection URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Postgres,
    MySql,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a URL scheme.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "mysql" | "mariadb" => Some(Self::MySql),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Detects the backend from a connection string.
    pub fn from_connection_string(conn_str: &str) -> Result<Self> {
        let url = Url::parse(conn_str)
            .map_err(|e| ToolboxError::connection(format!("Invalid connection string: {e}")))?;

        Self::parse(url.scheme()).ok_or_else(|| {
            ToolboxError::connection(format!(
                "Unsupported database scheme '{}'. Expected postgres, mysql or sqlite",
                url.scheme()
            ))
        })
    }

    /// Returns how this backend spells positional placeholders.
    pub fn placeholder_style(&self) -> PlaceholderStyle {
        match self {
            Self::Postgres => PlaceholderStyle::Dollar,
            Self::MySql | Self::Sqlite => PlaceholderStyle::Question,
        }
    }
}

/// What happens to the connection once a query finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionPolicy {
    /// Reuse the open connection for the next query.
    #[default]
    KeepOpen,
    /// Close the connection after every query, successful or not.
    CloseAfterQuery,
}

/// Returns a connection string safe for logs: the password is masked.
///
/// Strings that do not parse as URLs are replaced entirely.
pub fn redact_connection_string(conn_str: &str) -> String {
    match Url::parse(conn_str) {
        Ok(mut url) => {
            if url.password().is_some() {
                // Only fails for URLs that cannot carry credentials.
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "<invalid connection string>".to_string(),
    }
}
