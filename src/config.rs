//! Configuration management for ToolBox.
//!
//! Handles loading named database connections from a TOML file, with
//! environment variables as the last fallback.

use crate::db::{redact_connection_string, ConnectionPolicy};
use crate::error::{Result, ToolboxError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variables consulted for a connection URL, in order.
pub const URL_ENV_VARS: [&str; 2] = ["TOOLBOX_DATABASE_URL", "DATABASE_URL"];

/// Main configuration structure for ToolBox.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Named database connections.
    #[serde(default)]
    pub connections: HashMap<String, ConnectionConfig>,
}

/// Database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Driver connection URL (`postgres://`, `mysql://`, `sqlite:`).
    pub url: String,

    /// Whether the connection stays open between queries.
    #[serde(default)]
    pub policy: ConnectionPolicy,
}

impl ConnectionConfig {
    /// Creates a connection config with the default policy.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            policy: ConnectionPolicy::default(),
        }
    }

    /// Builds a connection config from the first non-empty URL environment variable.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        URL_ENV_VARS
            .iter()
            .find_map(|&name| lookup(name).filter(|url| !url.trim().is_empty()))
            .map(Self::new)
    }

    /// Returns a display-safe string (no password) for logs.
    pub fn display_string(&self) -> String {
        redact_connection_string(&self.url)
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("toolbox")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields the default.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ToolboxError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            ToolboxError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Gets a named connection, or the default connection if name is None.
    pub fn get_connection(&self, name: Option<&str>) -> Option<&ConnectionConfig> {
        let key = name.unwrap_or("default");
        self.connections.get(key)
    }
}
