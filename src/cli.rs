//! Command-line argument parsing for ToolBox.

use crate::config::{Config, ConnectionConfig};
use crate::db::{ConnectionPolicy, Params};
use crate::error::{Result, ToolboxError};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// How query rows are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented JSON array of objects.
    #[default]
    Json,
    /// Tab-separated columns with a header line.
    Table,
}

/// Raw SQL queries and file conversions from the command line.
#[derive(Parser, Debug)]
#[command(name = "toolbox")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one SQL statement and print the rows
    Query {
        /// SQL statement; `@name` or `:name` placeholders are bound from --param
        sql: String,

        /// Connection URL (postgres://, mysql://, sqlite:)
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        /// Use named connection from config
        #[arg(short = 'c', long, value_name = "NAME", conflicts_with = "url")]
        connection: Option<String>,

        /// Named parameter, repeatable
        #[arg(short = 'P', long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Close the connection after the statement
        #[arg(long)]
        close_after_query: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Convert a delimited text file to JSON
    TxtToJson {
        /// Input text file
        input: PathBuf,

        /// Output JSON file
        output: PathBuf,

        /// Column schema, e.g. "id:integer,name:text,active:boolean"
        #[arg(long, value_name = "SCHEMA")]
        columns: String,

        /// Field separator
        #[arg(long, value_name = "SEP", default_value = ";")]
        separator: String,
    },

    /// Capitalize the first letter of TEXT
    Capitalize {
        text: String,
    },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path (from CLI or default).
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }
}

/// Parses a `name=value` parameter.
fn parse_param(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("Invalid parameter '{s}'. Expected NAME=VALUE")),
    }
}

/// Collects repeated `--param` values into a parameter map.
///
/// Returns `None` when no parameter was given so the statement runs verbatim.
pub fn params_from_pairs(pairs: &[(String, String)]) -> Option<Params> {
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.iter().cloned().collect())
    }
}

/// Resolves the connection with precedence: `--url`, named connection,
/// default connection from config, environment.
///
/// `--close-after-query` overrides the configured policy.
pub fn resolve_connection(
    url: Option<&str>,
    name: Option<&str>,
    close_after_query: bool,
    config: &Config,
) -> Result<ConnectionConfig> {
    let mut connection = match (url, name) {
        (Some(url), _) => ConnectionConfig::new(url),
        (None, Some(name)) => config.get_connection(Some(name)).cloned().ok_or_else(|| {
            ToolboxError::config(format!("Connection '{name}' not found in config file"))
        })?,
        (None, None) => config
            .get_connection(None)
            .cloned()
            .or_else(ConnectionConfig::from_env)
            .ok_or_else(|| {
                ToolboxError::config(
                    "No database connection configured. Use --url, a [connections.default] \
                     entry or TOOLBOX_DATABASE_URL",
                )
            })?,
    };

    if close_after_query {
        connection.policy = ConnectionPolicy::CloseAfterQuery;
    }

    Ok(connection)
}
