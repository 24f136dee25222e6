//! Error types for ToolBox.
//!
//! Defines the main error enum used throughout the library.

use thiserror::Error;

/// Main error type for ToolBox operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolboxError {
    /// Connection errors (bad connection string, unsupported driver, open failed).
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement execution errors (syntax errors, driver errors, missing parameters).
    #[error("Execution error: {0}")]
    Execution(String),

    /// A column value could not be rendered as a string.
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// File system errors (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// XML or JSON encoding/decoding errors.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Delimited text errors (field conversion failures, invalid schema).
    #[error("Format error: {0}")]
    Format(String),

    /// Configuration errors (invalid config file, unresolvable connection, etc.)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ToolboxError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates an execution error with the given message.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Creates a conversion error with the given message.
    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }

    /// Creates an I/O error with the given message.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Creates a serialization error with the given message.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates a format error with the given message.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Failure",
            Self::Execution(_) => "Execution Failure",
            Self::Conversion(_) => "Conversion Failure",
            Self::Io(_) => "I/O Error",
            Self::Serialization(_) => "Serialization Error",
            Self::Format(_) => "Format Error",
            Self::Config(_) => "Configuration Error",
        }
    }

    /// Wraps a `std::io::Error` raised while touching `path`.
    pub(crate) fn from_io(error: std::io::Error, path: &std::path::Path) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            Self::io(format!("File not found: {}", path.display()))
        } else {
            Self::io(format!("{}: {error}", path.display()))
        }
    }
}

/// Result type alias using ToolboxError.
pub type Result<T> = std::result::Result<T, ToolboxError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_display_connection() {
        let err = ToolboxError::connection("Cannot connect to localhost:5432");
        assert_eq!(
            err.to_string(),
            "Connection error: Cannot connect to localhost:5432"
        );
        assert_eq!(err.category(), "Connection Failure");
    }

    #[test]
    fn test_error_display_execution() {
        let err = ToolboxError::execution("near \"SELEC\": syntax error");
        assert_eq!(
            err.to_string(),
            "Execution error: near \"SELEC\": syntax error"
        );
        assert_eq!(err.category(), "Execution Failure");
    }

    #[test]
    fn test_error_display_conversion() {
        let err = ToolboxError::conversion("column 'amount': unsupported type NUMERIC");
        assert_eq!(
            err.to_string(),
            "Conversion error: column 'amount': unsupported type NUMERIC"
        );
        assert_eq!(err.category(), "Conversion Failure");
    }

    #[test]
    fn test_error_display_format() {
        let err = ToolboxError::format("line 3, field 'age': 'abc' is not a valid integer");
        assert_eq!(
            err.to_string(),
            "Format error: line 3, field 'age': 'abc' is not a valid integer"
        );
        assert_eq!(err.category(), "Format Error");
    }

    #[test]
    fn test_error_display_config() {
        let err = ToolboxError::config("missing field 'url' in connections.default");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing field 'url' in connections.default"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_from_io_not_found() {
        let io = std::io::Error::from(std::io::ErrorKind::NotFound);
        let err = ToolboxError::from_io(io, Path::new("/tmp/missing.xml"));
        assert_eq!(
            err,
            ToolboxError::Io("File not found: /tmp/missing.xml".to_string())
        );
        assert_eq!(err.category(), "I/O Error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ToolboxError>();
    }
}
