//! JSON array files.

use super::{read_file, write_file};
use crate::error::{Result, ToolboxError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Writes `items` as an indented JSON array, replacing the file.
pub fn write_json<T: Serialize>(items: &[T], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut json = serde_json::to_string_pretty(items).map_err(|e| {
        ToolboxError::serialization(format!("Failed to serialize {}: {e}", path.display()))
    })?;
    json.push('\n');
    write_file(path, &json)
}

/// Reads a JSON array of records.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    let path = path.as_ref();
    let content = read_file(path)?;
    serde_json::from_str(&content).map_err(|e| {
        ToolboxError::serialization(format!("Failed to deserialize {}: {e}", path.display()))
    })
}
