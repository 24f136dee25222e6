//! Delimited text files read through an explicit column schema.
//!
//! A [`TextSchema`] names and types each column once; every line is split on
//! the separator, converted field by field and handed to serde.

use super::read_file;
use crate::error::{Result, ToolboxError};
use crate::strings::equals_ignore_case;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// How a raw text field is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Boolean,
}

impl FieldKind {
    /// Returns the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
        }
    }

    fn convert(&self, raw: &str) -> Option<Value> {
        match self {
            Self::Text => Some(Value::String(raw.to_string())),
            Self::Integer => raw.trim().parse::<i64>().ok().map(Value::from),
            Self::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            Self::Boolean => {
                let raw = raw.trim();
                if equals_ignore_case(raw, "true") {
                    Some(Value::Bool(true))
                } else if equals_ignore_case(raw, "false") {
                    Some(Value::Bool(false))
                } else {
                    None
                }
            }
        }
    }
}

impl FromStr for FieldKind {
    type Err = ToolboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "string" => Ok(Self::Text),
            "integer" | "int" => Ok(Self::Integer),
            "float" | "double" => Ok(Self::Float),
            "boolean" | "bool" => Ok(Self::Boolean),
            other => Err(ToolboxError::format(format!(
                "Unknown field kind '{other}'. Expected text, integer, float or boolean"
            ))),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of a delimited text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    pub name: String,
    pub kind: FieldKind,
}

/// Ordered column descriptor for a delimited text file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSchema {
    fields: Vec<TextField>,
}

impl TextSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(TextField {
            name: name.into(),
            kind,
        });
        self
    }

    /// Columns in order.
    pub fn fields(&self) -> &[TextField] {
        &self.fields
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Converts one line into a JSON object keyed by field name.
    ///
    /// Returns `Ok(None)` when the field count does not match the schema.
    pub fn parse_line(
        &self,
        line: &str,
        separator: &str,
        line_number: usize,
    ) -> Result<Option<Map<String, Value>>> {
        let parts: Vec<&str> = line.split(separator).collect();
        if parts.len() != self.fields.len() {
            return Ok(None);
        }

        let mut record = Map::with_capacity(parts.len());
        for (field, raw) in self.fields.iter().zip(parts) {
            let value = field.kind.convert(raw).ok_or_else(|| {
                ToolboxError::format(format!(
                    "Line {line_number}, field '{}': '{raw}' is not a valid {}",
                    field.name, field.kind
                ))
            })?;
            record.insert(field.name.clone(), value);
        }
        Ok(Some(record))
    }
}

impl FromStr for TextSchema {
    type Err = ToolboxError;

    /// Parses `name:kind,name:kind`. A bare `name` is a text column.
    fn from_str(s: &str) -> Result<Self> {
        let mut schema = TextSchema::new();
        for entry in s.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            let (name, kind) = match entry.split_once(':') {
                Some((name, kind)) => (name.trim(), kind.parse()?),
                None => (entry, FieldKind::Text),
            };
            if name.is_empty() {
                return Err(ToolboxError::format(format!(
                    "Missing field name in '{entry}'"
                )));
            }
            if schema.fields.iter().any(|f| f.name == name) {
                return Err(ToolboxError::format(format!("Duplicate field '{name}'")));
            }
            schema = schema.field(name, kind);
        }

        if schema.is_empty() {
            return Err(ToolboxError::format("Schema has no fields"));
        }
        Ok(schema)
    }
}

/// Reads a delimited text file into records.
///
/// Blank lines and lines whose field count differs from the schema are
/// skipped. A field that does not convert to its declared kind fails the read.
pub fn read_txt<T: DeserializeOwned>(
    path: impl AsRef<Path>,
    separator: &str,
    schema: &TextSchema,
) -> Result<Vec<T>> {
    if separator.is_empty() {
        return Err(ToolboxError::format("Separator must not be empty"));
    }

    let path = path.as_ref();
    let content = read_file(path)?;
    let mut records = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let Some(record) = schema.parse_line(line, separator, line_number)? else {
            debug!(
                "Skipping line {line_number} of {}: expected {} fields",
                path.display(),
                schema.len()
            );
            continue;
        };

        let record = serde_json::from_value(Value::Object(record)).map_err(|e| {
            ToolboxError::serialization(format!(
                "Line {line_number} of {}: {e}",
                path.display()
            ))
        })?;
        records.push(record);
    }

    Ok(records)
}
