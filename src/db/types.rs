//! Row and result types for ToolBox queries.
//!
//! Every value is rendered as a string; a row keeps its columns in the order
//! the driver returned them.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Named parameters for a statement, keyed with or without the `@`/`:` sigil.
pub type Params = HashMap<String, String>;

/// All rows returned by one statement.
pub type ResultSet = Vec<Row>;

/// One record: an ordered column-name-to-value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    entries: Vec<(String, String)>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty row with room for `columns` entries.
    pub fn with_capacity(columns: usize) -> Self {
        Self {
            entries: Vec::with_capacity(columns),
        }
    }

    /// Appends a column. The caller guarantees the name is not already present.
    pub(crate) fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.entries.push((column.into(), value.into()));
    }

    /// Returns the value of the named column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Values in column order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, value)| value.as_str())
    }

    /// `(column, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Converts the row into an unordered map.
    pub fn into_map(self) -> HashMap<String, String> {
        self.entries.into_iter().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    /// Builds a row from pairs. A repeated column name replaces the earlier value.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            let column = column.into();
            let value = value.into();
            match row.entries.iter_mut().find(|(name, _)| *name == column) {
                Some(entry) => entry.1 = value,
                None => row.entries.push((column, value)),
            }
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (column, value) in &self.entries {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (column, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{column:?}: {value:?}")?;
        }
        write!(f, "}}")
    }
}

/// Makes column names unique.
///
/// The first occurrence keeps its name; later ones get `_2`, `_3`, ... skipping
/// any name that is already taken.
pub(crate) fn unique_column_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let names: Vec<&str> = names.into_iter().collect();
    let mut unique: Vec<String> = Vec::with_capacity(names.len());

    for (index, name) in names.iter().enumerate() {
        let clashes = unique.iter().any(|taken| taken == name);
        if !clashes {
            unique.push(name.to_string());
            continue;
        }

        let mut suffix = 2;
        loop {
            let candidate = format!("{name}_{suffix}");
            let taken = unique.iter().any(|taken| *taken == candidate)
                || names[index + 1..].iter().any(|later| *later == candidate);
            if !taken {
                unique.push(candidate);
                break;
            }
            suffix += 1;
        }
    }

    unique
}
