//! Ordered row representation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single table row: column name to scalar value, in store column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Appends or replaces a cell, keeping the original position on replace.
    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.0.insert(column.into(), value);
    }

    /// Returns the raw value of a cell.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Column names in row order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Cell text used for change detection. Missing cells read as `""`.
    pub fn cell_text(&self, column: &str) -> String {
        self.get(column).map(cell_text).unwrap_or_default()
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Renders a cell value as the text a grid input shows.
///
/// `null` becomes the empty string, strings are taken verbatim, everything
/// else uses its compact JSON form.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
