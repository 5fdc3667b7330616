//! Editor configuration.

use crate::error::EditorError;
use crate::ident::is_valid_ident;

/// Immutable configuration shared by the API and the store.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Table being edited
    pub table: String,
    /// Ordered primary key columns used to target updates
    pub pk_cols: Vec<String>,
    /// Maximum number of rows returned by a snapshot
    pub limit: u64,
    /// Request body read timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl EditorConfig {
    /// Creates a configuration with default limits.
    pub fn new(table: impl Into<String>, pk_cols: Vec<String>) -> Self {
        Self {
            table: table.into(),
            pk_cols,
            limit: 200,
            request_timeout_ms: 5000,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }

    /// Checks that the table and every PK column are usable identifiers.
    pub fn validate(&self) -> Result<(), EditorError> {
        if self.table.is_empty() {
            return Err(EditorError::Config("table name is required".to_string()));
        }
        if !is_valid_ident(&self.table) {
            return Err(EditorError::InvalidIdentifier(self.table.clone()));
        }
        if self.pk_cols.is_empty() {
            return Err(EditorError::Config(
                "at least one primary key column is required (e.g. col1,col2)".to_string(),
            ));
        }
        if let Some(bad) = self.pk_cols.iter().find(|c| !is_valid_ident(c)) {
            return Err(EditorError::InvalidIdentifier(bad.clone()));
        }
        Ok(())
    }
}

/// Returns true if `column` is one of the primary key columns.
pub fn is_pk_column(pk_cols: &[String], column: &str) -> bool {
    pk_cols.iter().any(|c| c == column)
}

/// Splits a comma-separated PK list, trimming entries and dropping empties.
pub fn parse_pk_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
