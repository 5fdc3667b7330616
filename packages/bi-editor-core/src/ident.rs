//! Identifier guard for generated SQL.
//!
//! Table and column names cannot be bound as parameters, so every name that
//! reaches a statement goes through [`quote_ident`] first.

use crate::error::EditorError;

/// Substring that marks a column as user-editable.
pub const BI_MARKER: &str = "bi";

/// Returns true if `name` is non-empty and only contains `[A-Za-z0-9_]`.
pub fn is_valid_ident(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Quotes a table or column name for MySQL.
///
/// # Errors
/// Returns `EditorError::InvalidIdentifier` if the name contains anything
/// outside `[A-Za-z0-9_]`.
pub fn quote_ident(name: &str) -> Result<String, EditorError> {
    if !is_valid_ident(name) {
        return Err(EditorError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("`{}`", name))
}

/// Returns true if the column name carries the BI marker (case-insensitive).
pub fn is_bi_column(name: &str) -> bool {
    name.to_lowercase().contains(BI_MARKER)
}
