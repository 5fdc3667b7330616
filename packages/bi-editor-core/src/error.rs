//! Editor error types.

use thiserror::Error;

/// Errors raised while validating or persisting edits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Table or column name outside `[A-Za-z0-9_]+`
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// Malformed change-set, disallowed column, or missing primary key
    #[error("{0}")]
    Validation(String),

    /// Connectivity or query failure in the underlying store
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid startup configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EditorError {
    /// Shorthand for a validation failure.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Shorthand for a storage failure.
    pub fn storage(msg: impl std::fmt::Display) -> Self {
        Self::Storage(msg.to_string())
    }

    /// Returns true for errors caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidIdentifier(_) | Self::Validation(_))
    }
}
