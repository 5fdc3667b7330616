//! Response types for HTTP endpoints.

use serde::{Deserialize, Serialize};

/// Error body: `{"error": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body returned by `POST /update`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateResponse {
    #[serde(rename = "updatedRows")]
    pub updated_rows: u64,
}

/// Helper to create error response
pub fn error_response(message: String) -> ErrorResponse {
    ErrorResponse { error: message }
}
