//! Request and response utilities for HTTP endpoints.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Request, Response};
use serde::Serialize;
use tokio::time;

use crate::router::RouterError;

/// Reads the whole request body, bounded by size and time.
///
/// # Arguments
/// * `req` - Incoming request; its body is consumed
/// * `timeout_ms` - Time allowed to receive the full body
/// * `max_bytes` - Largest accepted body size
///
/// # Returns
/// The collected body, `RouterError::Timeout` when the deadline passes, or
/// `RouterError::PayloadTooLarge` when the body exceeds `max_bytes`.
pub async fn read_request_body_with_timeout<B>(
    req: Request<B>,
    timeout_ms: u64,
    max_bytes: usize,
) -> Result<Bytes, RouterError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let timeout_duration = time::Duration::from_millis(timeout_ms);
    let body = Limited::new(req.into_body(), max_bytes);
    let collected = time::timeout(timeout_duration, body.collect())
        .await
        .map_err(|_| RouterError::Timeout)?
        .map_err(|e| {
            if e.is::<LengthLimitError>() {
                RouterError::PayloadTooLarge(max_bytes)
            } else {
                RouterError::BadRequest(format!("Failed to read request body: {}", e))
            }
        })?;
    Ok(collected.to_bytes())
}

/// Helper to build HTTP response with proper error handling
pub fn build_response(
    status: u16,
    content_type: &str,
    body: impl Into<Bytes>,
) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .body(body.into())
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

/// Serializes `value` and wraps it in a JSON response.
pub fn json_response<T: Serialize>(status: u16, value: &T) -> Result<Response<Bytes>, RouterError> {
    let json = serde_json::to_vec(value)
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;
    build_response(status, "application/json", json)
}
