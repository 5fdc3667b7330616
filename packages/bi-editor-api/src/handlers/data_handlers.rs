//! Snapshot, update, and health handlers.

use hyper::body::{Body, Bytes};
use hyper::{Request, Response};

use bi_editor_core::{ChangeSet, DataPayload};

use super::request_utils::{build_response, json_response, read_request_body_with_timeout};
use super::response::UpdateResponse;
use crate::router::{AppState, RouterError};

/// Returns the current snapshot of the configured table.
///
/// # Endpoint
/// `GET /data`
///
/// # Response
/// - **200 OK**
/// ```json
/// {
///   "table": "items",
///   "limit": 200,
///   "pk": ["id"],
///   "columns": ["id", "name", "bi_price"],
///   "biCols": ["bi_price"],
///   "rows": [{"id": 1, "name": "a", "bi_price": 10}]
/// }
/// ```
///
/// # Errors
/// - **500 Internal Server Error**: query or connectivity failure
pub async fn get_data(state: AppState) -> Result<Response<Bytes>, RouterError> {
    let snapshot = state.store.fetch_snapshot(&state.config).await?;
    tracing::debug!(rows = snapshot.rows.len(), "snapshot served");
    json_response(200, &DataPayload::from(snapshot))
}

/// Applies a change-set to the configured table.
///
/// # Endpoint
/// `POST /update`
///
/// # Request Body
/// ```json
/// {
///   "changes": [
///     {"pk": {"material_codigo": "X", "centro": "Y"}, "set": {"bi_x": "nuevo", "bi_y": 123}}
///   ]
/// }
/// ```
///
/// # Response
/// - **200 OK**: `{"updatedRows": 1}`
///
/// # Errors
/// - **400 Bad Request**: malformed body, non-BI or PK column in `set`,
///   missing PK column in `pk`. Nothing is written.
/// - **413 Payload Too Large**: body above the configured limit
/// - **500 Internal Server Error**: storage failure; the batch is rolled back
///
/// # Example
/// ```bash
/// curl -X POST http://localhost:3000/update \
///   -H "Content-Type: application/json" \
///   -d '{"changes": [{"pk": {"id": 1}, "set": {"bi_price": 20}}]}'
/// ```
pub async fn post_update<B>(req: Request<B>, state: AppState) -> Result<Response<Bytes>, RouterError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let body = read_request_body_with_timeout(
        req,
        state.config.request_timeout_ms,
        state.config.max_body_bytes,
    )
    .await?;

    let change_set = ChangeSet::parse(&body, &state.config.pk_cols)?;

    let updated_rows = state
        .store
        .apply_changes(&state.config.table, &state.config.pk_cols, &change_set.changes)
        .await?;

    tracing::info!(
        changes = change_set.changes.len(),
        updated_rows,
        "change-set applied"
    );
    json_response(200, &UpdateResponse { updated_rows })
}

/// Liveness check.
///
/// # Endpoint
/// `GET /health` → `200 ok`
pub fn health() -> Result<Response<Bytes>, RouterError> {
    build_response(200, "text/plain; charset=utf-8", Bytes::from_static(b"ok"))
}
