//! HTTP endpoint implementations.

mod data_handlers;
mod request_utils;
mod response;
mod static_handlers;

pub use data_handlers::{get_data, health, post_update};
pub use request_utils::{build_response, json_response, read_request_body_with_timeout};
pub use response::{error_response, ErrorResponse, UpdateResponse};
pub use static_handlers::{serve_asset, Asset};
