//! Embedded browser client.

use hyper::body::Bytes;
use hyper::Response;

use super::request_utils::build_response;
use crate::router::RouterError;

const INDEX_HTML: &str = include_str!("../../assets/index.html");
const APP_JS: &str = include_str!("../../assets/app.js");
const STYLE_CSS: &str = include_str!("../../assets/style.css");

/// Static files compiled into the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset {
    Index,
    Script,
    Style,
}

impl Asset {
    fn content(self) -> (&'static str, &'static str) {
        match self {
            Asset::Index => ("text/html; charset=utf-8", INDEX_HTML),
            Asset::Script => ("application/javascript; charset=utf-8", APP_JS),
            Asset::Style => ("text/css; charset=utf-8", STYLE_CSS),
        }
    }
}

/// Serves an embedded asset.
pub fn serve_asset(asset: Asset) -> Result<Response<Bytes>, RouterError> {
    let (content_type, body) = asset.content();
    build_response(200, content_type, Bytes::from_static(body.as_bytes()))
}
