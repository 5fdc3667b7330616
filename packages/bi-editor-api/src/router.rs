//! Matchit routing configuration.

use std::sync::Arc;

use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use matchit::Router as MatchitRouter;

use crate::handlers::{self, Asset};
use bi_editor_core::{EditorConfig, EditorError};
use bi_editor_store::TableStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Table store
    pub store: Arc<dyn TableStore>,
    /// Editor configuration, fixed at startup
    pub config: Arc<EditorConfig>,
}

/// HTTP request router.
pub struct Router {
    inner: MatchitRouter<RouteHandler>,
    state: AppState,
}

impl Router {
    /// Creates a router with every editor route registered.
    ///
    /// # Arguments
    /// * `store` - Table store backing `/data` and `/update`
    /// * `config` - Editor configuration shared by every request
    pub fn new(store: Arc<dyn TableStore>, config: Arc<EditorConfig>) -> Self {
        let routes = [
            ("/data", RouteHandler::Data),
            ("/api/data", RouteHandler::Data),
            ("/update", RouteHandler::Update),
            ("/api/update", RouteHandler::Update),
            ("/health", RouteHandler::Health),
            ("/", RouteHandler::Asset(Asset::Index)),
            ("/index.html", RouteHandler::Asset(Asset::Index)),
            ("/app.js", RouteHandler::Asset(Asset::Script)),
            ("/style.css", RouteHandler::Asset(Asset::Style)),
        ];

        let mut router = MatchitRouter::new();
        for (path, handler) in routes {
            if let Err(e) = router.insert(path, handler) {
                // Static route table, so a conflict is a programming error.
                panic!("Failed to insert {} route: {}", path, e);
            }
        }

        Self {
            inner: router,
            state: AppState { store, config },
        }
    }

    /// Routes a request and always produces a response.
    ///
    /// Handler errors are turned into JSON `{error}` bodies with the
    /// matching status code.
    ///
    /// # Returns
    /// The handler response, or a JSON error response.
    pub async fn route<B>(&self, req: Request<B>) -> Response<Bytes>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let result = match self.inner.at(&path) {
            Ok(matched) => matched.value.handle(req, self.state.clone()).await,
            Err(_) => Err(RouterError::NotFound(format!("No route found for {}", path))),
        };

        match result {
            Ok(response) => {
                tracing::debug!(%method, %path, status = response.status().as_u16(), "request handled");
                response
            }
            Err(err) => {
                match &err {
                    RouterError::InternalError(msg) => {
                        tracing::error!(%method, %path, error = %msg, "request failed")
                    }
                    other => tracing::warn!(%method, %path, error = %other, "request rejected"),
                }
                err.into()
            }
        }
    }
}

/// Route handler function.
#[derive(Clone, Copy)]
enum RouteHandler {
    Data,
    Update,
    Health,
    Asset(Asset),
}

impl RouteHandler {
    async fn handle<B>(&self, req: Request<B>, state: AppState) -> Result<Response<Bytes>, RouterError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        match (self, req.method()) {
            (RouteHandler::Data, &Method::GET) => handlers::get_data(state).await,
            (RouteHandler::Update, &Method::POST) => handlers::post_update(req, state).await,
            (RouteHandler::Health, &Method::GET) => handlers::health(),
            (RouteHandler::Asset(asset), &Method::GET) => handlers::serve_asset(*asset),
            _ => Err(RouterError::MethodNotAllowed),
        }
    }
}

/// Router error type.
#[derive(Debug)]
pub enum RouterError {
    MethodNotAllowed,
    InternalError(String),
    Timeout,
    BadRequest(String),
    NotFound(String),
    PayloadTooLarge(usize),
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            RouterError::InternalError(msg) => write!(f, "{}", msg),
            RouterError::Timeout => write!(f, "Request Timeout"),
            RouterError::BadRequest(msg) => write!(f, "{}", msg),
            RouterError::NotFound(msg) => write!(f, "{}", msg),
            RouterError::PayloadTooLarge(limit) => {
                write!(f, "Request body exceeds {} bytes", limit)
            }
        }
    }
}

impl std::error::Error for RouterError {}

impl RouterError {
    /// HTTP status for this error.
    pub fn status(&self) -> u16 {
        match self {
            RouterError::MethodNotAllowed => 405,
            RouterError::InternalError(_) => 500,
            RouterError::Timeout => 408,
            RouterError::BadRequest(_) => 400,
            RouterError::NotFound(_) => 404,
            RouterError::PayloadTooLarge(_) => 413,
        }
    }
}

impl From<EditorError> for RouterError {
    fn from(err: EditorError) -> Self {
        if err.is_client_error() {
            RouterError::BadRequest(err.to_string())
        } else {
            RouterError::InternalError(err.to_string())
        }
    }
}

impl From<RouterError> for Response<Bytes> {
    fn from(err: RouterError) -> Self {
        let status = err.status();
        let error_response = handlers::error_response(err.to_string());
        let body = serde_json::to_vec(&error_response)
            .unwrap_or_else(|_| b"{\"error\":\"Internal Server Error\"}".to_vec());

        Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Bytes::from(body))
            .unwrap_or_else(|_| {
                let mut fallback = Response::new(Bytes::from_static(b"Internal Server Error"));
                *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_error_mapping() {
        let cases = [
            (EditorError::InvalidIdentifier("a b".to_string()), 400),
            (EditorError::validation("Missing PK id in pk"), 400),
            (EditorError::storage("connection refused"), 500),
            (EditorError::Config("bad".to_string()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(RouterError::from(err).status(), status);
        }
    }

    #[test]
    fn test_error_response_body() {
        let response: Response<Bytes> =
            RouterError::BadRequest("Missing PK id in pk".to_string()).into();
        assert_eq!(response.status(), 400);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Missing PK id in pk"}));
    }
}
