//! Proxy boundary: the only server-resident piece.
//!
//! Returns a composable `Router` exposing:
//!
//! | Route | Method | Success | Failure |
//! |---|---|---|---|
//! | `/api/proxy` | POST | 200, upstream JSON verbatim | 500 `{error}` |
//! | `/api/proxy` | GET `?filename=` | 200, PDF stream as attachment | 400 bad filename, 500 fetch failure |
//! | `/api/health` | GET | 200 `{status: "ok"}` | none |
//!
//! No authentication, rate limiting, or retry happens here.

pub mod handlers;
pub mod server;

use crate::config::ProxyConfig;
use crate::error::DocSageError;
use crate::output::ErrorBody;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

pub use handlers::ProxyState;
pub use server::{serve, ProxyServer};

/// Build the proxy router for `config`.
pub fn proxy_router(config: ProxyConfig) -> Result<Router, DocSageError> {
    Ok(build_router(ProxyState::new(config)?))
}

/// Build the router from pre-constructed state.
pub fn build_router(state: ProxyState) -> Router {
    let body_limit = state.config().max_body_bytes;
    Router::new()
        .route(
            "/api/proxy",
            get(handlers::download).post(handlers::summarize),
        )
        .route("/api/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

impl DocSageError {
    /// HTTP status the proxy answers with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            DocSageError::MissingParameter { .. } | DocSageError::InvalidParameter { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DocSageError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Proxy request failed: {self}");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
