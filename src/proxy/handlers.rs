//! Axum handlers for `/api/proxy` and `/api/health`.
//!
//! Each request performs exactly one upstream call and shares nothing
//! mutable with other requests.

use crate::config::ProxyConfig;
use crate::error::{DocSageError, DOWNLOAD_FAILED, SUMMARIZE_FAILED};
use crate::output::error_field;
use axum::body::{Body, Bytes};
use axum::extract::rejection::BytesRejection;
use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::TryStreamExt;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

static SAFE_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-][A-Za-z0-9._-]{0,254}$").unwrap());

/// Shared, immutable per-server state.
#[derive(Clone)]
pub struct ProxyState {
    pub(crate) http: reqwest::Client,
    pub(crate) config: Arc<ProxyConfig>,
}

impl ProxyState {
    pub fn new(config: ProxyConfig) -> Result<Self, DocSageError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| DocSageError::Internal(format!("HTTP client init failed: {e}")))?;
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Query string of `GET /api/proxy`.
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub filename: Option<String>,
}

/// `POST /api/proxy`: relay the multipart body to the upstream `/summarize/`.
///
/// The body and its `Content-Type` (boundary included) are forwarded
/// unchanged. On success the upstream bytes are returned as received; the
/// body is only parsed to confirm it is JSON and to read `error` on failure.
/// A body that cannot be buffered (over the size limit, aborted) is a 500
/// `{error}` like every other failure of this route.
pub async fn summarize(
    State(state): State<ProxyState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, DocSageError> {
    let body = body.map_err(|rejection| {
        warn!("Could not read upload body: {rejection}");
        DocSageError::RequestBody {
            message: rejection.body_text(),
        }
    })?;
    let url = state.config.summarize_url();
    info!("Forwarding {} byte upload to {}", body.len(), url);

    let mut request = state.http.post(&url).body(body);
    if let Some(content_type) = headers.get(CONTENT_TYPE) {
        request = request.header(CONTENT_TYPE, content_type.clone());
    }

    let response = request.send().await.map_err(|e| {
        warn!("Upstream unreachable: {e}");
        DocSageError::network(e)
    })?;

    let status = response.status();
    let bytes = response.bytes().await.map_err(DocSageError::network)?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
        warn!("Upstream returned non-JSON body (HTTP {status}): {e}");
        DocSageError::network(e)
    })?;

    if !status.is_success() {
        warn!("Upstream rejected summarisation: HTTP {status}");
        return Err(DocSageError::remote(error_field(&value), SUMMARIZE_FAILED));
    }

    debug!("Upstream summarisation succeeded");
    Ok((
        [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        bytes,
    )
        .into_response())
}

/// `GET /api/proxy?filename=`: stream a generated PDF back from the upstream.
pub async fn download(
    State(state): State<ProxyState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, DocSageError> {
    let filename = query
        .filename
        .filter(|f| !f.is_empty())
        .ok_or(DocSageError::MissingParameter { name: "filename" })?;
    check_filename(&filename)?;

    let url = state.config.download_url(&filename);
    info!("Fetching '{}' from upstream", filename);

    let response = state.http.get(&url).send().await.map_err(|e| {
        warn!("Upstream unreachable for '{filename}': {e}");
        DocSageError::Remote {
            message: DOWNLOAD_FAILED.to_string(),
        }
    })?;

    if !response.status().is_success() {
        warn!("Upstream download of '{}' failed: HTTP {}", filename, response.status());
        return Err(DocSageError::Remote {
            message: DOWNLOAD_FAILED.to_string(),
        });
    }

    let name = filename.clone();
    let stream = response
        .bytes_stream()
        .inspect_err(move |e| warn!("Upstream stream for '{name}' broke off: {e}"));

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|e| DocSageError::Internal(e.to_string()))?;

    Ok((
        [
            (CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

/// `GET /api/health`.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Restrict a download name to a safe character set before it is placed in
/// an upstream URL and a response header.
pub fn check_filename(filename: &str) -> Result<(), DocSageError> {
    if filename.contains("..") || !SAFE_FILENAME.is_match(filename) {
        warn!("Rejected download filename {:?}", filename);
        return Err(DocSageError::InvalidParameter {
            name: "filename",
            reason: "only letters, digits, '.', '_' and '-' are allowed".into(),
        });
    }
    Ok(())
}
