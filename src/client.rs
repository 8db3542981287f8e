//! Submission pipeline and download trigger.
//!
//! Both talk only to the local proxy, never to the upstream directly, and
//! both make exactly one HTTP call per invocation: no retry, no backoff, no
//! timeout beyond what the transport itself imposes. A failed call is
//! reported to the caller, who decides whether to try again.

use crate::config::ClientConfig;
use crate::error::{DocSageError, SUMMARIZE_FAILED};
use crate::input::CandidateFile;
use crate::output::{error_field, SubmissionResult, SummarizeResponse};
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Fallback message when the proxy refuses a download without saying why.
pub const DOWNLOAD_SUMMARY_FAILED: &str = "Failed to download the PDF summary.";

/// HTTP client for the `/api/proxy` route.
#[derive(Debug, Clone)]
pub struct SummaryClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl SummaryClient {
    /// Create a client with a fresh connection pool.
    pub fn new(config: ClientConfig) -> Result<Self, DocSageError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| DocSageError::Internal(format!("HTTP client init failed: {e}")))?;
        Ok(Self { http, config })
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, config: ClientConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Upload one file and return its summary.
    ///
    /// The multipart body carries the file under `file` and the configured
    /// style under `style`.
    ///
    /// # Errors
    /// - [`DocSageError::Remote`]: the proxy answered with a non-2xx status;
    ///   the message is the body's `error` field, or a generic fallback.
    /// - [`DocSageError::Network`]: the proxy could not be reached, or a 2xx
    ///   body was not the expected JSON.
    /// - [`DocSageError::FileRead`]: the file's bytes could not be loaded.
    pub async fn submit(&self, file: &CandidateFile) -> Result<SubmissionResult, DocSageError> {
        let url = self.config.proxy_endpoint();
        info!("Submitting '{}' ({}) to {}", file.name(), file.display_size(), url);

        let bytes = file.read_bytes().await?;
        let mime = mime_guess::from_path(file.name()).first_or_octet_stream();
        let part = Part::bytes(bytes)
            .file_name(file.name().to_string())
            .mime_str(mime.essence_str())
            .map_err(DocSageError::network)?;
        let form = Form::new()
            .part("file", part)
            .text("style", self.config.style.as_str());

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(DocSageError::network)?;

        let status = response.status();
        let body = response.bytes().await.map_err(DocSageError::network)?;
        debug!("Proxy answered {} with {} bytes", status, body.len());

        if !status.is_success() {
            let message = serde_json::from_slice::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| error_field(&v));
            warn!("Submission of '{}' failed: HTTP {}", file.name(), status);
            return Err(DocSageError::remote(message, SUMMARIZE_FAILED));
        }

        let parsed: SummarizeResponse =
            serde_json::from_slice(&body).map_err(DocSageError::network)?;
        let result = SubmissionResult::from(parsed);
        info!(
            "Received {} summary sections for '{}'",
            result.summary.len(),
            file.name()
        );
        Ok(result)
    }

    /// Fetch the PDF behind `pdf_reference` and save it as
    /// `dest_dir/summary_<style_label>.pdf`.
    ///
    /// Only the last path segment of the reference is sent to the proxy.
    pub async fn download(
        &self,
        pdf_reference: &str,
        style_label: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, DocSageError> {
        let filename = short_name(pdf_reference);
        let url = self.config.proxy_endpoint();
        info!("Downloading '{}' as {} PDF", filename, style_label);

        let response = self
            .http
            .get(&url)
            .query(&[("filename", filename)])
            .send()
            .await
            .map_err(DocSageError::network)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| error_field(&v));
            warn!("Download of '{}' failed: HTTP {}", filename, status);
            return Err(DocSageError::remote(message, DOWNLOAD_SUMMARY_FAILED));
        }

        let bytes = response.bytes().await.map_err(DocSageError::network)?;
        let target = dest_dir.join(saved_file_name(style_label));
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|source| DocSageError::OutputWriteFailed {
                path: target.clone(),
                source,
            })?;

        info!("Saved {} bytes to {}", bytes.len(), target.display());
        Ok(target)
    }
}

/// Text after the last `/` of a PDF reference.
pub fn short_name(pdf_reference: &str) -> &str {
    pdf_reference
        .rsplit_once('/')
        .map(|(_, name)| name)
        .unwrap_or(pdf_reference)
}

/// File name the downloaded PDF is saved under.
pub fn saved_file_name(style_label: &str) -> String {
    format!("summary_{style_label}.pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_takes_last_segment() {
        assert_eq!(short_name("/tmp/abc/summary_foo.pdf"), "summary_foo.pdf");
        assert_eq!(
            short_name("/api/download/summary_1a2b_elegant.pdf"),
            "summary_1a2b_elegant.pdf"
        );
        assert_eq!(short_name("plain.pdf"), "plain.pdf");
        assert_eq!(short_name("dir/"), "");
    }

    #[test]
    fn saved_name_uses_style_label() {
        assert_eq!(saved_file_name("Academic"), "summary_Academic.pdf");
    }

    #[tokio::test]
    async fn unreachable_proxy_is_network_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = ClientConfig::builder()
            .proxy_url(format!("http://127.0.0.1:{port}"))
            .build()
            .unwrap();
        let client = SummaryClient::new(config).unwrap();
        let file = CandidateFile::from_bytes("a.txt", b"hi".to_vec());

        let err = client.submit(&file).await.unwrap_err();
        assert!(matches!(err, DocSageError::Network { .. }), "got {err:?}");
    }
}
