//! Error types for the docsage library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DocSageError`]: the current call failed (upstream rejected the
//!   document, the proxy is unreachable, a required parameter is missing).
//!   Returned as `Err(DocSageError)` from the client, workspace, and proxy.
//!
//! * [`ValidationError`]: a single candidate file was
//!   rejected before any network call. The upload session stores the message
//!   keyed by file name and carries on with the other files.
//!
//! Nothing here is fatal to a running process: every failure is reported to
//! the caller, who may retry by re-submitting or re-selecting files.

use crate::validate::{ALLOWED_EXTENSIONS, MAX_UPLOAD_MB};
use std::path::PathBuf;
use thiserror::Error;

/// Fallback message when the upstream rejects a summarisation without saying why.
pub const SUMMARIZE_FAILED: &str = "Failed to summarize document";

/// Fallback message when a download from the upstream fails.
pub const DOWNLOAD_FAILED: &str = "Failed to download file";

/// Fallback message for failures that carry no description of their own.
pub const UNKNOWN_ERROR: &str = "An unknown error occurred";

/// All call-level errors returned by the docsage library.
///
/// Per-file rejections use [`ValidationError`] and are recorded in the upload
/// session rather than propagated here, unless a caller validates a single
/// file explicitly.
#[derive(Debug, Error)]
pub enum DocSageError {
    // ── Client-local errors ───────────────────────────────────────────────
    /// The candidate file failed local validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A submission was requested with no current file selected.
    #[error("No file selected.\nAdd a document before summarising.")]
    NoFileSelected,

    /// A download was requested before any summary was produced.
    #[error("No summary available yet.\nSummarise a document before downloading.")]
    NoSummary,

    /// A submission is already in flight.
    #[error("A document is already being processed")]
    Busy,

    // ── Remote errors ─────────────────────────────────────────────────────
    /// The upstream (or the proxy on its behalf) explicitly reported failure.
    #[error("{message}")]
    Remote { message: String },

    /// The proxy or upstream could not be reached, or replied with a body
    /// that could not be read.
    #[error("{message}")]
    Network { message: String },

    // ── Proxy request errors ──────────────────────────────────────────────
    /// A required query parameter was absent.
    #[error("{}", missing_parameter_message(.name))]
    MissingParameter { name: &'static str },

    /// A query parameter was present but not acceptable.
    #[error("Invalid {name}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The incoming request body could not be buffered.
    #[error("{message}")]
    RequestBody { message: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read the candidate file from disk.
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write the downloaded PDF.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The proxy server could not bind its listening socket.
    #[error("Failed to bind proxy server to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn missing_parameter_message(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("{}{} is required", first.to_uppercase(), chars.as_str()),
        None => "Parameter is required".to_string(),
    }
}

impl DocSageError {
    /// Build a [`DocSageError::Network`] from any displayable transport error,
    /// falling back to [`UNKNOWN_ERROR`] when the message is empty.
    pub fn network(err: impl std::fmt::Display) -> Self {
        let message = err.to_string();
        DocSageError::Network {
            message: if message.trim().is_empty() {
                UNKNOWN_ERROR.to_string()
            } else {
                message
            },
        }
    }

    /// Build a [`DocSageError::Remote`] from an optional upstream message.
    pub fn remote(message: Option<String>, fallback: &str) -> Self {
        DocSageError::Remote {
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

/// A non-fatal rejection of a single candidate file.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum ValidationError {
    /// Extension is not in the allow-list.
    #[error("{}", unsupported_type_message())]
    UnsupportedType { name: String },

    /// File exceeds the upload ceiling.
    #[error("File size should be less than {}MB", MAX_UPLOAD_MB)]
    TooLarge { name: String, size_bytes: u64 },
}

fn unsupported_type_message() -> String {
    let list: Vec<String> = ALLOWED_EXTENSIONS.iter().map(|e| format!(".{e}")).collect();
    format!(
        "Unsupported file type. Please upload {} files only",
        list.join(", ")
    )
}

impl ValidationError {
    /// Name of the rejected file.
    pub fn file_name(&self) -> &str {
        match self {
            ValidationError::UnsupportedType { name } => name,
            ValidationError::TooLarge { name, .. } => name,
        }
    }
}
