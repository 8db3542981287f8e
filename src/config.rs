//! Configuration types for the client and the proxy.
//!
//! Client behaviour is controlled through [`ClientConfig`], proxy behaviour
//! through [`ProxyConfig`]. Both are built with a builder so callers set only
//! what they care about and rely on documented defaults for the rest.

use crate::error::DocSageError;
use crate::validate::MAX_UPLOAD_BYTES;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default address of the local proxy the client talks to.
pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:3000";

/// Default upstream summarisation service the proxy forwards to.
pub const DEFAULT_UPSTREAM_URL: &str = "http://localhost:8000";

/// Default bind address of the proxy server.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Configuration for the submission pipeline, download trigger, and upload session.
///
/// # Example
/// ```rust
/// use docsage::{ClientConfig, PdfStyle};
///
/// let config = ClientConfig::builder()
///     .proxy_url("http://127.0.0.1:4000")
///     .style(PdfStyle::Academic)
///     .build()
///     .unwrap();
/// assert_eq!(config.style, PdfStyle::Academic);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the proxy (no trailing `/api/proxy`). Default: [`DEFAULT_PROXY_URL`].
    pub proxy_url: String,

    /// Style sent in the `style` form field at submission time. Default: Elegant.
    ///
    /// The style only affects the PDF the upstream renders; the summary
    /// sections are the same for every style.
    pub style: PdfStyle,

    /// Percentage added on each simulated-progress tick. Range 1–100. Default: 10.
    pub progress_step: u8,

    /// Interval between simulated-progress ticks in milliseconds. Default: 200.
    pub progress_interval_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            style: PdfStyle::Elegant,
            progress_step: 10,
            progress_interval_ms: 200,
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full URL of the proxy route.
    pub fn proxy_endpoint(&self) -> String {
        format!("{}/api/proxy", self.proxy_url.trim_end_matches('/'))
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn proxy_url(mut self, url: impl Into<String>) -> Self {
        self.config.proxy_url = url.into();
        self
    }

    pub fn style(mut self, style: PdfStyle) -> Self {
        self.config.style = style;
        self
    }

    pub fn progress_step(mut self, step: u8) -> Self {
        self.config.progress_step = step;
        self
    }

    pub fn progress_interval_ms(mut self, ms: u64) -> Self {
        self.config.progress_interval_ms = ms;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, DocSageError> {
        let c = &self.config;
        validate_url("proxy URL", &c.proxy_url)?;
        if c.progress_step == 0 || c.progress_step > 100 {
            return Err(DocSageError::InvalidConfig(format!(
                "Progress step must be 1–100, got {}",
                c.progress_step
            )));
        }
        if c.progress_interval_ms == 0 {
            return Err(DocSageError::InvalidConfig(
                "Progress interval must be ≥ 1ms".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Configuration for the proxy server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Socket address to listen on. Default: [`DEFAULT_BIND_ADDR`].
    pub bind_addr: String,

    /// Base URL of the upstream service. Default: [`DEFAULT_UPSTREAM_URL`].
    pub upstream_url: String,

    /// Maximum accepted request body in bytes. Default: 210 MiB.
    ///
    /// Slightly above the 200 MiB upload ceiling so a maximum-size file plus
    /// its multipart framing still fits.
    pub max_body_bytes: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            max_body_bytes: (MAX_UPLOAD_BYTES + 10 * 1024 * 1024) as usize,
        }
    }
}

impl ProxyConfig {
    /// Create a new builder for `ProxyConfig`.
    pub fn builder() -> ProxyConfigBuilder {
        ProxyConfigBuilder {
            config: Self::default(),
        }
    }

    /// Upstream summarisation endpoint.
    pub fn summarize_url(&self) -> String {
        format!("{}/summarize/", self.upstream_url.trim_end_matches('/'))
    }

    /// Upstream download endpoint for one file.
    pub fn download_url(&self, filename: &str) -> String {
        format!(
            "{}/download/{}",
            self.upstream_url.trim_end_matches('/'),
            filename
        )
    }
}

/// Builder for [`ProxyConfig`].
#[derive(Debug)]
pub struct ProxyConfigBuilder {
    config: ProxyConfig,
}

impl ProxyConfigBuilder {
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_addr = addr.into();
        self
    }

    pub fn upstream_url(mut self, url: impl Into<String>) -> Self {
        self.config.upstream_url = url.into();
        self
    }

    pub fn max_body_bytes(mut self, n: usize) -> Self {
        self.config.max_body_bytes = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ProxyConfig, DocSageError> {
        let c = &self.config;
        validate_url("upstream URL", &c.upstream_url)?;
        if c.bind_addr.trim().is_empty() {
            return Err(DocSageError::InvalidConfig("Bind address is empty".into()));
        }
        if c.max_body_bytes == 0 {
            return Err(DocSageError::InvalidConfig(
                "Max body size must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}

fn validate_url(what: &str, url: &str) -> Result<(), DocSageError> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(DocSageError::InvalidConfig(format!(
            "{what} must start with http:// or https://, got '{url}'"
        )));
    }
    Ok(())
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Presentation style the upstream applies when it renders the summary PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfStyle {
    /// Plain sans-serif body text.
    #[default]
    Minimal,
    /// Bold, muted grey.
    Aesthetic,
    /// Italic serif in deep blue.
    Elegant,
    /// Monospace with a centred title and wider margins.
    Academic,
}

impl PdfStyle {
    /// Form-field value sent to the upstream.
    pub fn as_str(&self) -> &'static str {
        match self {
            PdfStyle::Minimal => "minimal",
            PdfStyle::Aesthetic => "aesthetic",
            PdfStyle::Elegant => "elegant",
            PdfStyle::Academic => "academic",
        }
    }

    /// Capitalised label used for download file names, e.g. `summary_Academic.pdf`.
    pub fn label(&self) -> &'static str {
        match self {
            PdfStyle::Minimal => "Minimal",
            PdfStyle::Aesthetic => "Aesthetic",
            PdfStyle::Elegant => "Elegant",
            PdfStyle::Academic => "Academic",
        }
    }
}

impl fmt::Display for PdfStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PdfStyle {
    type Err = DocSageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(PdfStyle::Minimal),
            "aesthetic" => Ok(PdfStyle::Aesthetic),
            "elegant" => Ok(PdfStyle::Elegant),
            "academic" => Ok(PdfStyle::Academic),
            other => Err(DocSageError::InvalidConfig(format!(
                "Unknown style '{other}' (expected minimal, aesthetic, elegant, academic)"
            ))),
        }
    }
}
