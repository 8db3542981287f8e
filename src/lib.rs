//! # docsage
//!
//! Upload a document, have a remote summarisation service digest it, and get
//! back a topic-wise summary plus a formatted PDF.
//!
//! This crate is the thin integration layer around that service: it decides
//! which files are acceptable, tracks the user's selection, performs one
//! round trip per submission, renders the returned sections, and runs the
//! proxy route that relays uploads and downloads to the upstream.
//!
//! ## Pipeline Overview
//!
//! ```text
//! files
//!  │
//!  ├─ 1. Validate  extension allow-list + 200 MiB ceiling   (validate)
//!  ├─ 2. Session   active set, errors, simulated progress   (session)
//!  ├─ 3. Submit    multipart {file, style} → /api/proxy     (client)
//!  ├─ 4. Proxy     /api/proxy → upstream /summarize/        (proxy)
//!  ├─ 5. Render    titled sections of points                (render)
//!  └─ 6. Download  /api/proxy?filename= → summary_<Style>.pdf
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docsage::{
//!     CandidateFile, ClientConfig, NotificationCenter, SummaryClient, UploadSession, Workspace,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::default();
//!     let client = SummaryClient::new(config.clone())?;
//!     let workspace = Workspace::new(client, NotificationCenter::default());
//!     let mut session = UploadSession::new(&config, None, Some(workspace.selection_observer()));
//!
//!     session.add([CandidateFile::from_path("report.pdf")?]);
//!     let result = workspace.submit().await?;
//!     println!("{}", docsage::render::render_text(&result.summary));
//!
//!     workspace.download("Elegant", std::path::Path::new(".")).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docsage` binary (clap, anyhow, indicatif, tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod input;
pub mod notify;
pub mod output;
pub mod progress;
pub mod proxy;
pub mod render;
pub mod session;
pub mod validate;
pub mod workspace;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::SummaryClient;
pub use config::{ClientConfig, ClientConfigBuilder, PdfStyle, ProxyConfig, ProxyConfigBuilder};
pub use error::{DocSageError, ValidationError};
pub use input::{CandidateFile, FileContent};
pub use notify::{NotificationCenter, Toast, ToastVariant};
pub use output::{SubmissionResult, SummarySection};
pub use progress::{
    NoopProgressCallback, NoopSelectionObserver, ProgressCallback, SelectionObserver,
    UploadProgressCallback,
};
pub use proxy::{proxy_router, ProxyServer};
pub use session::{EntryId, SessionSnapshot, UploadSession};
pub use validate::validate;
pub use workspace::Workspace;
