//! Workspace: the single-file container around the upload session.
//!
//! The upload session may hold several entries, but summarisation is a
//! single-file contract. The workspace keeps one optional current-file slot
//! (fed by the session's [`SelectionObserver`]), the last
//! [`SubmissionResult`], and an `is_processing` guard that rejects a second
//! submission while one is in flight. Every outcome is published to the
//! [`NotificationCenter`].

use crate::client::SummaryClient;
use crate::error::DocSageError;
use crate::input::CandidateFile;
use crate::notify::{NotificationCenter, ToastVariant};
use crate::output::SubmissionResult;
use crate::progress::SelectionObserver;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct WorkspaceState {
    current: Option<CandidateFile>,
    result: Option<SubmissionResult>,
}

/// Page-level controller: current file, processing flag, last result.
#[derive(Clone)]
pub struct Workspace {
    client: SummaryClient,
    notifications: NotificationCenter,
    state: Arc<Mutex<WorkspaceState>>,
    processing: Arc<AtomicBool>,
}

/// Observer handed to the upload session; updates the workspace's current file.
struct CurrentFileSlot {
    state: Arc<Mutex<WorkspaceState>>,
}

impl SelectionObserver for CurrentFileSlot {
    fn on_selection_change(&self, current: Option<&CandidateFile>) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        debug!("Current file is now {:?}", current.map(CandidateFile::name));
        // Any change to the selection invalidates the previous summary.
        state.result = None;
        state.current = current.cloned();
    }
}

/// Clears the processing flag when a submission ends, however it ends.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Workspace {
    pub fn new(client: SummaryClient, notifications: NotificationCenter) -> Self {
        Self {
            client,
            notifications,
            state: Arc::new(Mutex::new(WorkspaceState::default())),
            processing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Observer to pass to [`crate::session::UploadSession::new`].
    pub fn selection_observer(&self) -> Arc<dyn SelectionObserver> {
        Arc::new(CurrentFileSlot {
            state: Arc::clone(&self.state),
        })
    }

    /// Replace the current file directly, clearing any previous result.
    pub fn set_file(&self, file: Option<CandidateFile>) {
        let mut state = self.lock();
        state.current = file;
        state.result = None;
    }

    pub fn current_file(&self) -> Option<CandidateFile> {
        self.lock().current.clone()
    }

    pub fn result(&self) -> Option<SubmissionResult> {
        self.lock().result.clone()
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn client(&self) -> &SummaryClient {
        &self.client
    }

    /// Summarise the current file.
    ///
    /// # Errors
    /// - [`DocSageError::NoFileSelected`]: nothing to submit.
    /// - [`DocSageError::Busy`]: a submission is already running; this call
    ///   is rejected, not queued.
    /// - Any pipeline error, after a destructive toast has been published.
    pub async fn submit(&self) -> Result<SubmissionResult, DocSageError> {
        let file = self.current_file().ok_or(DocSageError::NoFileSelected)?;

        if self
            .processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(DocSageError::Busy);
        }
        let _guard = ProcessingGuard(&self.processing);

        match self.client.submit(&file).await {
            Ok(result) => {
                self.lock().result = Some(result.clone());
                self.notifications.publish(
                    "Document Processed",
                    "Your document has been successfully summarized!",
                    ToastVariant::Default,
                );
                Ok(result)
            }
            Err(e) => {
                self.notifications
                    .publish("Error", e.to_string(), ToastVariant::Destructive);
                Err(e)
            }
        }
    }

    /// Download the PDF of the last result under `summary_<style_label>.pdf`.
    pub async fn download(
        &self,
        style_label: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, DocSageError> {
        let reference = self
            .lock()
            .result
            .as_ref()
            .map(|r| r.pdf_reference.clone())
            .ok_or(DocSageError::NoSummary)?;

        match self.client.download(&reference, style_label, dest_dir).await {
            Ok(path) => {
                self.notifications.publish(
                    "Download Started",
                    format!("Your {style_label} PDF is being downloaded."),
                    ToastVariant::Default,
                );
                Ok(path)
            }
            Err(e) => {
                self.notifications.publish(
                    "Download Error",
                    "Failed to download the PDF summary.",
                    ToastVariant::Destructive,
                );
                Err(e)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, WorkspaceState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
