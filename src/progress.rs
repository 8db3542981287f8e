//! Observer traits for upload-session events.
//!
//! Inject an [`Arc<dyn UploadProgressCallback>`] into
//! [`crate::session::UploadSession::new`] to receive simulated progress ticks
//! as each accepted file climbs to 100 %, and an
//! [`Arc<dyn SelectionObserver>`] to learn which file is currently selected.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a terminal progress bar, a broadcast channel, or a test
//! counter without the library knowing how the host application communicates.
//! Both traits are `Send + Sync` because progress ticks arrive from spawned
//! Tokio tasks.
//!
//! # Example
//!
//! ```rust
//! use docsage::{EntryId, UploadProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     finished: Arc<AtomicUsize>,
//! }
//!
//! impl UploadProgressCallback for CountingCallback {
//!     fn on_complete(&self, _entry: EntryId, name: &str) {
//!         self.finished.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{name} ready");
//!     }
//! }
//! ```

use crate::input::CandidateFile;
use crate::session::EntryId;
use std::sync::Arc;

/// Called by the upload session as each entry's simulated progress advances.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Calls for different entries may interleave.
pub trait UploadProgressCallback: Send + Sync {
    /// Called when an accepted file enters the session, at 0 %.
    fn on_start(&self, entry: EntryId, name: &str, size_bytes: u64) {
        let _ = (entry, name, size_bytes);
    }

    /// Called after every tick with the new percentage (1–100).
    fn on_progress(&self, entry: EntryId, name: &str, percent: u8) {
        let _ = (entry, name, percent);
    }

    /// Called once when an entry reaches 100 %.
    fn on_complete(&self, entry: EntryId, name: &str) {
        let _ = (entry, name);
    }

    /// Called when a file is rejected by validation.
    fn on_rejected(&self, name: &str, message: &str) {
        let _ = (name, message);
    }

    /// Called when an entry is removed, cancelling any in-flight simulation.
    fn on_removed(&self, entry: EntryId, name: &str) {
        let _ = (entry, name);
    }
}

/// Receives the current file after every mutation of the active set.
///
/// The session may hold several entries, but consumers only track a single
/// current file: the first entry, or `None` when the set is empty.
pub trait SelectionObserver: Send + Sync {
    fn on_selection_change(&self, current: Option<&CandidateFile>);
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl UploadProgressCallback for NoopProgressCallback {}

/// A selection observer that ignores every change.
pub struct NoopSelectionObserver;

impl SelectionObserver for NoopSelectionObserver {
    fn on_selection_change(&self, _current: Option<&CandidateFile>) {}
}

/// Convenience alias matching the type stored in the upload session.
pub type ProgressCallback = Arc<dyn UploadProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct TrackingCallback {
        ticks: AtomicUsize,
        completes: AtomicUsize,
        rejects: AtomicUsize,
    }

    impl UploadProgressCallback for TrackingCallback {
        fn on_progress(&self, _entry: EntryId, _name: &str, _percent: u8) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
        }

        fn on_complete(&self, _entry: EntryId, _name: &str) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_rejected(&self, _name: &str, _message: &str) {
            self.rejects.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_start(EntryId(1), "a.pdf", 10);
        cb.on_progress(EntryId(1), "a.pdf", 50);
        cb.on_complete(EntryId(1), "a.pdf");
        cb.on_rejected("b.exe", "nope");
        cb.on_removed(EntryId(1), "a.pdf");
        NoopSelectionObserver.on_selection_change(None);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            ticks: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            rejects: AtomicUsize::new(0),
        };
        tracker.on_progress(EntryId(1), "a.pdf", 10);
        tracker.on_progress(EntryId(1), "a.pdf", 20);
        tracker.on_complete(EntryId(1), "a.pdf");
        tracker.on_rejected("x.exe", "Unsupported file type");

        assert_eq!(tracker.ticks.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.rejects.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn selection_observer_sees_current_name() {
        struct Last(Mutex<Option<String>>);
        impl SelectionObserver for Last {
            fn on_selection_change(&self, current: Option<&CandidateFile>) {
                *self.0.lock().unwrap() = current.map(|f| f.name().to_string());
            }
        }

        let last = Arc::new(Last(Mutex::new(None)));
        let obs: Arc<dyn SelectionObserver> = last.clone();
        let file = CandidateFile::from_bytes("a.md", vec![]);
        obs.on_selection_change(Some(&file));
        assert_eq!(last.0.lock().unwrap().as_deref(), Some("a.md"));
        obs.on_selection_change(None);
        assert_eq!(*last.0.lock().unwrap(), None);
    }
}
