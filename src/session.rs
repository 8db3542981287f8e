//! Upload session: the set of selected files, their validation errors, and
//! their simulated upload progress.
//!
//! ## Entries, not names
//!
//! The same file name may be added more than once; each addition is a
//! distinct [`EntryId`]. Validation errors are keyed by file name (a rejected
//! file never becomes an entry), while progress is keyed by entry so that two
//! same-named entries never share or resurrect each other's counters.
//!
//! ## Progress simulation
//!
//! Progress is cosmetic: it says nothing about actual transfer state. Each
//! accepted entry gets a spawned Tokio task that adds a fixed step on a fixed
//! interval until 100. The task's `JoinHandle` lives next to the entry and is
//! aborted before the entry is discarded, so removing a file always stops its
//! timer. Outside a Tokio runtime there is nothing to spawn on and progress
//! jumps straight to 100.

use crate::config::ClientConfig;
use crate::input::CandidateFile;
use crate::progress::{
    NoopProgressCallback, NoopSelectionObserver, ProgressCallback, SelectionObserver,
};
use crate::validate::validate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Identity of one appended occurrence of a file in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntryId(pub u64);

type ProgressMap = Arc<Mutex<HashMap<EntryId, u8>>>;

struct Slot {
    id: EntryId,
    file: CandidateFile,
    simulation: Option<JoinHandle<()>>,
}

impl Slot {
    fn cancel(&mut self) {
        if let Some(task) = self.simulation.take() {
            task.abort();
        }
    }
}

/// Comparable view of the whole session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// File names of the active set, in arrival order.
    pub entries: Vec<String>,
    pub errors: BTreeMap<String, String>,
    pub progress: BTreeMap<EntryId, u8>,
}

/// The selected-files widget state.
pub struct UploadSession {
    step: u8,
    interval: Duration,
    next_id: u64,
    slots: Vec<Slot>,
    errors: BTreeMap<String, String>,
    progress: ProgressMap,
    callback: ProgressCallback,
    observer: Arc<dyn SelectionObserver>,
}

impl UploadSession {
    /// Create an empty session using the progress timing from `config`.
    pub fn new(
        config: &ClientConfig,
        callback: Option<ProgressCallback>,
        observer: Option<Arc<dyn SelectionObserver>>,
    ) -> Self {
        Self {
            step: config.progress_step.clamp(1, 100),
            interval: Duration::from_millis(config.progress_interval_ms.max(1)),
            next_id: 1,
            slots: Vec::new(),
            errors: BTreeMap::new(),
            progress: Arc::new(Mutex::new(HashMap::new())),
            callback: callback.unwrap_or_else(|| Arc::new(NoopProgressCallback)),
            observer: observer.unwrap_or_else(|| Arc::new(NoopSelectionObserver)),
        }
    }

    /// Validate and append each candidate, in arrival order.
    ///
    /// Rejected files are recorded in the error map and skipped. Accepted
    /// files clear any earlier error for the same name, become a new entry
    /// (no de-duplication by name), and start their progress simulation.
    /// Returns the ids of the accepted entries.
    pub fn add(&mut self, files: impl IntoIterator<Item = CandidateFile>) -> Vec<EntryId> {
        let mut accepted = Vec::new();

        for file in files {
            if let Err(e) = validate(&file) {
                let message = e.to_string();
                info!("Rejected '{}': {}", file.name(), message);
                self.callback.on_rejected(file.name(), &message);
                self.errors.insert(file.name().to_string(), message);
                continue;
            }

            self.errors.remove(file.name());
            let id = EntryId(self.next_id);
            self.next_id += 1;

            let simulation = self.start_simulation(id, &file);
            debug!("Accepted '{}' as entry {}", file.name(), id.0);
            self.slots.push(Slot {
                id,
                file,
                simulation,
            });
            accepted.push(id);
        }

        self.notify_selection();
        accepted
    }

    /// Remove exactly one entry with its error and progress, cancelling its
    /// simulation. Returns the removed file, or `None` if the id is unknown.
    pub fn remove(&mut self, id: EntryId) -> Option<CandidateFile> {
        let pos = self.slots.iter().position(|s| s.id == id)?;
        let mut slot = self.slots.remove(pos);
        slot.cancel();

        self.errors.remove(slot.file.name());
        self.lock_progress().remove(&id);
        self.callback.on_removed(id, slot.file.name());
        debug!("Removed entry {} ('{}')", id.0, slot.file.name());

        self.notify_selection();
        Some(slot.file)
    }

    /// Clear the active set, every error, and every progress value.
    pub fn remove_all(&mut self) {
        for slot in &mut self.slots {
            slot.cancel();
            self.callback.on_removed(slot.id, slot.file.name());
        }
        self.slots.clear();
        self.errors.clear();
        self.lock_progress().clear();
        self.notify_selection();
    }

    /// The file consumers treat as "the" selection: the first entry.
    pub fn current(&self) -> Option<&CandidateFile> {
        self.slots.first().map(|s| &s.file)
    }

    /// Active entries in arrival order.
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &CandidateFile)> {
        self.slots.iter().map(|s| (s.id, &s.file))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Validation messages keyed by file name.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn error_for(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    /// Current simulated progress of one entry.
    pub fn progress(&self, id: EntryId) -> Option<u8> {
        self.lock_progress().get(&id).copied()
    }

    /// Progress of the most recently added entry with this name.
    pub fn progress_by_name(&self, name: &str) -> Option<u8> {
        let id = self.slots.iter().rev().find(|s| s.file.name() == name)?.id;
        self.progress(id)
    }

    /// Whether every entry has finished its simulated climb.
    pub fn all_complete(&self) -> bool {
        let progress = self.lock_progress();
        self.slots
            .iter()
            .all(|s| progress.get(&s.id).is_some_and(|p| *p >= 100))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            entries: self.slots.iter().map(|s| s.file.name().to_string()).collect(),
            errors: self.errors.clone(),
            progress: self.lock_progress().iter().map(|(k, v)| (*k, *v)).collect(),
        }
    }

    fn start_simulation(&self, id: EntryId, file: &CandidateFile) -> Option<JoinHandle<()>> {
        self.lock_progress().insert(id, 0);
        self.callback.on_start(id, file.name(), file.size_bytes());

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => Some(handle.spawn(simulate_progress(
                id,
                file.name().to_string(),
                Arc::clone(&self.progress),
                self.step,
                self.interval,
                Arc::clone(&self.callback),
            ))),
            Err(_) => {
                debug!("No Tokio runtime; marking entry {} complete", id.0);
                self.lock_progress().insert(id, 100);
                self.callback.on_progress(id, file.name(), 100);
                self.callback.on_complete(id, file.name());
                None
            }
        }
    }

    fn notify_selection(&self) {
        self.observer.on_selection_change(self.current());
    }

    fn lock_progress(&self) -> MutexGuard<'_, HashMap<EntryId, u8>> {
        self.progress.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for UploadSession {
    fn drop(&mut self) {
        for slot in &mut self.slots {
            slot.cancel();
        }
    }
}

impl std::fmt::Debug for UploadSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadSession")
            .field("step", &self.step)
            .field("interval", &self.interval)
            .field("entries", &self.slots.len())
            .field("errors", &self.errors)
            .finish()
    }
}

async fn simulate_progress(
    id: EntryId,
    name: String,
    progress: ProgressMap,
    step: u8,
    interval: Duration,
    callback: ProgressCallback,
) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let next = {
            let mut map = progress.lock().unwrap_or_else(|e| e.into_inner());
            let Some(current) = map.get_mut(&id) else {
                return;
            };
            *current = current.saturating_add(step).min(100);
            *current
        };

        callback.on_progress(id, &name, next);
        if next >= 100 {
            callback.on_complete(id, &name);
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::FileContent;
    use crate::progress::UploadProgressCallback;
    use crate::validate::MAX_UPLOAD_BYTES;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn session() -> UploadSession {
        UploadSession::new(&ClientConfig::default(), None, None)
    }

    fn file(name: &str) -> CandidateFile {
        CandidateFile::from_bytes(name, b"content".to_vec())
    }

    struct CurrentTracker {
        calls: AtomicUsize,
        last: Mutex<Option<String>>,
    }

    impl SelectionObserver for CurrentTracker {
        fn on_selection_change(&self, current: Option<&CandidateFile>) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = current.map(|f| f.name().to_string());
        }
    }

    #[derive(Default)]
    struct TickCounter {
        ticks: AtomicUsize,
        last: Mutex<Vec<u8>>,
    }

    impl UploadProgressCallback for TickCounter {
        fn on_progress(&self, _entry: EntryId, _name: &str, percent: u8) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
            self.last.lock().unwrap().push(percent);
        }
    }

    #[test]
    fn rejected_files_are_recorded_not_added() {
        let mut s = session();
        let ids = s.add([file("a.pdf"), file("b.exe")]);
        assert_eq!(ids.len(), 1);
        assert_eq!(s.len(), 1);
        assert!(s.error_for("b.exe").unwrap().contains("Unsupported file type"));
        assert!(s.error_for("a.pdf").is_none());
    }

    #[test]
    fn oversize_file_is_rejected() {
        let mut s = session();
        let big = CandidateFile::from_parts(
            "big.pdf",
            MAX_UPLOAD_BYTES + 1,
            FileContent::Memory(Arc::from([])),
        );
        assert!(s.add([big]).is_empty());
        assert_eq!(s.error_for("big.pdf"), Some("File size should be less than 200MB"));
    }

    #[test]
    fn duplicates_are_distinct_entries() {
        let mut s = session();
        let ids = s.add([file("a.md"), file("a.md")]);
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        s.remove(ids[0]);
        let remaining: Vec<EntryId> = s.entries().map(|(id, _)| id).collect();
        assert_eq!(remaining, vec![ids[1]]);
    }

    #[test]
    fn revalidation_clears_error_for_name() {
        let mut s = session();
        let big = CandidateFile::from_parts(
            "doc.pdf",
            MAX_UPLOAD_BYTES + 1,
            FileContent::Memory(Arc::from([])),
        );
        s.add([big]);
        assert!(s.error_for("doc.pdf").is_some());
        s.add([file("doc.pdf")]);
        assert!(s.error_for("doc.pdf").is_none());
    }

    #[test]
    fn arrival_order_is_kept() {
        let mut s = session();
        s.add([file("1.txt"), file("2.txt")]);
        s.add([file("3.txt")]);
        let names: Vec<&str> = s.entries().map(|(_, f)| f.name()).collect();
        assert_eq!(names, vec!["1.txt", "2.txt", "3.txt"]);
        assert_eq!(s.current().unwrap().name(), "1.txt");
    }

    #[test]
    fn without_runtime_progress_completes_immediately() {
        let mut s = session();
        let ids = s.add([file("a.txt")]);
        assert_eq!(s.progress(ids[0]), Some(100));
        assert!(s.all_complete());
    }

    #[test]
    fn add_then_remove_restores_state() {
        let mut s = session();
        s.add([file("keep.pdf"), file("bad.zip")]);
        let before = s.snapshot();

        let ids = s.add([file("temp.docx")]);
        s.remove(ids[0]);
        assert_eq!(s.snapshot(), before);
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut s = session();
        s.add([file("a.pdf")]);
        let before = s.snapshot();
        assert!(s.remove(EntryId(999)).is_none());
        assert_eq!(s.snapshot(), before);
    }

    #[test]
    fn remove_all_empties_everything() {
        let mut s = session();
        s.add([file("a.pdf"), file("b.exe"), file("c.md")]);
        s.remove_all();
        let snap = s.snapshot();
        assert!(snap.entries.is_empty());
        assert!(snap.errors.is_empty());
        assert!(snap.progress.is_empty());
        assert!(s.current().is_none());

        s.remove_all();
        assert!(s.is_empty());
    }

    #[test]
    fn observer_tracks_first_entry() {
        let tracker = Arc::new(CurrentTracker {
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        });
        let mut s = UploadSession::new(&ClientConfig::default(), None, Some(tracker.clone()));

        let ids = s.add([file("first.pdf"), file("second.pdf")]);
        assert_eq!(tracker.last.lock().unwrap().as_deref(), Some("first.pdf"));

        s.remove(ids[0]);
        assert_eq!(tracker.last.lock().unwrap().as_deref(), Some("second.pdf"));

        s.remove_all();
        assert_eq!(*tracker.last.lock().unwrap(), None);
        assert_eq!(tracker.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn progress_climbs_monotonically_to_100() {
        let counter = Arc::new(TickCounter::default());
        let mut s = UploadSession::new(&ClientConfig::default(), Some(counter.clone()), None);
        let ids = s.add([file("a.pdf")]);
        assert_eq!(s.progress(ids[0]), Some(0));

        tokio::time::sleep(Duration::from_millis(650)).await;
        let mid = s.progress(ids[0]).unwrap();
        assert!((20..=40).contains(&mid), "mid progress {mid}");

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(s.progress(ids[0]), Some(100));
        assert!(s.all_complete());

        let seen = counter.last.lock().unwrap().clone();
        assert_eq!(seen.len(), 10);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last(), Some(&100));
    }

    #[tokio::test(start_paused = true)]
    async fn removal_cancels_simulation() {
        let counter = Arc::new(TickCounter::default());
        let mut s = UploadSession::new(&ClientConfig::default(), Some(counter.clone()), None);
        let ids = s.add([file("a.pdf")]);

        tokio::time::sleep(Duration::from_millis(450)).await;
        s.remove(ids[0]);
        let ticks_at_removal = counter.ticks.load(Ordering::SeqCst);

        // Same name re-added: the new entry starts from zero.
        let again = s.add([file("a.pdf")]);
        assert_eq!(s.progress(again[0]), Some(0));

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(s.progress(ids[0]), None);
        assert_eq!(s.progress_by_name("a.pdf"), Some(100));
        assert_eq!(
            counter.ticks.load(Ordering::SeqCst) - ticks_at_removal,
            10,
            "only the new entry should have ticked"
        );
    }
}
