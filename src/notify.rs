//! Notification center: a bounded, self-expiring log of user-visible events.
//!
//! Toasts are published by the workspace when a submission or download
//! finishes and read by whatever presents them (the CLI prints them as they
//! arrive). The queue is FIFO with a fixed capacity, oldest evicted first,
//! and every toast carries its own expiry instant.
//!
//! Consumers either poll [`NotificationCenter::active`] or subscribe to a
//! broadcast of newly published toasts.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

/// Default number of toasts kept at once.
pub const DEFAULT_CAPACITY: usize = 5;

/// Default lifetime of a toast.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

/// Visual intent of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

/// A single user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    /// Creation timestamp in milliseconds since the Unix epoch, bumped when
    /// needed so ids are strictly increasing.
    pub id: u64,
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
    #[serde(skip)]
    pub expires_at: Instant,
}

impl Toast {
    pub fn is_destructive(&self) -> bool {
        self.variant == ToastVariant::Destructive
    }
}

struct Inner {
    queue: VecDeque<Toast>,
    last_id: u64,
}

/// Cloneable handle to a shared notification queue.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Mutex<Inner>>,
    tx: broadcast::Sender<Toast>,
    capacity: usize,
    ttl: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .field("queued", &self.lock().queue.len())
            .finish()
    }
}

impl NotificationCenter {
    /// Create a center keeping at most `capacity` toasts (min 1), each for `ttl`.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let (tx, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                queue: VecDeque::new(),
                last_id: 0,
            })),
            tx,
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Publish a toast and return its id.
    pub fn publish(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        variant: ToastVariant,
    ) -> u64 {
        let now = Instant::now();
        let toast = {
            let mut inner = self.lock();
            let id = epoch_millis().max(inner.last_id + 1);
            inner.last_id = id;

            let toast = Toast {
                id,
                title: title.into(),
                description: description.into(),
                variant,
                expires_at: now + self.ttl,
            };

            inner.queue.retain(|t| t.expires_at > now);
            inner.queue.push_back(toast.clone());
            while inner.queue.len() > self.capacity {
                inner.queue.pop_front();
            }
            toast
        };

        match toast.variant {
            ToastVariant::Destructive => warn!("{}: {}", toast.title, toast.description),
            ToastVariant::Default => info!("{}: {}", toast.title, toast.description),
        }

        // No subscribers is fine.
        let _ = self.tx.send(toast.clone());
        toast.id
    }

    /// Non-expired toasts, oldest first.
    pub fn active(&self) -> Vec<Toast> {
        let now = Instant::now();
        let mut inner = self.lock();
        inner.queue.retain(|t| t.expires_at > now);
        inner.queue.iter().cloned().collect()
    }

    /// Drop one toast early. Returns whether it was present.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut inner = self.lock();
        let before = inner.queue.len();
        inner.queue.retain(|t| t.id != id);
        inner.queue.len() != before
    }

    pub fn clear(&self) {
        self.lock().queue.clear();
    }

    /// Receive every toast published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.tx.subscribe()
    }

    /// Stream of toasts published from now on; lagged messages are skipped.
    pub fn subscribe_stream(&self) -> impl Stream<Item = Toast> + Send + 'static {
        BroadcastStream::new(self.tx.subscribe()).filter_map(|r| r.ok())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
