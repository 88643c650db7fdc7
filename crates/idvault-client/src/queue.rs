use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{LocalStore, RemoteApi, StorageError, SyncError};

pub const SYNC_QUEUE_KEY: &str = "sync_queue";
pub const DEFAULT_REPLAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    User,
    Document,
}

/// A write recorded while offline, waiting to be replayed against the server.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncQueueItem {
    pub id: Uuid,
    pub operation: SyncOperation,
    pub entity_type: EntityType,
    pub payload: Value,
    /// Milliseconds since the Unix epoch. Never lower than any item queued before it.
    pub timestamp: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: Vec<Uuid>,
}

/// The durable queue of pending writes.
///
/// Items are replayed oldest first, one at a time. An item leaves the queue
/// only after the server accepted it, so delivery is at-least-once and the
/// server is expected to deduplicate by item id.
#[derive(Debug)]
pub struct SyncQueue {
    store: Arc<LocalStore>,
    flushing: AtomicBool,
    timeout: Duration,
}

struct FlushGuard<'a>(&'a AtomicBool);

impl<'a> FlushGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn now_millis() -> u64 {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

impl SyncQueue {
    #[must_use]
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self::with_timeout(store, DEFAULT_REPLAY_TIMEOUT)
    }

    /// A queue whose replays are abandoned after `timeout` each.
    #[must_use]
    pub const fn with_timeout(store: Arc<LocalStore>, timeout: Duration) -> Self {
        Self {
            store,
            flushing: AtomicBool::new(false),
            timeout,
        }
    }

    /// Record a write for later replay. Never touches the network.
    #[tracing::instrument(skip(self, payload))]
    pub fn enqueue(
        &self,
        operation: SyncOperation,
        entity_type: EntityType,
        payload: Value,
    ) -> Result<SyncQueueItem, StorageError> {
        let item = self
            .store
            .update(SYNC_QUEUE_KEY, |items: &mut Vec<SyncQueueItem>| {
                let latest = items.iter().map(|i| i.timestamp).max().unwrap_or(0);
                let item = SyncQueueItem {
                    id: Uuid::now_v7(),
                    operation,
                    entity_type,
                    payload,
                    timestamp: now_millis().max(latest),
                };
                items.push(item.clone());
                item
            })?;

        tracing::info!(item_id = %item.id, "queued sync item");
        Ok(item)
    }

    /// Items waiting to be replayed, in the order they were queued.
    pub fn pending(&self) -> Result<Vec<SyncQueueItem>, StorageError> {
        self.store.read(SYNC_QUEUE_KEY)
    }

    #[must_use]
    pub fn is_flushing(&self) -> bool {
        self.flushing.load(Ordering::Acquire)
    }

    /// Replay every pending item against `remote`, oldest first.
    ///
    /// A failed or timed out item stays queued and the flush moves on to the
    /// next one. Only storage failures abort the flush.
    #[tracing::instrument(skip_all)]
    pub async fn flush<R: RemoteApi + ?Sized>(&self, remote: &R) -> Result<FlushReport, SyncError> {
        let _guard = FlushGuard::acquire(&self.flushing).ok_or(SyncError::FlushInProgress)?;

        let mut items: Vec<SyncQueueItem> = self
            .blocking(|store| store.read(SYNC_QUEUE_KEY))
            .await?;
        items.sort_by_key(|item| item.timestamp);

        let mut report = FlushReport::default();
        for item in items {
            report.attempted += 1;

            match tokio::time::timeout(self.timeout, remote.replay(&item)).await {
                Ok(Ok(())) => {
                    self.remove(item.id).await?;
                    report.succeeded += 1;
                    tracing::debug!(item_id = %item.id, "sync item replayed");
                }
                Ok(Err(e)) => {
                    tracing::warn!(item_id = %item.id, error = %e, "sync item failed, keeping it queued");
                    report.failed.push(item.id);
                }
                Err(_) => {
                    tracing::warn!(item_id = %item.id, timeout = ?self.timeout, "sync item timed out, keeping it queued");
                    report.failed.push(item.id);
                }
            }
        }

        tracing::info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed.len(),
            "flush finished"
        );
        Ok(report)
    }

    async fn remove(&self, item_id: Uuid) -> Result<(), StorageError> {
        self.blocking(move |store| {
            store.update(SYNC_QUEUE_KEY, |items: &mut Vec<SyncQueueItem>| {
                items.retain(|i| i.id != item_id);
            })
        })
        .await
    }

    /// Run a storage operation on the blocking pool.
    async fn blocking<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&LocalStore) -> Result<T, StorageError> + Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || f(&store)).await?
    }
}
