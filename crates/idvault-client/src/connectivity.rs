use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{RemoteApi, SyncError, SyncQueue};

/// Shared online/offline flag.
#[derive(Clone, Debug)]
pub struct Connectivity {
    tx: Arc<watch::Sender<bool>>,
}

impl Connectivity {
    #[must_use]
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx: Arc::new(tx) }
    }

    pub fn set_online(&self, online: bool) {
        let changed = self.tx.send_if_modified(|current| {
            let changed = *current != online;
            *current = online;
            changed
        });

        if changed {
            tracing::info!(online, "connectivity changed");
        }
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Flush `queue` every time `connectivity` goes from offline to online.
///
/// The starting state is read before the task is spawned. A reconnect that
/// happens while a flush is running is followed by another flush.
/// The task ends when every [`Connectivity`] handle has been dropped.
pub fn spawn_sync_on_reconnect<R>(
    queue: Arc<SyncQueue>,
    remote: Arc<R>,
    connectivity: &Connectivity,
) -> JoinHandle<()>
where
    R: RemoteApi + ?Sized + 'static,
{
    let mut rx = connectivity.subscribe();
    let mut was_online = *rx.borrow_and_update();

    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let mut online = *rx.borrow_and_update();

            while online && !was_online {
                flush_after_reconnect(&queue, remote.as_ref()).await;

                // `set_online` only notifies on a real change, so any change
                // seen here went through offline.
                was_online = !rx.has_changed().unwrap_or(false);
                if !was_online {
                    online = *rx.borrow_and_update();
                }
            }

            was_online = online;
        }
    })
}

async fn flush_after_reconnect<R: RemoteApi + ?Sized>(queue: &SyncQueue, remote: &R) {
    match queue.flush(remote).await {
        Ok(report) => tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed.len(),
            "reconnect flush finished"
        ),
        Err(SyncError::FlushInProgress) => {
            tracing::debug!("flush already running, skipping reconnect flush");
        }
        Err(e) => tracing::warn!(error = %e, "reconnect flush failed"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;
    use tempfile::TempDir;
    use tokio::sync::Notify;

    use super::*;
    use crate::{EntityType, LocalStore, RemoteError, SyncOperation, SyncQueueItem};

    #[derive(Default)]
    struct CountingRemote {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RemoteApi for CountingRemote {
        async fn replay(&self, _item: &SyncQueueItem) -> Result<(), RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn queue_with_one_item() -> (TempDir, Arc<SyncQueue>) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(LocalStore::open(dir.path()).expect("open"));
        let queue = Arc::new(SyncQueue::new(store));
        queue
            .enqueue(SyncOperation::Create, EntityType::User, json!({}))
            .expect("enqueue");
        (dir, queue)
    }

    async fn wait_until_drained(queue: &SyncQueue) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !queue.pending().expect("pending").is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("queue drained");
    }

    #[tokio::test]
    async fn reconnect_triggers_a_flush() {
        let (_dir, queue) = queue_with_one_item();

        let remote = Arc::new(CountingRemote::default());
        let connectivity = Connectivity::new(false);
        let task = spawn_sync_on_reconnect(queue.clone(), remote.clone(), &connectivity);

        // Staying offline does nothing.
        connectivity.set_online(false);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);

        connectivity.set_online(true);
        wait_until_drained(&queue).await;
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);

        drop(connectivity);
        task.await.expect("task ends");
    }

    #[tokio::test]
    async fn reconnect_right_after_spawn_is_not_missed() {
        let (_dir, queue) = queue_with_one_item();
        let remote = Arc::new(CountingRemote::default());
        let connectivity = Connectivity::new(false);

        let task = spawn_sync_on_reconnect(queue.clone(), remote.clone(), &connectivity);
        connectivity.set_online(true);

        wait_until_drained(&queue).await;
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);

        drop(connectivity);
        task.await.expect("task ends");
    }

    #[tokio::test]
    async fn reconnect_during_a_flush_flushes_again() {
        struct StallingRemote {
            stall_next: AtomicBool,
            entered: Notify,
            release: Notify,
            calls: AtomicUsize,
        }

        #[async_trait]
        impl RemoteApi for StallingRemote {
            async fn replay(&self, _item: &SyncQueueItem) -> Result<(), RemoteError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if self.stall_next.swap(false, Ordering::SeqCst) {
                    self.entered.notify_one();
                    self.release.notified().await;
                }
                Ok(())
            }
        }

        let (_dir, queue) = queue_with_one_item();
        let remote = Arc::new(StallingRemote {
            stall_next: AtomicBool::new(true),
            entered: Notify::new(),
            release: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let connectivity = Connectivity::new(false);
        let task = spawn_sync_on_reconnect(queue.clone(), remote.clone(), &connectivity);

        connectivity.set_online(true);
        remote.entered.notified().await;

        // Drop and regain the link while the first flush is stuck.
        connectivity.set_online(false);
        queue
            .enqueue(SyncOperation::Create, EntityType::Document, json!({}))
            .expect("enqueue");
        connectivity.set_online(true);
        remote.release.notify_one();

        wait_until_drained(&queue).await;
        assert_eq!(remote.calls.load(Ordering::SeqCst), 2);

        drop(connectivity);
        task.await.expect("task ends");
    }
}
