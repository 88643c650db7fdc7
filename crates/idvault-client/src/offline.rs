use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::{
    EntityType, LocalStore, SYNC_QUEUE_KEY, StorageError, SyncOperation, SyncQueue, SyncQueueItem,
};

pub const OFFLINE_USERS_KEY: &str = "offline_users";
pub const OFFLINE_DOCUMENTS_KEY: &str = "offline_documents";

/// Fields that only travel in the queued payload and are never kept in a
/// local snapshot.
const SECRET_FIELDS: &[&str] = &["password"];

/// Local snapshots of users and documents created while offline, each paired
/// with a queued `create` for the server.
///
/// Snapshots drop secret fields such as the password. The full payload lives
/// only in the sync queue and is deleted once the server accepts it.
pub struct OfflineStorage {
    store: Arc<LocalStore>,
    queue: Arc<SyncQueue>,
}

impl OfflineStorage {
    #[must_use]
    pub const fn new(store: Arc<LocalStore>, queue: Arc<SyncQueue>) -> Self {
        Self { store, queue }
    }

    pub fn open(dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self, StorageError> {
        let store = Arc::new(LocalStore::open(dir)?);
        let queue = Arc::new(SyncQueue::with_timeout(store.clone(), timeout));
        Ok(Self::new(store, queue))
    }

    #[must_use]
    pub const fn queue(&self) -> &Arc<SyncQueue> {
        &self.queue
    }

    pub fn save_user<T: Serialize>(&self, user: &T) -> Result<SyncQueueItem, StorageError> {
        self.save(OFFLINE_USERS_KEY, EntityType::User, user)
    }

    pub fn save_document<T: Serialize>(&self, document: &T) -> Result<SyncQueueItem, StorageError> {
        self.save(OFFLINE_DOCUMENTS_KEY, EntityType::Document, document)
    }

    pub fn users(&self) -> Result<Vec<Value>, StorageError> {
        self.store.read(OFFLINE_USERS_KEY)
    }

    pub fn documents(&self) -> Result<Vec<Value>, StorageError> {
        self.store.read(OFFLINE_DOCUMENTS_KEY)
    }

    /// Drop every snapshot and every pending sync item.
    pub fn clear(&self) -> Result<(), StorageError> {
        for key in [OFFLINE_USERS_KEY, OFFLINE_DOCUMENTS_KEY, SYNC_QUEUE_KEY] {
            self.store.remove(key)?;
        }
        tracing::info!("cleared offline storage");
        Ok(())
    }

    fn save<T: Serialize>(
        &self,
        key: &str,
        entity_type: EntityType,
        value: &T,
    ) -> Result<SyncQueueItem, StorageError> {
        let payload = serde_json::to_value(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;

        let mut snapshot = payload.clone();
        if let Value::Object(fields) = &mut snapshot {
            for secret in SECRET_FIELDS {
                fields.remove(*secret);
            }
        }

        self.store
            .update(key, |items: &mut Vec<Value>| items.push(snapshot))?;
        self.queue
            .enqueue(SyncOperation::Create, entity_type, payload)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::DEFAULT_REPLAY_TIMEOUT;

    #[test]
    fn saving_snapshots_queues_creates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = OfflineStorage::open(dir.path(), DEFAULT_REPLAY_TIMEOUT).expect("open");

        let user = json!({ "username": "alice", "password": "password123" });
        let document = json!({ "documentType": "passport", "documentData": "aGVsbG8=" });

        let user_item = storage.save_user(&user).expect("save user");
        let document_item = storage.save_document(&document).expect("save document");

        assert_eq!(
            storage.users().expect("users"),
            vec![json!({ "username": "alice" })]
        );
        assert_eq!(storage.documents().expect("documents"), vec![document.clone()]);

        let pending = storage.queue().pending().expect("pending");
        assert_eq!(pending, vec![user_item, document_item]);
        assert_eq!(pending[0].entity_type, EntityType::User);
        assert_eq!(pending[0].operation, SyncOperation::Create);
        assert_eq!(pending[0].payload, user);
        assert_eq!(pending[1].entity_type, EntityType::Document);
    }

    #[test]
    fn password_never_reaches_the_user_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = OfflineStorage::open(dir.path(), DEFAULT_REPLAY_TIMEOUT).expect("open");

        storage
            .save_user(&json!({ "username": "erin", "password": "s3cret-pass" }))
            .expect("save user");

        let on_disk = std::fs::read_to_string(dir.path().join("offline_users.json"))
            .expect("read snapshot file");
        assert!(!on_disk.contains("s3cret-pass"));
        assert!(on_disk.contains("erin"));

        let pending = storage.queue().pending().expect("pending");
        assert_eq!(pending[0].payload["password"], "s3cret-pass");
    }

    #[test]
    fn clear_empties_everything() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = OfflineStorage::open(dir.path(), DEFAULT_REPLAY_TIMEOUT).expect("open");

        storage.save_user(&json!({ "username": "bob" })).expect("save");
        storage.clear().expect("clear");

        assert!(storage.users().expect("users").is_empty());
        assert!(storage.queue().pending().expect("pending").is_empty());
    }
}
