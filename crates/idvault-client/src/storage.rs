use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use crate::StorageError;

/// A directory of JSON arrays, one file per key.
///
/// Every write lands in a temp file in the same directory and is renamed over
/// the old file, so a crash leaves either the old or the new array on disk.
/// Read-modify-write cycles go through [`LocalStore::update`], which holds a
/// process-wide lock for the whole cycle.
#[derive(Debug)]
pub struct LocalStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl LocalStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "opened local store");

        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    /// Items stored under `key`; a key that was never written reads as empty.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StorageError> {
        let _guard = self.guard();
        self.read_unlocked(key)
    }

    pub fn write<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StorageError> {
        let _guard = self.guard();
        self.write_unlocked(key, items)
    }

    /// Apply `f` to the items under `key` and store the result.
    pub fn update<T, F, R>(&self, key: &str, f: F) -> Result<R, StorageError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> R,
    {
        let _guard = self.guard();
        let mut items = self.read_unlocked(key)?;
        let result = f(&mut items);
        self.write_unlocked(key, &items)?;
        Ok(result)
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.guard();
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn read_unlocked<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StorageError> {
        match fs::read(self.path(key)) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
                key: key.to_string(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_unlocked<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StorageError> {
        let tmp = NamedTempFile::new_in(&self.dir)?;

        let mut writer = BufWriter::new(tmp);
        serde_json::to_writer(&mut writer, items).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        writer.flush()?;

        let tmp = writer.into_inner().map_err(|e| e.into_error())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path(key))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn missing_key_reads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalStore::open(dir.path()).expect("open");

        let items: Vec<Value> = store.read("sync_queue").expect("read");
        assert!(items.is_empty());
    }

    #[test]
    fn update_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = LocalStore::open(dir.path()).expect("open");
            store
                .update("offline_users", |users: &mut Vec<Value>| {
                    users.push(json!({ "username": "alice" }));
                })
                .expect("update");
            store
                .update("offline_users", |users: &mut Vec<Value>| {
                    users.push(json!({ "username": "bob" }));
                })
                .expect("update");
        }

        let store = LocalStore::open(dir.path()).expect("reopen");
        let users: Vec<Value> = store.read("offline_users").expect("read");
        assert_eq!(
            users,
            vec![json!({ "username": "alice" }), json!({ "username": "bob" })]
        );

        let leftovers = fs::read_dir(dir.path()).expect("read_dir").count();
        assert_eq!(leftovers, 1, "temp files are renamed away");
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalStore::open(dir.path()).expect("open");

        store.write("offline_documents", &[1, 2, 3]).expect("write");
        store.remove("offline_documents").expect("remove");
        store.remove("offline_documents").expect("remove again");

        let items: Vec<u32> = store.read("offline_documents").expect("read");
        assert!(items.is_empty());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("sync_queue.json"), "not json").expect("seed");
        let store = LocalStore::open(dir.path()).expect("open");

        let err = store.read::<Value>("sync_queue").expect_err("corrupt");
        assert!(matches!(err, StorageError::Corrupt { ref key, .. } if key == "sync_queue"));
    }
}
