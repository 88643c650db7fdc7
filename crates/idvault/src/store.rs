use std::collections::BTreeMap;

use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::{Document, NewDocument, NewUser, User};

#[derive(Debug)]
struct Tables {
    users: BTreeMap<u64, User>,
    documents: BTreeMap<u64, Document>,
    next_user_id: u64,
    next_document_id: u64,
}

/// In-memory users and documents with sequential ids starting at 1.
#[derive(Debug)]
pub struct MemStore {
    tables: RwLock<Tables>,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                users: BTreeMap::new(),
                documents: BTreeMap::new(),
                next_user_id: 1,
                next_document_id: 1,
            }),
        }
    }

    /// Insert a user, or return `None` if the username is already taken.
    pub async fn insert_user(&self, new_user: NewUser) -> Option<User> {
        let mut tables = self.tables.write().await;

        if tables
            .users
            .values()
            .any(|u| u.username == new_user.username)
        {
            return None;
        }

        let id = tables.next_user_id;
        tables.next_user_id += 1;

        let user = User {
            id,
            username: new_user.username,
            password: new_user.password,
            is_admin: new_user.is_admin,
            full_name: new_user.full_name,
            date_of_birth: new_user.date_of_birth,
            nationality: new_user.nationality,
            languages: new_user.languages,
        };
        tables.users.insert(id, user.clone());
        Some(user)
    }

    pub async fn get_user(&self, id: u64) -> Option<User> {
        self.tables.read().await.users.get(&id).cloned()
    }

    pub async fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
    }

    pub async fn insert_document(&self, user_id: u64, new_document: NewDocument) -> Document {
        let mut tables = self.tables.write().await;

        let id = tables.next_document_id;
        tables.next_document_id += 1;

        let document = Document {
            id,
            user_id,
            document_type: new_document.document_type,
            document_data: new_document.document_data,
            verified: false,
            blockchain_hash: None,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.documents.insert(id, document.clone());
        document
    }

    pub async fn get_document(&self, id: u64) -> Option<Document> {
        self.tables.read().await.documents.get(&id).cloned()
    }

    /// Documents owned by `user_id`, in ascending id order.
    pub async fn get_documents_for_user(&self, user_id: u64) -> Vec<Document> {
        self.tables
            .read()
            .await
            .documents
            .values()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn get_document_by_hash(&self, hash: &str) -> Option<Document> {
        self.tables
            .read()
            .await
            .documents
            .values()
            .find(|d| d.blockchain_hash.as_deref() == Some(hash))
            .cloned()
    }

    /// Record the ledger hash of a document. Returns `false` if it does not exist.
    pub async fn set_hash(&self, id: u64, hash: String) -> bool {
        let mut tables = self.tables.write().await;
        tables.documents.get_mut(&id).is_some_and(|d| {
            d.blockchain_hash = Some(hash);
            true
        })
    }

    /// Delete a document. Returns `false` if it does not exist.
    pub async fn remove_document(&self, id: u64) -> bool {
        self.tables.write().await.documents.remove(&id).is_some()
    }

    /// Mark a document verified. Returns `false` if it does not exist.
    pub async fn set_verified(&self, id: u64) -> bool {
        let mut tables = self.tables.write().await;
        tables.documents.get_mut(&id).is_some_and(|d| {
            d.verified = true;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "not-a-real-hash".to_string(),
            is_admin: false,
            full_name: "Test User".to_string(),
            date_of_birth: "2000-01-01".to_string(),
            nationality: "Testland".to_string(),
            languages: BTreeSet::from(["en".to_string()]),
        }
    }

    fn new_document() -> NewDocument {
        NewDocument {
            document_type: "identity".to_string(),
            document_data: "ZGF0YQ".to_string(),
        }
    }

    #[tokio::test]
    async fn ids_are_sequential_from_one() {
        let store = MemStore::new();

        let a = store.insert_user(new_user("a")).await.expect("insert a");
        let b = store.insert_user(new_user("b")).await.expect("insert b");
        assert_eq!((a.id, b.id), (1, 2));

        let d1 = store.insert_document(a.id, new_document()).await;
        let d2 = store.insert_document(b.id, new_document()).await;
        assert_eq!((d1.id, d2.id), (1, 2));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = MemStore::new();
        store.insert_user(new_user("a")).await.expect("insert a");

        assert!(store.insert_user(new_user("a")).await.is_none());
        assert!(store.get_user(2).await.is_none());
    }

    #[tokio::test]
    async fn new_document_is_unhashed_and_unverified() {
        let store = MemStore::new();
        let doc = store.insert_document(1, new_document()).await;

        assert!(!doc.verified);
        assert!(doc.blockchain_hash.is_none());
        assert_eq!(store.get_documents_for_user(1).await.len(), 1);
        assert!(store.get_documents_for_user(2).await.is_empty());
    }

    #[tokio::test]
    async fn hash_lookup_after_set_hash() {
        let store = MemStore::new();
        let doc = store.insert_document(1, new_document()).await;

        assert!(store.get_document_by_hash("abc").await.is_none());
        assert!(store.set_hash(doc.id, "abc".to_string()).await);

        let found = store.get_document_by_hash("abc").await.expect("by hash");
        assert_eq!(found.id, doc.id);
        assert!(!store.set_hash(99, "abc".to_string()).await);
    }

    #[tokio::test]
    async fn set_verified_only_touches_existing_documents() {
        let store = MemStore::new();
        let doc = store.insert_document(1, new_document()).await;

        assert!(store.set_verified(doc.id).await);
        assert!(store.get_document(doc.id).await.expect("doc").verified);
        assert!(!store.set_verified(42).await);
    }
}
