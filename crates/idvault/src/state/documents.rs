use crate::{AppError, CertificationService, Document, NewDocument, User};

use super::AppState;

impl AppState {
    /// Store a document for `owner`, certify it on the ledger and record the hash.
    ///
    /// If the ledger refuses the document, the stored row is deleted again and
    /// the ledger error is returned.
    #[tracing::instrument(skip(self, owner, document), fields(user_id = owner.id))]
    pub async fn create_certified_document(
        &self,
        owner: &User,
        document: NewDocument,
    ) -> Result<Document, AppError> {
        let saved = self.documents.create_document(owner.id, document).await?;
        let hash = match self.ledger.certify(&saved).await {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    document_id = saved.id,
                    "certification failed; discarding document"
                );
                self.documents.delete_document(saved.id).await?;
                return Err(e);
            }
        };

        self.documents.set_hash(saved.id, hash).await?;

        self.documents
            .get_document(saved.id)
            .await?
            .ok_or(AppError::NoSuchDocument(saved.id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use ledger::{Ledger, LedgerError};

    use crate::{InboundUser, LedgerStatus, MemStore};

    use super::*;

    struct RefusingLedger;

    #[async_trait]
    impl CertificationService for RefusingLedger {
        async fn certify(&self, _document: &Document) -> Result<String, AppError> {
            Err(LedgerError::LogUnavailable.into())
        }

        async fn verify(&self, _hash: &str) -> bool {
            false
        }

        async fn status(&self) -> LedgerStatus {
            LedgerStatus {
                height: 1,
                valid: true,
                invalid_block: None,
            }
        }
    }

    fn alice() -> InboundUser {
        InboundUser {
            username: "alice".to_string(),
            password: "password123".to_string(),
            full_name: "Alice A".to_string(),
            date_of_birth: "1990-01-01".to_string(),
            nationality: "Syrian".to_string(),
            languages: vec!["ar".to_string(), "en".to_string()],
        }
    }

    fn upload() -> NewDocument {
        NewDocument {
            document_type: "identity".to_string(),
            document_data: "aGVsbG8".to_string(),
        }
    }

    #[tokio::test]
    async fn certified_document_carries_ledger_hash() {
        let state = AppState::in_memory(Ledger::new());
        let owner = state.auth.register_user(alice()).await.expect("register");

        let document = state
            .create_certified_document(&owner, upload())
            .await
            .expect("create");

        let hash = document.blockchain_hash.clone().expect("hash assigned");
        assert_eq!(hash.len(), 64);
        assert!(state.ledger.verify(&hash).await);
        assert!(!document.verified);

        let by_hash = state
            .documents
            .get_document_by_hash(&hash)
            .await
            .expect("lookup")
            .expect("found");
        assert_eq!(by_hash.id, document.id);
    }

    #[tokio::test]
    async fn refused_certification_leaves_no_document_behind() {
        let store = Arc::new(MemStore::new());
        let state = AppState::new(store.clone(), store, Arc::new(RefusingLedger));
        let owner = state.auth.register_user(alice()).await.expect("register");

        let result = state.create_certified_document(&owner, upload()).await;
        assert!(matches!(
            result,
            Err(AppError::Ledger(LedgerError::LogUnavailable))
        ));

        let documents = state
            .documents
            .get_documents_for_user(owner.id)
            .await
            .expect("list");
        assert!(documents.is_empty());
    }
}
