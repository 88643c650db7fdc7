use async_trait::async_trait;

use crate::{AppError, Document, MemStore, NewDocument};

#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn create_document(
        &self,
        user_id: u64,
        document: NewDocument,
    ) -> Result<Document, AppError>;
    async fn get_document(&self, document_id: u64) -> Result<Option<Document>, AppError>;
    async fn get_documents_for_user(&self, user_id: u64) -> Result<Vec<Document>, AppError>;
    async fn get_document_by_hash(&self, hash: &str) -> Result<Option<Document>, AppError>;
    async fn set_hash(&self, document_id: u64, hash: String) -> Result<(), AppError>;
    async fn set_verified(&self, document_id: u64) -> Result<(), AppError>;
    async fn delete_document(&self, document_id: u64) -> Result<(), AppError>;
}

#[async_trait]
impl DocumentService for MemStore {
    #[tracing::instrument(skip(self, document), fields(document_type = %document.document_type))]
    async fn create_document(
        &self,
        user_id: u64,
        document: NewDocument,
    ) -> Result<Document, AppError> {
        let document = self.insert_document(user_id, document).await;
        tracing::info!(document_id = document.id, "created document");
        Ok(document)
    }

    async fn get_document(&self, document_id: u64) -> Result<Option<Document>, AppError> {
        Ok(MemStore::get_document(self, document_id).await)
    }

    async fn get_documents_for_user(&self, user_id: u64) -> Result<Vec<Document>, AppError> {
        Ok(MemStore::get_documents_for_user(self, user_id).await)
    }

    async fn get_document_by_hash(&self, hash: &str) -> Result<Option<Document>, AppError> {
        Ok(MemStore::get_document_by_hash(self, hash).await)
    }

    #[tracing::instrument(skip(self))]
    async fn set_hash(&self, document_id: u64, hash: String) -> Result<(), AppError> {
        if MemStore::set_hash(self, document_id, hash).await {
            Ok(())
        } else {
            Err(AppError::NoSuchDocument(document_id))
        }
    }

    #[tracing::instrument(skip(self))]
    async fn set_verified(&self, document_id: u64) -> Result<(), AppError> {
        if MemStore::set_verified(self, document_id).await {
            tracing::info!("document verified");
            Ok(())
        } else {
            Err(AppError::NoSuchDocument(document_id))
        }
    }

    #[tracing::instrument(skip(self))]
    async fn delete_document(&self, document_id: u64) -> Result<(), AppError> {
        if MemStore::remove_document(self, document_id).await {
            tracing::info!("document deleted");
            Ok(())
        } else {
            Err(AppError::NoSuchDocument(document_id))
        }
    }
}
