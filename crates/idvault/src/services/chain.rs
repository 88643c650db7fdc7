use std::sync::Arc;

use async_trait::async_trait;
use ledger::{Ledger, LedgerError};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::{AppError, Document};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStatus {
    pub height: usize,
    pub valid: bool,
    pub invalid_block: Option<usize>,
}

#[async_trait]
pub trait CertificationService: Send + Sync {
    /// Append a snapshot of `document` and return the block hash.
    async fn certify(&self, document: &Document) -> Result<String, AppError>;
    async fn verify(&self, hash: &str) -> bool;
    async fn status(&self) -> LedgerStatus;
}

/// Shared handle to the process-wide ledger.
///
/// Every append goes through one mutex, so the head read and the push of the
/// new block can never interleave with another certification.
#[derive(Clone)]
pub struct LedgerService {
    ledger: Arc<Mutex<Ledger>>,
}

impl LedgerService {
    #[must_use]
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
        }
    }
}

#[async_trait]
impl CertificationService for LedgerService {
    #[tracing::instrument(skip(self, document), fields(document_id = document.id))]
    async fn certify(&self, document: &Document) -> Result<String, AppError> {
        // The append fsyncs the log, so it runs off the async workers while
        // the owned guard keeps other certifications waiting.
        let mut ledger = self.ledger.clone().lock_owned().await;
        let snapshot = document.clone();
        let hash = tokio::task::spawn_blocking(move || ledger.append(&snapshot)).await??;
        tracing::info!(%hash, "document certified");
        Ok(hash)
    }

    async fn verify(&self, hash: &str) -> bool {
        self.ledger.lock().await.verify(hash)
    }

    async fn status(&self) -> LedgerStatus {
        let ledger = self.ledger.lock().await;
        let height = ledger.height();
        match ledger.validate_chain() {
            Ok(()) => LedgerStatus {
                height,
                valid: true,
                invalid_block: None,
            },
            Err(LedgerError::TamperedBlock { index } | LedgerError::InvalidTimestamp { index }) => {
                LedgerStatus {
                    height,
                    valid: false,
                    invalid_block: Some(index),
                }
            }
            Err(_) => LedgerStatus {
                height,
                valid: false,
                invalid_block: Some(0),
            },
        }
    }
}
