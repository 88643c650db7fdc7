mod documents;
mod session;

pub use session::SESSION_TTL;

use std::collections::HashMap;
use std::sync::Arc;

use ledger::Ledger;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::MemStore;
use crate::services::{
    AuthService, CertificationService, DocumentService, LedgerService, SyncReceiver,
};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthService>,
    pub documents: Arc<dyn DocumentService>,
    pub ledger: Arc<dyn CertificationService>,
    pub sync: Arc<SyncReceiver>,
    sessions: Arc<RwLock<HashMap<Uuid, session::SessionEntry>>>,
}

impl AppState {
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthService>,
        documents: Arc<dyn DocumentService>,
        ledger: Arc<dyn CertificationService>,
    ) -> Self {
        Self {
            auth,
            documents,
            ledger,
            sync: Arc::new(SyncReceiver::new()),
            sessions: Arc::default(),
        }
    }

    /// State backed by a single [`MemStore`] serving both users and documents.
    #[must_use]
    pub fn in_memory(ledger: Ledger) -> Self {
        let store = Arc::new(MemStore::new());
        Self::new(store.clone(), store, Arc::new(LedgerService::new(ledger)))
    }
}
