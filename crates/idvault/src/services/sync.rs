use std::collections::{HashMap, VecDeque};
use std::future::Future;

use axum::http::StatusCode;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::ApiError;

/// Receipts kept before the oldest is forgotten.
pub const DEFAULT_RECEIPT_CAPACITY: usize = 10_000;

/// The recorded outcome of the first successful application of a sync item.
#[derive(Clone, Debug)]
pub struct SyncReceipt {
    pub status: StatusCode,
    pub body: Value,
    /// Whether this receipt was served from a previous application.
    pub duplicate: bool,
}

/// Identifies a sync item: the replaying user (if any) and the client's item id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SyncKey {
    pub owner: Option<u64>,
    pub item_id: Uuid,
}

impl SyncKey {
    #[must_use]
    pub const fn anonymous(item_id: Uuid) -> Self {
        Self {
            owner: None,
            item_id,
        }
    }

    #[must_use]
    pub const fn owned_by(owner: u64, item_id: Uuid) -> Self {
        Self {
            owner: Some(owner),
            item_id,
        }
    }
}

#[derive(Debug)]
struct Recorded {
    fingerprint: String,
    status: StatusCode,
    body: Value,
}

#[derive(Debug, Default)]
struct Receipts {
    by_key: HashMap<SyncKey, Recorded>,
    order: VecDeque<SyncKey>,
}

/// Applies replayed sync items at most once per [`SyncKey`].
///
/// Applications are serialised under one lock so two deliveries of the same
/// item cannot both pass the "already applied?" check. Failed applications are
/// not recorded, so the client may retry them. A recorded receipt is only
/// served back for the same payload, and only the newest `capacity` receipts
/// are kept.
#[derive(Debug)]
pub struct SyncReceiver {
    receipts: Mutex<Receipts>,
    capacity: usize,
}

impl Default for SyncReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncReceiver {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_RECEIPT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            receipts: Mutex::default(),
            capacity: capacity.max(1),
        }
    }

    #[tracing::instrument(skip(self, payload, apply), fields(owner = ?key.owner, item_id = %key.item_id))]
    pub async fn apply_once<F, Fut>(
        &self,
        key: SyncKey,
        payload: &Value,
        apply: F,
    ) -> Result<SyncReceipt, ApiError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<(StatusCode, Value), ApiError>> + Send,
    {
        let fingerprint = fingerprint(payload);
        let mut receipts = self.receipts.lock().await;

        if let Some(recorded) = receipts.by_key.get(&key) {
            if recorded.fingerprint != fingerprint {
                tracing::warn!("sync item id reused with a different payload");
                return Err(ApiError::new(
                    StatusCode::CONFLICT,
                    "sync item id already used for a different payload",
                ));
            }
            tracing::info!("duplicate sync item, returning recorded result");
            return Ok(SyncReceipt {
                status: recorded.status,
                body: recorded.body.clone(),
                duplicate: true,
            });
        }

        let (status, body) = apply().await?;

        while receipts.order.len() >= self.capacity {
            if let Some(oldest) = receipts.order.pop_front() {
                receipts.by_key.remove(&oldest);
            }
        }
        receipts.order.push_back(key);
        receipts.by_key.insert(
            key,
            Recorded {
                fingerprint,
                status,
                body: body.clone(),
            },
        );
        drop(receipts);

        Ok(SyncReceipt {
            status,
            body,
            duplicate: false,
        })
    }
}

fn fingerprint(payload: &Value) -> String {
    hex::encode(Sha256::digest(payload.to_string().as_bytes()))
}
