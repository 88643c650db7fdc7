use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

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

/// A queued client write replayed against the API.
///
/// Delivery is at-least-once: the same `id` may arrive more than once and
/// must only be applied the first time.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEnvelope {
    pub id: Uuid,
    pub operation: SyncOperation,
    pub entity_type: EntityType,
    pub payload: Value,
    pub timestamp: u64,
}
