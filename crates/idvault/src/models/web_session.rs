use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// A cookie-bound server-side session and its key-value blob.
#[derive(Clone, Debug, Serialize)]
pub struct WebSession {
    pub id: Uuid,
    pub blob: Value,
}
