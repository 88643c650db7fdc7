use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::LedgerError;

/// Hash a block's inputs: `hex(SHA-256(previous_hash || timestamp || data))`.
///
/// The timestamp is hashed in its decimal form, so the preimage is the plain
/// string concatenation of the three fields.
#[must_use]
pub fn compute_hash(previous_hash: &str, timestamp: u64, data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(previous_hash.as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

/// JSON serialization of a document snapshot.
pub fn serialize_snapshot<T: Serialize + ?Sized>(snapshot: &T) -> Result<String, LedgerError> {
    serde_json::to_string(snapshot).map_err(|e| LedgerError::Serialization(e.to_string()))
}

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
