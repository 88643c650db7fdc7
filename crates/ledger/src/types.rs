use serde::{Deserialize, Serialize};

/// A block in the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Lowercase hex SHA-256 of `(previous.hash || timestamp || data)`.
    /// The genesis block carries a sentinel instead.
    pub hash: String,
    /// JSON serialization of the certified document snapshot.
    pub data: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}
