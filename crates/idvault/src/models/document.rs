use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// An identity document and its ledger certification state.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: u64,
    pub user_id: u64,
    pub document_type: String,
    /// Base64 of the uploaded bytes.
    pub document_data: String,
    /// Only ever set by an admin.
    pub verified: bool,
    /// `None` until the ledger assigns a block hash.
    pub blockchain_hash: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug)]
pub struct NewDocument {
    pub document_type: String,
    pub document_data: String,
}

pub const DEFAULT_DOCUMENT_TYPE: &str = "identity";

/// Document fields as carried in a replayed sync item.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundDocument {
    #[serde(default)]
    pub document_type: Option<String>,
    pub document_data: String,
}

impl From<InboundDocument> for NewDocument {
    fn from(inbound: InboundDocument) -> Self {
        let document_type = inbound
            .document_type
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_DOCUMENT_TYPE.to_string());

        Self {
            document_type,
            document_data: inbound.document_data,
        }
    }
}
