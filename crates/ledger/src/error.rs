/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("block {index} timestamp is before previous block")]
    InvalidTimestamp { index: usize },
    #[error("first block is not the genesis block")]
    InvalidGenesis,
    #[error("block {index} hash does not match its contents")]
    TamperedBlock { index: usize },
    #[error("ledger log could not be restored after a failed write; refusing appends")]
    LogUnavailable,
    #[error("ledger log error: {0}")]
    Io(#[from] std::io::Error),
}
