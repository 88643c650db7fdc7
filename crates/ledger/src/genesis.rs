use crate::types::Block;

/// Sentinel hash of the genesis block.
pub const GENESIS_HASH: &str = "0000";

/// Sentinel data of the genesis block.
pub const GENESIS_DATA: &str = "genesis";

/// Create the fixed first block of every chain.
///
/// Only the timestamp varies between chains; it is never hashed because the
/// genesis hash is a sentinel rather than a digest.
#[must_use]
pub fn genesis_block(timestamp: u64) -> Block {
    Block {
        hash: GENESIS_HASH.to_string(),
        data: GENESIS_DATA.to_string(),
        timestamp,
    }
}

pub(crate) fn is_genesis(block: &Block) -> bool {
    block.hash == GENESIS_HASH && block.data == GENESIS_DATA
}
