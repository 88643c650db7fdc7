use std::path::Path;

use serde::Serialize;

use crate::crypto::{self, compute_hash};
use crate::error::LedgerError;
use crate::genesis::{genesis_block, is_genesis};
use crate::log::BlockLog;
use crate::types::Block;

/// The ledger: an append-only list of blocks, each hash-linked to its predecessor.
///
/// Appends take `&mut self`, so callers sharing a ledger between tasks must put it
/// behind a lock; the read of the previous hash and the push happen under it.
#[derive(Debug)]
pub struct Ledger {
    pub(crate) blocks: Vec<Block>,
    /// When set, every appended block is persisted before its hash is handed out.
    log: Option<BlockLog>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Create an in-memory ledger holding only the genesis block.
    #[must_use]
    pub fn new() -> Self {
        Self::with_genesis_timestamp(crypto::current_timestamp())
    }

    #[must_use]
    pub fn with_genesis_timestamp(timestamp: u64) -> Self {
        Self {
            blocks: vec![genesis_block(timestamp)],
            log: None,
        }
    }

    /// Open a ledger backed by an append-only log file.
    ///
    /// An empty log is initialised with a genesis block. An existing log is
    /// replayed and must validate from genesis, otherwise opening fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let (mut log, blocks) = BlockLog::open(path)?;

        if blocks.is_empty() {
            let genesis = genesis_block(crypto::current_timestamp());
            log.append(&genesis)?;
            tracing::info!(path = %log.path().display(), "initialised new ledger log");
            return Ok(Self {
                blocks: vec![genesis],
                log: Some(log),
            });
        }

        let ledger = Self {
            blocks,
            log: Some(log),
        };
        ledger.validate_chain()?;
        tracing::info!(height = ledger.height(), "replayed ledger log");
        Ok(ledger)
    }

    /// Append a document snapshot stamped with the current time and return the new block's hash.
    ///
    /// The timestamp never goes backwards: if the clock reads earlier than the
    /// head block, the head's timestamp is reused.
    pub fn append<T: Serialize + ?Sized>(&mut self, snapshot: &T) -> Result<String, LedgerError> {
        let timestamp = crypto::current_timestamp().max(self.head().timestamp);
        self.append_at(snapshot, timestamp)
    }

    /// Append a document snapshot with an explicit timestamp.
    pub fn append_at<T: Serialize + ?Sized>(
        &mut self,
        snapshot: &T,
        timestamp: u64,
    ) -> Result<String, LedgerError> {
        let data = crypto::serialize_snapshot(snapshot)?;
        let previous = self.head();

        if timestamp < previous.timestamp {
            return Err(LedgerError::InvalidTimestamp {
                index: self.blocks.len(),
            });
        }

        let block = Block {
            hash: compute_hash(&previous.hash, timestamp, &data),
            data,
            timestamp,
        };

        if let Some(log) = self.log.as_mut() {
            log.append(&block)?;
        }

        let hash = block.hash.clone();
        self.blocks.push(block);
        tracing::debug!(height = self.blocks.len(), %hash, "appended block");
        Ok(hash)
    }

    /// Whether any block in the chain carries `hash`.
    #[must_use]
    pub fn verify(&self, hash: &str) -> bool {
        self.blocks.iter().any(|block| block.hash == hash)
    }

    /// Recompute every block's hash from genesis and report the first mismatch.
    pub fn validate_chain(&self) -> Result<(), LedgerError> {
        let Some(genesis) = self.blocks.first() else {
            return Err(LedgerError::InvalidGenesis);
        };
        if !is_genesis(genesis) {
            return Err(LedgerError::InvalidGenesis);
        }

        for (index, pair) in self.blocks.windows(2).enumerate() {
            let (previous, block) = (&pair[0], &pair[1]);
            let index = index + 1;

            if block.timestamp < previous.timestamp {
                return Err(LedgerError::InvalidTimestamp { index });
            }
            if compute_hash(&previous.hash, block.timestamp, &block.data) != block.hash {
                return Err(LedgerError::TamperedBlock { index });
            }
        }

        Ok(())
    }

    /// The number of blocks in the chain, genesis included.
    #[must_use]
    pub fn height(&self) -> usize {
        self.blocks.len()
    }

    /// The most recently appended block.
    #[must_use]
    pub fn head(&self) -> &Block {
        // The chain is created with a genesis block and never shrinks.
        &self.blocks[self.blocks.len() - 1]
    }

    #[must_use]
    pub fn get_block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Whether appends are persisted to a log file.
    #[must_use]
    pub const fn is_durable(&self) -> bool {
        self.log.is_some()
    }
}
