#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

mod chain;
mod crypto;
mod error;
mod genesis;
mod log;
mod types;

pub use chain::Ledger;
pub use crypto::{compute_hash, current_timestamp};
pub use error::LedgerError;
pub use genesis::{GENESIS_DATA, GENESIS_HASH, genesis_block};
pub use log::BlockLog;
pub use types::Block;
