#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

mod connectivity;
mod error;
mod offline;
mod queue;
mod remote;
mod storage;

pub use connectivity::*;
pub use error::*;
pub use offline::*;
pub use queue::*;
pub use remote::*;
pub use storage::*;
