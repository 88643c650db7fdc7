//! Endpoints for uploading, listing, looking up and verifying documents

mod create;
mod get;
mod list;
mod verify;

pub use create::*;
pub use get::*;
pub use list::*;
pub use verify::*;
