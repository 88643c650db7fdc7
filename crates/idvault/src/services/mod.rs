mod auth;
mod chain;
mod document;
mod sync;

pub use auth::*;
pub use chain::*;
pub use document::*;
pub use sync::*;
