mod document;
mod sync;
mod user;
mod web_session;

pub use document::*;
pub use sync::*;
pub use user::*;
pub use web_session::*;
