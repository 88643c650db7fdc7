mod user;
mod web_session;

pub use user::*;
