//! Endpoints for registering, logging in and logging out

mod login;
mod logout;
mod register;

pub use login::*;
pub use logout::*;
pub use register::*;
