#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

mod app;
mod config;
mod errors;
mod extractors;
mod middleware;
mod models;
mod routes;
mod services;
mod state;
mod store;
mod util;

pub use app::*;
pub use config::*;
pub use errors::*;
pub use extractors::*;
pub use middleware::*;
pub use models::*;
pub use routes::*;
pub use services::*;
pub use state::*;
pub use store::*;
pub use util::*;
