use axum::routing::{get, post};

use crate::AppState;

mod auth;
mod documents;
mod ledger;
mod me;
mod sync;
mod verify_page;

pub use verify_page::verify_page;

pub struct Api;

impl Api {
    #[must_use]
    pub fn new() -> axum::Router<AppState> {
        axum::Router::new()
            .route("/register", post(auth::register))
            .route("/login", post(auth::login))
            .route("/logout", post(auth::logout))
            .route("/user", get(me::me))
            .route(
                "/documents",
                get(documents::list_documents).post(documents::create_document),
            )
            .route("/documents/{document}", get(documents::get_document_by_hash))
            .route("/documents/{document}/verify", post(documents::verify_document))
            .route("/users/sync", post(sync::sync_user))
            .route("/documents/sync", post(sync::sync_document))
            .route("/ledger", get(ledger::ledger_status))
    }
}
