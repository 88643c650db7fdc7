use axum::{Json, extract::State, response::IntoResponse};

use crate::{AppState, CertificationService};

/// Chain height and the result of a full re-validation.
#[tracing::instrument(skip(app_state))]
pub async fn ledger_status(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.ledger.status().await)
}
