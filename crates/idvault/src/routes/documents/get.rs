use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{ApiError, AppState};

/// Public lookup of a certified document by its ledger hash.
#[tracing::instrument(skip(app_state))]
pub async fn get_document_by_hash(
    State(app_state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let document = app_state
        .documents
        .get_document_by_hash(&hash)
        .await?
        .ok_or_else(|| ApiError::not_found("document"))?;

    Ok(Json(document))
}
