use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    response::IntoResponse,
};
use serde_json::json;

use crate::{Admin, ApiError, AppError, AppState};

#[tracing::instrument(skip(app_state, admin, document_id), fields(admin_id = admin.0.id))]
pub async fn verify_document(
    State(app_state): State<AppState>,
    admin: Admin,
    document_id: Result<Path<u64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(document_id) = document_id?;
    app_state.documents.set_verified(document_id).await?;

    let document = app_state
        .documents
        .get_document(document_id)
        .await?
        .ok_or(AppError::NoSuchDocument(document_id))?;

    Ok(Json(json!({ "success": true, "document": document })))
}
