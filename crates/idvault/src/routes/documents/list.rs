use axum::{Json, extract::State, response::IntoResponse};

use crate::{ApiError, AppState, User};

#[tracing::instrument(skip(app_state, user), fields(user_id = user.id))]
pub async fn list_documents(
    State(app_state): State<AppState>,
    user: User,
) -> Result<impl IntoResponse, ApiError> {
    let documents = app_state.documents.get_documents_for_user(user.id).await?;
    Ok(Json(documents))
}
