use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;

use crate::{AppState, User, WebSession, end_session};

#[tracing::instrument(skip(app_state, web_session, jar, user), fields(user_id = user.id))]
pub async fn logout(
    State(app_state): State<AppState>,
    web_session: WebSession,
    jar: CookieJar,
    user: User,
) -> impl IntoResponse {
    let jar = end_session(&app_state, &web_session, jar).await;

    (jar, Json(serde_json::json!({ "success": true })))
}
