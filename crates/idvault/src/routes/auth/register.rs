use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;

use crate::{
    ApiError, AppState, InboundUser, OutboundUser, SESSION_USER_KEY, WebSession, start_session,
};

/// POST with JSON payload
/// `{ username, password, fullName, dateOfBirth, nationality, languages }`.
///
/// The new user is logged in on a fresh session.
#[tracing::instrument(skip_all)]
pub async fn register(
    State(app_state): State<AppState>,
    previous: Option<WebSession>,
    jar: CookieJar,
    payload: Result<Json<InboundUser>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(new_user) = payload?;
    let user = app_state.auth.register_user(new_user).await?;

    let (web_session, jar) = start_session(&app_state, previous, jar).await;
    app_state
        .insert_into_session(&web_session, SESSION_USER_KEY, &user.id)
        .await?;

    Ok((StatusCode::CREATED, jar, Json(OutboundUser::from(user))))
}
