use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{ApiError, AppState, OutboundUser, SESSION_USER_KEY, WebSession, start_session};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Logs the user in on a fresh session; any session the caller held is ended.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(app_state): State<AppState>,
    previous: Option<WebSession>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(LoginRequest { username, password }) = payload?;
    let user = app_state.auth.login(&username, &password).await?;

    let (web_session, jar) = start_session(&app_state, previous, jar).await;
    app_state
        .insert_into_session(&web_session, SESSION_USER_KEY, &user.id)
        .await?;

    Ok((jar, Json(OutboundUser::from(user))))
}
