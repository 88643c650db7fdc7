use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::{ApiError, AppState, ExtractError, SESSION_COOKIE, WebSession};

impl WebSession {
    /// The session attached by the session middleware, falling back to the cookie.
    pub(crate) async fn from_parts(
        parts: &mut Parts,
        app_state: &AppState,
    ) -> Result<Self, ExtractError> {
        if let Some(session) = parts.extensions.get::<Self>() {
            return Ok(session.clone());
        }

        let jar = CookieJar::from_request_parts(parts, app_state)
            .await
            .map_err(|_| ExtractError::NoSession)?;
        let session_id = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
            .ok_or(ExtractError::NoSession)?;

        app_state
            .get_session(session_id)
            .await
            .ok_or(ExtractError::NoSession)
    }
}

impl FromRequestParts<AppState> for WebSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, app_state: &AppState) -> Result<Self, ApiError> {
        Ok(Self::from_parts(parts, app_state).await?)
    }
}

impl OptionalFromRequestParts<AppState> for WebSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        app_state: &AppState,
    ) -> Result<Option<Self>, Infallible> {
        Ok(Self::from_parts(parts, app_state).await.ok())
    }
}
