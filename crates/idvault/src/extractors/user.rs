use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{ApiError, AppState, ExtractError, User, WebSession};

pub const SESSION_USER_KEY: &str = "user_id";

/// A logged-in user holding the admin role.
#[derive(Clone, Debug)]
pub struct Admin(pub User);

impl User {
    async fn get_user_from_parts(
        parts: &mut Parts,
        app_state: &AppState,
    ) -> Result<Self, ExtractError> {
        let session = WebSession::from_parts(parts, app_state).await?;

        let user_id = app_state
            .get_from_session::<u64>(&session, SESSION_USER_KEY)
            .await
            .ok_or(ExtractError::NotLoggedIn)?;

        app_state
            .auth
            .get_user_info(user_id)
            .await
            .map_err(ExtractError::LookupError)?
            .ok_or(ExtractError::NotLoggedIn)
    }
}

impl FromRequestParts<AppState> for User {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, app_state: &AppState) -> Result<Self, ApiError> {
        Ok(Self::get_user_from_parts(parts, app_state).await?)
    }
}

impl FromRequestParts<AppState> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, app_state: &AppState) -> Result<Self, ApiError> {
        let user = User::get_user_from_parts(parts, app_state).await?;
        if user.is_admin {
            Ok(Self(user))
        } else {
            tracing::warn!(user_id = user.id, "non-admin attempted an admin action");
            Err(ExtractError::NotAdmin.into())
        }
    }
}
