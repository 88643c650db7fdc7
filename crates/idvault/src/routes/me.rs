use axum::{Json, response::IntoResponse};

use crate::{OutboundUser, User};

/// returns the user bound to the caller's session
#[tracing::instrument(skip(user), fields(user_id = user.id))]
pub async fn me(user: User) -> impl IntoResponse {
    Json(OutboundUser::from(user))
}
