//! Replay endpoints for the client's offline sync queue.
//!
//! Items are delivered at least once. The first successful application of an
//! item id is recorded per replaying user, and a later delivery of the same id
//! and payload gets the recorded response back, marked with
//! `x-sync-duplicate: true`. Reusing an id for a different payload is a 409.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
};
use serde_json::Value;

use crate::{
    ApiError, AppState, EntityType, FieldError, InboundDocument, InboundUser, OutboundUser,
    SyncEnvelope, SyncKey, SyncOperation, SyncReceipt, User,
};

pub const SYNC_DUPLICATE_HEADER: &str = "x-sync-duplicate";

#[tracing::instrument(skip_all)]
pub async fn sync_user(
    State(app_state): State<AppState>,
    payload: Result<Json<SyncEnvelope>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(envelope) = payload?;
    check_envelope(&envelope, EntityType::User)?;
    tracing::info!(item_id = %envelope.id, "replaying user sync item");

    let inbound: InboundUser = parse_payload(&envelope.payload)?;
    let auth = app_state.auth.clone();

    let receipt = app_state
        .sync
        .apply_once(SyncKey::anonymous(envelope.id), &envelope.payload, || async move {
            let user = auth.register_user(inbound).await?;
            Ok::<_, ApiError>((StatusCode::CREATED, to_value(&OutboundUser::from(user))?))
        })
        .await
        .inspect_err(|e| {
            tracing::warn!(item_id = %envelope.id, error = %e.message, "user sync failed");
        })?;

    Ok(into_response(receipt))
}

#[tracing::instrument(skip_all, fields(user_id = user.id))]
pub async fn sync_document(
    State(app_state): State<AppState>,
    user: User,
    payload: Result<Json<SyncEnvelope>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(envelope) = payload?;
    check_envelope(&envelope, EntityType::Document)?;
    tracing::info!(item_id = %envelope.id, "replaying document sync item");

    let inbound: InboundDocument = parse_payload(&envelope.payload)?;
    if inbound.document_data.is_empty() {
        return Err(ApiError::validation(vec![FieldError::new(
            "documentData",
            "document data is required",
        )]));
    }

    let state = app_state.clone();
    let key = SyncKey::owned_by(user.id, envelope.id);
    let receipt = app_state
        .sync
        .apply_once(key, &envelope.payload, || async move {
            let document = state
                .create_certified_document(&user, inbound.into())
                .await?;
            Ok::<_, ApiError>((StatusCode::CREATED, to_value(&document)?))
        })
        .await
        .inspect_err(|e| {
            tracing::warn!(item_id = %envelope.id, error = %e.message, "document sync failed");
        })?;

    Ok(into_response(receipt))
}

fn check_envelope(envelope: &SyncEnvelope, expected: EntityType) -> Result<(), ApiError> {
    if envelope.entity_type != expected {
        return Err(ApiError::validation(vec![FieldError::new(
            "entityType",
            "entity type does not match this endpoint",
        )]));
    }

    if envelope.operation != SyncOperation::Create {
        return Err(ApiError::validation(vec![FieldError::new(
            "operation",
            "only create operations can be replayed",
        )]));
    }

    Ok(())
}

fn parse_payload<T: serde::de::DeserializeOwned>(payload: &Value) -> Result<T, ApiError> {
    T::deserialize(payload).map_err(|e| {
        ApiError::validation(vec![FieldError::new("payload", "malformed payload")])
            .with_detail(e.to_string())
    })
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "failed to encode response")
            .with_detail(e.to_string())
    })
}

fn into_response(receipt: SyncReceipt) -> impl IntoResponse {
    let duplicate = if receipt.duplicate { "true" } else { "false" };
    (
        receipt.status,
        [(
            HeaderName::from_static(SYNC_DUPLICATE_HEADER),
            HeaderValue::from_static(duplicate),
        )],
        Json(receipt.body),
    )
}
