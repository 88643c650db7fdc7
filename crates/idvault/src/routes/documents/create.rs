use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::IntoResponse,
};
use base64::{Engine, prelude::BASE64_STANDARD};

use crate::{ApiError, AppState, DEFAULT_DOCUMENT_TYPE, FieldError, NewDocument, User};

const DOCUMENT_FIELD: &str = "document";
const DOCUMENT_TYPE_FIELD: &str = "documentType";

/// Multipart upload with a `documentType` text part and a `document` file part.
///
/// The stored document is certified on the ledger before the response is sent.
#[tracing::instrument(skip(app_state, user, multipart), fields(user_id = user.id))]
pub async fn create_document(
    State(app_state): State<AppState>,
    user: User,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let document = read_upload(multipart?).await?;
    let document = app_state.create_certified_document(&user, document).await?;

    Ok((StatusCode::CREATED, Json(document)))
}

async fn read_upload(mut multipart: Multipart) -> Result<NewDocument, ApiError> {
    let mut document_type = None;
    let mut bytes = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::new(StatusCode::BAD_REQUEST, "malformed multipart body").with_detail(e.body_text())
    })? {
        match field.name() {
            Some(DOCUMENT_TYPE_FIELD) => {
                let text = field.text().await.map_err(|e| {
                    ApiError::new(StatusCode::BAD_REQUEST, "unreadable documentType")
                        .with_detail(e.body_text())
                })?;
                document_type = Some(text);
            }
            Some(DOCUMENT_FIELD) => {
                let data = field.bytes().await.map_err(|e| {
                    ApiError::new(StatusCode::BAD_REQUEST, "unreadable document")
                        .with_detail(e.body_text())
                })?;
                bytes = Some(data);
            }
            other => tracing::debug!(field = ?other, "ignoring unknown multipart field"),
        }
    }

    let bytes = match bytes {
        Some(bytes) if !bytes.is_empty() => bytes,
        Some(_) => {
            return Err(ApiError::validation(vec![FieldError::new(
                DOCUMENT_FIELD,
                "uploaded file is empty",
            )]));
        }
        None => {
            return Err(ApiError::validation(vec![FieldError::new(
                DOCUMENT_FIELD,
                "a document file is required",
            )]));
        }
    };

    let document_type = document_type
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_DOCUMENT_TYPE.to_string());

    Ok(NewDocument {
        document_type,
        document_data: BASE64_STANDARD.encode(&bytes),
    })
}
