use axum::{
    Json,
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ledger::LedgerError;
use serde::Serialize;

/// JSON error body returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

/// A single failed field of a validated request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl ApiError {
    pub fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status: status.into(),
            message: message.to_string(),
            detail: None,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, &format!("{what} not found"))
    }

    pub fn validation(fields: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST.into(),
            message: "invalid request body".to_string(),
            detail: None,
            fields,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(self),
        )
            .into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "malformed JSON body").with_detail(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "expected a multipart body")
            .with_detail(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid path parameter").with_detail(rejection.body_text())
    }
}

/// Failures while resolving the caller's identity from the request.
#[derive(Debug)]
pub enum ExtractError {
    NoSession,
    NotLoggedIn,
    NotAdmin,
    LookupError(AppError),
}

impl From<ExtractError> for ApiError {
    fn from(value: ExtractError) -> Self {
        match value {
            ExtractError::NoSession => Self::new(StatusCode::UNAUTHORIZED, "missing session"),
            ExtractError::NotLoggedIn => Self::new(StatusCode::UNAUTHORIZED, "not logged in"),
            ExtractError::NotAdmin => Self::new(StatusCode::UNAUTHORIZED, "admin role required"),
            ExtractError::LookupError(e) => e.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("password hashing failed: {0}")]
    ArgonError(String),
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("document {0} does not exist")]
    NoSuchDocument(u64),
    #[error("blocking task failed: {0}")]
    JoinError(#[from] tokio::task::JoinError),
    #[error("value error: {0}")]
    ValueError(String),
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        match value {
            AppError::ArgonError(s) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "password hashing failed")
                    .with_detail(s)
            }
            AppError::Ledger(e) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "ledger append failed")
                    .with_detail(e.to_string())
            }
            AppError::NoSuchDocument(_) => Self::not_found("document"),
            AppError::JoinError(e) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal task failed")
                    .with_detail(e.to_string())
            }
            AppError::ValueError(s) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "value error").with_detail(s)
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("invalid registration")]
    Invalid(Vec<FieldError>),
    #[error("username taken")]
    UsernameExists,
    #[error(transparent)]
    InternalError(#[from] AppError),
}

impl From<RegistrationError> for ApiError {
    fn from(value: RegistrationError) -> Self {
        match value {
            RegistrationError::Invalid(fields) => Self::validation(fields),
            RegistrationError::UsernameExists => Self {
                fields: vec![FieldError::new("username", "username taken")],
                ..Self::new(StatusCode::BAD_REQUEST, "username taken")
            },
            RegistrationError::InternalError(e) => e.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("no such user")]
    NoSuchUser,
    #[error("invalid password")]
    InvalidPassword,
    #[error(transparent)]
    InternalError(#[from] AppError),
}

impl From<LoginError> for ApiError {
    fn from(value: LoginError) -> Self {
        match value {
            LoginError::NoSuchUser | LoginError::InvalidPassword => {
                Self::new(StatusCode::UNAUTHORIZED, "invalid username or password")
            }
            LoginError::InternalError(e) => e.into(),
        }
    }
}
