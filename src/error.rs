use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use compute::CoreError;
use tracing::{error, warn};

use crate::schemas::ErrorResponse;

/// HTTP-facing error: a status code plus the JSON error body.
/// Built from `CoreError` so handlers can use `?` on compute calls.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: message.into(),
                code: code.to_string(),
                dependents: None,
                success: false,
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "ACCESS_DENIED", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => {
                warn!("validation rejected: {msg}");
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION", msg)
            }
            CoreError::AccessDenied(msg) => {
                warn!("access denied: {msg}");
                Self::new(StatusCode::FORBIDDEN, "ACCESS_DENIED", msg)
            }
            CoreError::NotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
            }
            CoreError::Protected { dependents, .. } => {
                let mut api = Self::new(StatusCode::CONFLICT, "PROTECTED", err.to_string());
                api.body.dependents = Some(dependents);
                api
            }
            CoreError::InvalidTransition { .. } => {
                Self::new(StatusCode::CONFLICT, "INVALID_TRANSITION", err.to_string())
            }
            CoreError::Database(db_err) => {
                error!("database error: {db_err}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE",
                    "internal database error",
                )
            }
        }
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        CoreError::Database(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
