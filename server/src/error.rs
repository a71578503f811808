//! Service Error Types
//!
//! Errors raised by the post, comment, tag and user services and their HTTP
//! mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::permissions::PermissionError;
use crate::repository::RepositoryError;

/// Error response body for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: code.to_string(),
            message: message.into(),
        }
    }
}

/// Resource service error types.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Target entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Token holder no longer has an account.
    #[error("Account no longer exists")]
    Unauthorized,

    /// Authenticated, but not allowed to act on the resource.
    #[error(transparent)]
    Forbidden(#[from] PermissionError),

    /// Input rejected.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Uniqueness violation.
    #[error("{0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error")]
    Database(#[source] sqlx::Error),

    /// Internal server error.
    #[error("Internal server error")]
    Internal(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(what) => Self::Conflict(format!("Already exists: {what}")),
            RepositoryError::Database(e) => Self::Database(e),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(crate::util::describe_validation_errors(&errors))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Database(e) => {
                tracing::error!(error = %e, "Database error while handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            Self::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal error while handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        (status, Json(ErrorResponse::new(code, self.to_string()))).into_response()
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
