/// Error types for Post Service
///
/// Every failure surfaces as one of these variants and is rendered as
/// `{"error": <message>, "status": <code>}`. Server-side variants carry a
/// caller-safe message only; the underlying cause is logged where the error
/// is created.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::fmt::Display;
use thiserror::Error;

/// Result type for post-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid bearer credential
    #[error("{0}")]
    Unauthenticated(String),

    /// Malformed id, empty comment, missing upload, bad body
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    /// Unexpected store failure on a read path
    #[error("{0}")]
    FetchError(String),

    /// Unexpected store or blob failure on a write path
    #[error("{0}")]
    PersistError(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Log `cause` and return a `FetchError` carrying only `message`.
    pub fn fetch(message: &str, cause: impl Display) -> Self {
        tracing::error!(error = %cause, "{}", message);
        AppError::FetchError(message.to_string())
    }

    /// Log `cause` and return a `PersistError` carrying only `message`.
    pub fn persist(message: &str, cause: impl Display) -> Self {
        tracing::error!(error = %cause, "{}", message);
        AppError::PersistError(message.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::FetchError(_) | AppError::PersistError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}
