use axum::{
    http::StatusCode,
    response::{IntoResponse, Response, Json},
};
use diskfile_files::FileError;
use diskfile_signing::SigningError;
use diskfile_storage::StorageError;
use thiserror::Error;

use crate::models::{ErrorResponse, ErrorDetail};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl From<SigningError> for ApiError {
    fn from(err: SigningError) -> Self {
        ApiError::Forbidden(err.to_string())
    }
}

impl From<FileError> for ApiError {
    fn from(err: FileError) -> Self {
        match err {
            err if err.is_not_found() => ApiError::NotFound,
            FileError::Storage(StorageError::UnknownDisk(_)) => ApiError::NotFound,
            err => ApiError::InternalError(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
            ),
            // Signature details stay in the logs
            ApiError::Forbidden(reason) => {
                tracing::warn!("Rejected signed request: {}", reason);
                (StatusCode::FORBIDDEN, "FORBIDDEN", "Invalid or expired link".to_string())
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
            ApiError::InvalidPath(msg) => (StatusCode::BAD_REQUEST, "INVALID_PATH", msg),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}
