//! Error types for rps-classifier HTTP handlers

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::classifier::ClassifyError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Request is not a usable multipart/form-data body (missing or bad boundary)
    #[error("Multipart rejected: {0}")]
    MultipartRejected(#[from] MultipartRejection),

    /// Multipart body could not be read (status chosen by axum, e.g. 413)
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// Classification pipeline error
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Multipart(ref err) => {
                let status = err.status();
                let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "PAYLOAD_TOO_LARGE"
                } else {
                    "BAD_MULTIPART"
                };
                (status, code, err.body_text())
            }
            ApiError::MultipartRejected(ref rejection) => {
                (rejection.status(), "BAD_MULTIPART", rejection.body_text())
            }
            ApiError::Classify(ref err) if err.is_client_error() => {
                (StatusCode::BAD_REQUEST, "INVALID_IMAGE", err.to_string())
            }
            ApiError::Classify(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CLASSIFICATION_FAILED",
                err.to_string(),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg,
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
