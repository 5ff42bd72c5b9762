//! Error types for kzd-insight

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::GeminiError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Gemini call failed; status follows the upstream response where there is one
    #[error("AI service error: {0}")]
    Upstream(#[from] GeminiError),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// kzd-common error
    #[error("Common error: {0}")]
    Common(#[from] kzd_common::Error),
}

impl ApiError {
    fn upstream_parts(err: &GeminiError) -> (StatusCode, &'static str, String) {
        match err.root() {
            GeminiError::MissingApiKey => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AI_NOT_CONFIGURED",
                "AI Service configuration missing".to_string(),
            ),
            GeminiError::Api { status, message } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "UPSTREAM_ERROR",
                format!("Gemini API returned an error: {}", message),
            ),
            GeminiError::EmptyResponse(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INVALID_AI_RESPONSE",
                "Invalid response from AI Service".to_string(),
            ),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AI_ERROR",
                format!("Failed to generate insights: {}", other),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg,
            ),
            ApiError::Upstream(ref err) => Self::upstream_parts(err),
            ApiError::Other(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
            ApiError::Common(kzd_common::Error::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            ApiError::Common(kzd_common::Error::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg)
            }
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
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
