use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use models::errors::ModelError;
use service::errors::StoreError;

/// Request-level error taxonomy. Every variant maps to one stable response
/// category; internals are never leaked except the store diagnostic.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("blog post not found")]
    NotFound,
    #[error("gist store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("authentication failed")]
    Unauthorized,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("validation failed: {0}")]
    Validation(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::StoreUnavailable(e.to_string())
    }
}

impl From<ModelError> for ApiError {
    fn from(e: ModelError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"detail": "Blog post not found"})),
            )
                .into_response(),
            ApiError::StoreUnavailable(msg) => {
                error!(error = %msg, "gist store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(serde_json::json!({"detail": "Gist store unavailable", "message": msg})),
                )
                    .into_response()
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"detail": "Authentication failed"})),
            )
                .into_response(),
            ApiError::RateLimited => {
                (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded").into_response()
            }
            ApiError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({"detail": msg})),
            )
                .into_response(),
        }
    }
}
