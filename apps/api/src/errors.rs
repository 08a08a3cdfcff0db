use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::matching::MatchError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Embedding mismatch: {0}")]
    EmbeddingMismatch(String),

    #[error("Invalid embedding: {0}")]
    InvalidEmbedding(String),

    #[error("Embedding provider error: {message}")]
    Provider { message: String, retriable: bool },
}

impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        let retriable = err.is_retriable();
        match err {
            MatchError::InvalidInput(msg) => AppError::Validation(msg),
            MatchError::Provider(e) => AppError::Provider {
                message: e.to_string(),
                retriable,
            },
            e @ (MatchError::ModelMismatch { .. } | MatchError::DimensionMismatch { .. }) => {
                AppError::EmbeddingMismatch(e.to_string())
            }
            MatchError::InvalidEmbedding(msg) => AppError::InvalidEmbedding(msg),
        }
    }
}

impl AppError {
    fn status_code_message(&self) -> (StatusCode, &'static str, String, bool) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), false),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                false,
            ),
            AppError::EmbeddingMismatch(msg) => {
                tracing::error!("Embedding mismatch: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EMBEDDING_MISMATCH",
                    msg.clone(),
                    false,
                )
            }
            AppError::InvalidEmbedding(msg) => {
                tracing::error!("Invalid embedding: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "INVALID_EMBEDDING",
                    "The embedding provider returned an unusable vector".to_string(),
                    false,
                )
            }
            AppError::Provider { message, retriable } => {
                tracing::error!("Embedding provider error: {message}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "PROVIDER_UNAVAILABLE",
                    "The embedding provider could not score this request".to_string(),
                    *retriable,
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, retriable) = self.status_code_message();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "retriable": retriable
            }
        }));

        (status, body).into_response()
    }
}
