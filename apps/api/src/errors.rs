use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::{GenerationError, TriggerError};
use crate::llm_client::CompletionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Trigger(#[from] TriggerError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Generation(e) => {
                let (status, code) = match e {
                    GenerationError::Prompt(_) => (StatusCode::BAD_REQUEST, "PROMPT_ERROR"),
                    GenerationError::Completion(CompletionError::Unauthorized(_)) => {
                        (StatusCode::BAD_GATEWAY, "PROVIDER_UNAUTHORIZED")
                    }
                    GenerationError::Completion(CompletionError::RateLimited(_)) => {
                        (StatusCode::TOO_MANY_REQUESTS, "PROVIDER_RATE_LIMITED")
                    }
                    GenerationError::Completion(CompletionError::Timeout { .. }) => {
                        (StatusCode::GATEWAY_TIMEOUT, "PROVIDER_TIMEOUT")
                    }
                    GenerationError::Completion(_) => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
                    GenerationError::Extraction(_) | GenerationError::Validation(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "UNUSABLE_RESPONSE")
                    }
                };
                (status, code, e.user_message().to_string())
            }
            AppError::Trigger(e) => {
                let code = match e {
                    TriggerError::AlreadyPending => "ALREADY_PENDING",
                    TriggerError::NotIdle => "NOT_IDLE",
                };
                (StatusCode::CONFLICT, code, e.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = match &self {
            AppError::Generation(e) => {
                tracing::warn!("Generation failed at {:?}: {e}", e.stage());
                json!({
                    "error": {
                        "code": code,
                        "stage": e.stage(),
                        "message": message,
                        "detail": e.to_string()
                    }
                })
            }
            _ => json!({
                "error": {
                    "code": code,
                    "message": message
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}
