use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::documents::DocumentError;
use crate::llm_client::LlmError;
use crate::prompts::PromptError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    /// The model answered with an error envelope and every fallback failed.
    #[error("Model declined: {0}")]
    ModelDeclined(String),

    #[error("Schema validation failed: {0}")]
    SchemaValidation(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Prompt template error: {0}")]
    Prompt(#[from] PromptError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Configuration(inner) => AppError::Configuration(inner.to_string()),
            other => AppError::Transport(other.to_string()),
        }
    }
}

impl From<DocumentError> for AppError {
    fn from(e: DocumentError) -> Self {
        AppError::Input(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::Transport(msg) => {
                tracing::error!("Transport error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "TRANSPORT_ERROR",
                    "The completion service could not be reached".to_string(),
                )
            }
            AppError::ModelDeclined(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "MODEL_DECLINED",
                msg.clone(),
            ),
            AppError::SchemaValidation(msg) => {
                tracing::warn!("Schema validation error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SCHEMA_VALIDATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::Input(msg) => (StatusCode::BAD_REQUEST, "INPUT_ERROR", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Prompt(e) => {
                tracing::error!("Prompt template error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
