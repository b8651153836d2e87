use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::models::common::ErrorResponse;

/// Which provider call a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Story,
    Image,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationStage::Story => f.write_str("Story"),
            GenerationStage::Image => f.write_str("Image"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("{0}")]
    Validation(String),

    #[error("Request body is too large.")]
    PayloadTooLarge,

    #[error("{message}")]
    MissingCredentials {
        message: String,
        missing_keys: Vec<&'static str>,
    },

    #[error("Gemini API request timed out. Please try again.")]
    Timeout,

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    ProviderRejected(String),

    #[error("{stage} prompt was blocked by Gemini ({reason}).")]
    Blocked {
        stage: GenerationStage,
        reason: String,
    },

    #[error("{0}")]
    UnexpectedFormat(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl StoryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StoryError::Validation(_) => StatusCode::BAD_REQUEST,
            StoryError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            StoryError::MissingCredentials { .. } => StatusCode::NOT_IMPLEMENTED,
            StoryError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            StoryError::Transport(_)
            | StoryError::ProviderRejected(_)
            | StoryError::Blocked { .. }
            | StoryError::UnexpectedFormat(_) => StatusCode::BAD_GATEWAY,
            StoryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            StoryError::Validation(_) => "BAD_REQUEST",
            StoryError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            StoryError::MissingCredentials { .. } => "MISSING_API_KEYS",
            StoryError::Timeout => "PROVIDER_TIMEOUT",
            StoryError::Transport(_) => "PROVIDER_UNAVAILABLE",
            StoryError::ProviderRejected(_) => "PROVIDER_ERROR",
            StoryError::Blocked { .. } => "PROMPT_BLOCKED",
            StoryError::UnexpectedFormat(_) => "UNEXPECTED_FORMAT",
            StoryError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for StoryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let details = match &self {
            StoryError::MissingCredentials { missing_keys, .. } => {
                Some(json!({ "missingKeys": missing_keys }))
            }
            _ => None,
        };

        let message = match &self {
            StoryError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                "An internal error occurred".to_string()
            }
            StoryError::Validation(msg) => msg.clone(),
            StoryError::PayloadTooLarge => self.to_string(),
            StoryError::MissingCredentials { message, .. } => {
                tracing::warn!("Story generation requested without API keys");
                message.clone()
            }
            other => {
                tracing::error!(code, "Story generation failed: {}", other);
                other.to_string()
            }
        };

        (status, Json(ErrorResponse::new(code, message, details))).into_response()
    }
}

// Helper type for results
pub type Result<T> = std::result::Result<T, StoryError>;
