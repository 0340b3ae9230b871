//! Error handling and custom error types
//!
//! Provides unified error handling across the service and client using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::time::Duration;
use thiserror::Error;

use crate::models::ErrorResponse;

/// Message returned when the text model has no credential.
pub const NOT_CONFIGURED_MESSAGE: &str =
    "AI service is not configured. Please check API key configuration.";

/// Message returned when every requested item failed.
pub const EXHAUSTED_MESSAGE: &str =
    "Unable to generate AI strategies at this time. Please try again later.";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{}", NOT_CONFIGURED_MESSAGE)]
    NotConfigured,

    #[error("Upstream call exceeded {0:?}")]
    UpstreamTimeout(Duration),

    #[error("Generated strategy rejected: {0}")]
    ValidationRejected(String),

    #[error("{}", EXHAUSTED_MESSAGE)]
    UpstreamExhausted,

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Communication error: {0}")]
    Communication(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generic error: {0}")]
    Generic(String),
}

impl Error {
    /// Extra guidance for the user when a failure points at a missing credential.
    pub fn configuration_hint(&self) -> Option<&'static str> {
        let mentions_key = match self {
            Error::NotConfigured => true,
            Error::Communication(msg) => msg.contains("API key"),
            _ => false,
        };

        mentions_key.then_some(
            "Please ensure your Google AI API key is configured in your environment variables.",
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Status and client-facing message for this error at the HTTP boundary.
    ///
    /// Upstream and internal details are logged, never returned.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                NOT_CONFIGURED_MESSAGE.to_string(),
            ),
            Error::UpstreamExhausted
            | Error::UpstreamTimeout(_)
            | Error::ValidationRejected(_)
            | Error::AiProvider(_)
            | Error::Http(_) => (StatusCode::GATEWAY_TIMEOUT, EXHAUSTED_MESSAGE.to_string()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred".to_string(),
            ),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", status, self);
        } else {
            tracing::warn!("Request rejected ({}): {}", status, self);
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
