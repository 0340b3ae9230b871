//! HTTP client for the `/api/oblique` endpoint.
//!
//! Sends the user's generation options, validates the reply, and stamps each
//! returned strategy with the local time it was received.

use crate::models::{ErrorResponse, GenerationRequest};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;

/// A strategy as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub text: String,
    /// Client-side receive time, for display only.
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

impl Strategy {
    /// Display label for curated sources; AI output carries none.
    pub fn source_label(&self) -> Option<&'static str> {
        match self.source.as_str() {
            "authentic" => Some("Authentic Brian Eno Strategy"),
            "fallback" => Some("Offline Fallback Strategy"),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    strategies: Option<Vec<String>>,
    source: Option<String>,
}

pub struct StrategyClient {
    client: Client,
    base_url: String,
}

impl StrategyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::new_with_client(base_url, Client::new())
    }

    pub fn new_with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// POST `request` to the generation endpoint and return the strategies.
    ///
    /// Every failure is reported as [`Error::Communication`]; nothing is retried.
    pub async fn request_strategies(&self, request: &GenerationRequest) -> Result<Vec<Strategy>> {
        let url = format!("{}/api/oblique", self.base_url);
        tracing::debug!("Requesting {} strategies from {}", request.count, url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Communication(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| format!("HTTP error! status: {}", status.as_u16()));
            return Err(Error::Communication(detail));
        }

        if !content_type.contains("application/json") {
            return Err(Error::Communication("Response is not valid JSON".to_string()));
        }

        if body.trim().is_empty() {
            return Err(Error::Communication("Empty response received".to_string()));
        }

        let parsed: ApiResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Communication(format!("Response is not valid JSON: {}", e)))?;

        let strategies = parsed
            .strategies
            .ok_or_else(|| Error::Communication("Invalid response format".to_string()))?;
        let source = parsed.source.unwrap_or_else(|| "unknown".to_string());

        let received_at = Utc::now();
        Ok(strategies
            .into_iter()
            .map(|text| Strategy {
                text,
                timestamp: received_at,
                source: source.clone(),
            })
            .collect())
    }
}
