//! Data models and structures
//!
//! Defines the generation request/response shapes exchanged with the HTTP
//! endpoint, the per-item results, and the environment-driven configuration.

use serde::{Deserialize, Deserializer, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Desired output length for generated strategies.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    #[default]
    Concise,
    Medium,
    Verbose,
}

impl std::str::FromStr for Verbosity {
    type Err = String;

    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        match input.to_ascii_lowercase().as_str() {
            "concise" => Ok(Verbosity::Concise),
            "medium" => Ok(Verbosity::Medium),
            "verbose" => Ok(Verbosity::Verbose),
            other => Err(format!(
                "Invalid length '{}'. Expected concise, medium or verbose",
                other
            )),
        }
    }
}

fn default_count() -> i64 {
    1
}

/// Accept any finite JSON number and truncate it toward zero, so `2.5`
/// requests two items instead of discarding the whole body.
fn deserialize_count<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("count must be a finite number"));
    }
    Ok(value.trunc() as i64)
}

/// Options chosen by the user for one generation click.
///
/// `count` is signed so that nonsensical values survive parsing and are
/// rejected by validation instead of by the JSON decoder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    #[serde(default = "default_count", deserialize_with = "deserialize_count")]
    pub count: i64,
    #[serde(rename = "length", default)]
    pub verbosity: Verbosity,
    #[serde(default)]
    pub moods: Vec<String>,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            count: default_count(),
            verbosity: Verbosity::Concise,
            moods: Vec::new(),
        }
    }
}

impl GenerationRequest {
    pub fn new(count: i64, verbosity: Verbosity, moods: Vec<String>) -> Self {
        Self {
            count,
            verbosity,
            moods,
        }
    }
}

/// Where a single returned strategy came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    AiGenerated,
    CuratedFallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedItem {
    pub text: String,
    pub source: SourceKind,
}

impl GeneratedItem {
    pub fn ai(text: String) -> Self {
        Self {
            text,
            source: SourceKind::AiGenerated,
        }
    }

    pub fn curated(text: String) -> Self {
        Self {
            text,
            source: SourceKind::CuratedFallback,
        }
    }
}

/// Response-level source label sent to clients.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StrategySource {
    /// At least one item came back from the model.
    Gemini,
    /// The model is not configured; curated strategies were served instead.
    Authentic,
    /// Every model call failed; curated strategies were served instead.
    Fallback,
}

impl StrategySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategySource::Gemini => "gemini",
            StrategySource::Authentic => "authentic",
            StrategySource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResponse {
    pub items: Vec<GeneratedItem>,
    pub source: StrategySource,
}

/// JSON body of a successful `/api/oblique` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyResponse {
    pub strategies: Vec<String>,
    pub source: StrategySource,
}

impl From<GenerationResponse> for StrategyResponse {
    fn from(response: GenerationResponse) -> Self {
        Self {
            strategies: response.items.into_iter().map(|item| item.text).collect(),
            source: response.source,
        }
    }
}

/// JSON body of a failed `/api/oblique` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

/// What to do when the model is unavailable or returns unusable text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Drop failed items; error out when nothing survives.
    #[default]
    Reject,
    /// Replace failed items with curated strategies; never error on upstream failure.
    Substitute,
}

impl std::str::FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(FallbackPolicy::Reject),
            "substitute" => Ok(FallbackPolicy::Substitute),
            other => Err(format!(
                "Invalid fallback policy '{}'. Expected reject or substitute",
                other
            )),
        }
    }
}

// Configuration
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_MS: u64 = 8000;
pub const DEFAULT_MAX_COUNT: u32 = 5;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub request_timeout: Duration,
    pub max_count: u32,
    pub fallback_policy: FallbackPolicy,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        load_dotenv(dotenvy::dotenv())?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    ///
    /// A blank API key counts as missing, so a blank `GEMINI_API_KEY` still
    /// lets `GOOGLE_AI_API_KEY` through.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let gemini_api_key =
            non_blank("GEMINI_API_KEY").or_else(|| non_blank("GOOGLE_AI_API_KEY"));

        let timeout_ms = match lookup("OBLIQUE_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                crate::Error::Config(format!("OBLIQUE_TIMEOUT_MS must be milliseconds, got '{}'", raw))
            })?,
            None => DEFAULT_TIMEOUT_MS,
        };

        let max_count = match lookup("OBLIQUE_MAX_COUNT") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|max| *max > 0)
                .ok_or_else(|| {
                    crate::Error::Config(format!(
                        "OBLIQUE_MAX_COUNT must be a positive integer, got '{}'",
                        raw
                    ))
                })?,
            None => DEFAULT_MAX_COUNT,
        };

        let fallback_policy = match lookup("OBLIQUE_FALLBACK_POLICY") {
            Some(raw) => raw.parse().map_err(crate::Error::Config)?,
            None => FallbackPolicy::default(),
        };

        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| {
            crate::Error::Config(format!("BIND_ADDR must be host:port, got '{}'", bind_raw))
        })?;

        Ok(Self {
            gemini_api_key,
            gemini_model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: lookup("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            request_timeout: Duration::from_millis(timeout_ms),
            max_count,
            fallback_policy,
            bind_addr,
        })
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is an error.
fn load_dotenv(result: dotenvy::Result<std::path::PathBuf>) -> crate::Result<()> {
    match result {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}
