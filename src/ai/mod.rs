//! AI service integration for strategy text generation
//!
//! Provides the [`TextGenerationService`] seam, the Gemini implementation, a
//! scriptable mock, and [`StrategyModel`], which records whether a model is
//! available at all.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiTextClient;
pub use mock::MockTextClient;

use crate::models::Config;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Send one prompt and return the raw text of the reply.
    async fn generate_text(&self, prompt: &str) -> Result<String>;
}

/// The text model as configured at startup.
#[derive(Clone)]
pub enum StrategyModel {
    Configured(Arc<dyn TextGenerationService>),
    /// No credential was supplied; the model must never be called.
    Unconfigured,
}

impl StrategyModel {
    pub fn configured(service: impl TextGenerationService + 'static) -> Self {
        StrategyModel::Configured(Arc::new(service))
    }

    /// Build the Gemini client when an API key is present.
    pub fn from_config(config: &Config) -> Self {
        match &config.gemini_api_key {
            Some(api_key) => {
                tracing::info!("Text provider: Gemini (model: {})", config.gemini_model);
                StrategyModel::configured(
                    GeminiTextClient::new(api_key.clone(), config.gemini_model.clone())
                        .with_base_url(config.gemini_base_url.clone()),
                )
            }
            None => {
                tracing::warn!("GEMINI_API_KEY not set; AI generation is disabled");
                StrategyModel::Unconfigured
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, StrategyModel::Configured(_))
    }
}

impl std::fmt::Debug for StrategyModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyModel::Configured(_) => f.write_str("StrategyModel::Configured"),
            StrategyModel::Unconfigured => f.write_str("StrategyModel::Unconfigured"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_model_unconfigured_without_key() {
        let model = StrategyModel::from_config(&config_with(&[]));
        assert!(!model.is_configured());
    }

    #[test]
    fn test_model_configured_with_key() {
        let model = StrategyModel::from_config(&config_with(&[("GEMINI_API_KEY", "k")]));
        assert!(model.is_configured());
    }
}
