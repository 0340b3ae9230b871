//! Strategy generation: one prompt per requested item, model calls raced
//! against a timeout, cleanup/validation, and aggregation under the configured
//! [`FallbackPolicy`].

use crate::ai::{StrategyModel, TextGenerationService};
use crate::models::{
    Config, FallbackPolicy, GeneratedItem, GenerationRequest, GenerationResponse, StrategySource,
};
use crate::strategies::CuratedStrategies;
use crate::{prompts, Error, Result};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Tunables for [`StrategyGenerator`], usually taken from [`Config`].
#[derive(Debug, Clone, Copy)]
pub struct GeneratorSettings {
    pub policy: FallbackPolicy,
    pub request_timeout: Duration,
    pub max_count: u32,
}

impl From<&Config> for GeneratorSettings {
    fn from(config: &Config) -> Self {
        Self {
            policy: config.fallback_policy,
            request_timeout: config.request_timeout,
            max_count: config.max_count,
        }
    }
}

pub struct StrategyGenerator {
    model: StrategyModel,
    curated: Arc<CuratedStrategies>,
    settings: GeneratorSettings,
}

impl StrategyGenerator {
    pub fn new(
        model: StrategyModel,
        curated: Arc<CuratedStrategies>,
        settings: GeneratorSettings,
    ) -> Self {
        Self {
            model,
            curated,
            settings,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_configured()
    }

    /// Produce strategies for `request`.
    ///
    /// `rng` drives starter selection and curated sampling so callers can
    /// seed it for reproducible output.
    pub async fn generate<R: Rng + ?Sized>(
        &self,
        request: &GenerationRequest,
        rng: &mut R,
    ) -> Result<GenerationResponse> {
        let count = self.validate_count(request.count)?;

        match self.generate_validated(request, count, rng).await {
            Err(e) if self.settings.policy == FallbackPolicy::Substitute => {
                error!("Error generating oblique strategies: {}", e);
                Ok(self.curated_response(count, StrategySource::Fallback, rng))
            }
            outcome => outcome,
        }
    }

    fn validate_count(&self, count: i64) -> Result<usize> {
        if count <= 0 {
            return Err(Error::BadRequest("Invalid count specified".to_string()));
        }

        if count > i64::from(self.settings.max_count) {
            return Err(Error::BadRequest(format!(
                "Invalid count specified: at most {} strategies per request (set by OBLIQUE_MAX_COUNT)",
                self.settings.max_count
            )));
        }

        usize::try_from(count).map_err(|_| Error::BadRequest("Invalid count specified".to_string()))
    }

    async fn generate_validated<R: Rng + ?Sized>(
        &self,
        request: &GenerationRequest,
        count: usize,
        rng: &mut R,
    ) -> Result<GenerationResponse> {
        let model = match &self.model {
            StrategyModel::Configured(model) => Arc::clone(model),
            StrategyModel::Unconfigured => {
                return match self.settings.policy {
                    FallbackPolicy::Reject => Err(Error::NotConfigured),
                    FallbackPolicy::Substitute => {
                        info!("AI generation disabled; serving {} curated strategies", count);
                        Ok(self.curated_response(count, StrategySource::Authentic, rng))
                    }
                };
            }
        };

        let item_prompts: Vec<String> = (0..count)
            .map(|_| prompts::strategy_prompt(request.verbosity, &request.moods, rng))
            .collect();

        let outcomes = self.run_items(model, item_prompts).await;
        self.assemble(outcomes, rng)
    }

    /// Run every prompt concurrently. Each slot holds its own outcome; a
    /// failure in one never affects the others.
    async fn run_items(
        &self,
        model: Arc<dyn TextGenerationService>,
        item_prompts: Vec<String>,
    ) -> Vec<Result<String>> {
        let count = item_prompts.len();
        let timeout = self.settings.request_timeout;
        let mut tasks = JoinSet::new();

        for (index, prompt) in item_prompts.into_iter().enumerate() {
            let model = Arc::clone(&model);
            tasks.spawn(async move {
                debug!("Strategy {} prompt: {}", index + 1, prompt);
                // Dropping the call future on timeout cancels the request.
                let call = tokio::time::timeout(timeout, model.generate_text(&prompt));
                let outcome = match call.await {
                    Ok(Ok(raw)) => prompts::validate_strategy(&raw),
                    Ok(Err(e)) => Err(e),
                    Err(_) => Err(Error::UpstreamTimeout(timeout)),
                };
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<Result<String>>> = (0..count).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    if let Err(e) = &outcome {
                        warn!("Strategy {} failed: {}", index + 1, e);
                    }
                    slots[index] = Some(outcome);
                }
                Err(e) => error!("Strategy task did not complete: {}", e),
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(Error::Generic("Strategy task did not complete".to_string()))
                })
            })
            .collect()
    }

    fn assemble<R: Rng + ?Sized>(
        &self,
        outcomes: Vec<Result<String>>,
        rng: &mut R,
    ) -> Result<GenerationResponse> {
        let count = outcomes.len();
        let succeeded = outcomes.iter().filter(|outcome| outcome.is_ok()).count();

        if succeeded == 0 {
            error!("All {} strategy generations failed", count);
            return match self.settings.policy {
                FallbackPolicy::Reject => Err(Error::UpstreamExhausted),
                FallbackPolicy::Substitute => {
                    Ok(self.curated_response(count, StrategySource::Fallback, rng))
                }
            };
        }

        let items: Vec<GeneratedItem> = match self.settings.policy {
            FallbackPolicy::Reject => outcomes
                .into_iter()
                .filter_map(|outcome| outcome.ok())
                .map(GeneratedItem::ai)
                .collect(),
            FallbackPolicy::Substitute => outcomes
                .into_iter()
                .map(|outcome| match outcome {
                    Ok(text) => GeneratedItem::ai(text),
                    Err(_) => GeneratedItem::curated(self.curated.choose(rng)),
                })
                .collect(),
        };

        info!(
            "Generated {} of {} strategies ({} from the model)",
            items.len(),
            count,
            succeeded
        );

        Ok(GenerationResponse {
            items,
            source: StrategySource::Gemini,
        })
    }

    fn curated_response<R: Rng + ?Sized>(
        &self,
        count: usize,
        source: StrategySource,
        rng: &mut R,
    ) -> GenerationResponse {
        GenerationResponse {
            items: self
                .curated
                .sample(count, rng)
                .into_iter()
                .map(GeneratedItem::curated)
                .collect(),
            source,
        }
    }
}
