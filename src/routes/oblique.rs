//! Axum handlers for the strategy generation endpoint.

use axum::{body::Bytes, extract::State, Json};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::models::{GenerationRequest, StrategyResponse};
use crate::state::AppState;
use crate::Result;

/// GET /api/oblique
///
/// Kept for older clients: one concise strategy, no moods.
pub async fn handle_get(State(state): State<AppState>) -> Result<Json<StrategyResponse>> {
    generate(&state, GenerationRequest::default()).await
}

/// POST /api/oblique
///
/// A body that does not parse as generation options is treated as the defaults.
pub async fn handle_post(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StrategyResponse>> {
    let request = match serde_json::from_slice::<GenerationRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(
                "Error parsing request, discarding supplied options and using defaults: {}",
                e
            );
            GenerationRequest::default()
        }
    };

    generate(&state, request).await
}

async fn generate(state: &AppState, request: GenerationRequest) -> Result<Json<StrategyResponse>> {
    let span = info_span!("oblique", request_id = %Uuid::new_v4(), count = request.count);

    async move {
        info!(
            "Generating strategies (length: {:?}, moods: {:?})",
            request.verbosity, request.moods
        );

        let mut rng = StdRng::from_entropy();
        let response = state.generator.generate(&request, &mut rng).await?;

        info!(
            "Returning {} strategies from {}",
            response.items.len(),
            response.source.as_str()
        );
        Ok(Json(StrategyResponse::from(response)))
    }
    .instrument(span)
    .await
}
