use std::sync::Arc;

use crate::generator::StrategyGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<StrategyGenerator>,
}

impl AppState {
    pub fn new(generator: StrategyGenerator) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }
}
