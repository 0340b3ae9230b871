//! Application wiring: configuration to generator to HTTP server.

use crate::ai::StrategyModel;
use crate::generator::{GeneratorSettings, StrategyGenerator};
use crate::models::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::strategies::CuratedStrategies;
use crate::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Owns the shared state for one server process.
pub struct App {
    state: AppState,
    bind_addr: SocketAddr,
}

impl App {
    /// Build the generator from configuration. A missing API key leaves the
    /// model unconfigured rather than failing startup.
    pub fn from_config(config: &Config) -> Result<Self> {
        let curated = Arc::new(CuratedStrategies::builtin()?);
        info!("Loaded {} curated strategies", curated.len());

        let generator = StrategyGenerator::new(
            StrategyModel::from_config(config),
            curated,
            GeneratorSettings::from(config),
        );
        info!(
            "Fallback policy: {:?}, timeout: {:?}, max count: {}",
            config.fallback_policy, config.request_timeout, config.max_count
        );

        Ok(Self::with_state(AppState::new(generator), config.bind_addr))
    }

    /// Build an app around an already-constructed state, e.g. one holding mocks.
    pub fn with_state(state: AppState, bind_addr: SocketAddr) -> Self {
        Self { state, bind_addr }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }

    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.bind_addr).await?;
        info!("Listening on {}", listener.local_addr()?);
        self.serve_on(listener).await
    }

    /// Serve on a listener the caller already bound.
    pub async fn serve_on(self, listener: tokio::net::TcpListener) -> Result<()> {
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}
