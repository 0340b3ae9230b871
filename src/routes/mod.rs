pub mod health;
pub mod oblique;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/oblique",
            get(oblique::handle_get).post(oblique::handle_post),
        )
        .with_state(state)
}
