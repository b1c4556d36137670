use axum::routing::{get, post};
use axum::Router;

use crate::handler::{evaluate_handler, health_handler};
use crate::state::AppState;

/// Build the HTTP router with all routes wired to the shared state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/evaluate", post(evaluate_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}
