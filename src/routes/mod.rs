pub mod error;
pub mod health;
pub mod metrics;
pub mod recipes;

use axum::routing::{get, post};
use axum::Router;

use crate::app_state::AppState;

/// Health check plus the recipe generation job API.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/v1/recipes/generation",
            post(recipes::start_recipe_generation),
        )
        .route(
            "/api/v1/recipes/generation/{job_id}",
            get(recipes::get_generation_status),
        )
        .route(
            "/api/v1/recipes/generation/{job_id}/result",
            get(recipes::get_generated_recipe),
        )
        .with_state(state)
}
