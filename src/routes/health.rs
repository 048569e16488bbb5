use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub jobs: JobsHealth,
}

#[derive(Serialize)]
pub struct JobsHealth {
    pub status: String,
    pub tracked: usize,
}

/// GET /health — liveness plus the number of jobs held in memory.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            jobs: JobsHealth {
                status: "ok".to_string(),
                tracked: state.jobs().len(),
            },
        },
    })
}
