use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::generation::{
    GenerateRequest, GenerateResponse, JobStatusResponse, RecipeResponse,
};
use crate::services::generation::ServiceError;

use super::error::ApiError;

/// POST /api/v1/recipes/generation — Start generating a recipe from a photo.
pub async fn start_recipe_generation(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<GenerateResponse>), ApiError> {
    let image = request.image.ok_or(ServiceError::MissingImage)?;
    let job_id = state.generation.submit(&image)?;

    Ok((StatusCode::ACCEPTED, Json(GenerateResponse { job_id })))
}

/// GET /api/v1/recipes/generation/{job_id} — Poll a generation job.
pub async fn get_generation_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let job_id = parse_job_id(&job_id)?;
    Ok(Json(state.generation.poll_status(job_id)?))
}

/// GET /api/v1/recipes/generation/{job_id}/result — Collect a finished recipe.
/// Succeeds once per job; unfinished jobs answer 404 and stay pollable.
pub async fn get_generated_recipe(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let job_id = parse_job_id(&job_id)?;
    let recipe = state.generation.fetch_completed_result(job_id)?;
    Ok(Json(RecipeResponse { recipe }))
}

/// Ids that are not UUIDs can never name a job, so they answer like unknown ids.
fn parse_job_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("Job {raw} not found")))
}
