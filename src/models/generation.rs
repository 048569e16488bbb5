use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::job::{GenerationJob, JobPhase};

/// Request to start generating a recipe from a food photo.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Base64 image, optionally as a `data:image/...;base64,` URL.
    #[serde(default)]
    pub image: Option<String>,
}

/// Response after a generation job was accepted.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub job_id: Uuid,
}

/// Snapshot of a job returned to pollers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub phase: JobPhase,
    pub progress: u8,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&GenerationJob> for JobStatusResponse {
    fn from(job: &GenerationJob) -> Self {
        Self {
            job_id: job.id,
            phase: job.phase,
            progress: job.progress,
            error: job.error.clone(),
            created_at: job.created_at,
        }
    }
}

/// The generated recipe, handed out once.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub recipe: serde_json::Value,
}
