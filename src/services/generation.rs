use base64::Engine;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::generation::JobStatusResponse;
use crate::models::job::JobPhase;

use super::job_store::{JobStore, JobStoreError};
use super::ollama::GenerationBackend;
use super::orchestrator::Orchestrator;

/// Entry point for callers: submit photos, poll jobs, collect recipes.
///
/// Holds no job state of its own; everything is read from the job store.
#[derive(Clone)]
pub struct GenerationService {
    store: Arc<JobStore>,
    orchestrator: Orchestrator,
}

impl GenerationService {
    pub fn new(store: Arc<JobStore>, backend: Arc<dyn GenerationBackend>) -> Self {
        let orchestrator = Orchestrator::new(store.clone(), backend);
        Self {
            store,
            orchestrator,
        }
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    /// Validate the image, register a job and start generating in the background.
    ///
    /// Returns as soon as the job exists; must be called inside a Tokio runtime.
    pub fn submit(&self, image: &str) -> Result<Uuid, ServiceError> {
        let image_base64 = normalize_image(image)?;

        let job_id = Uuid::new_v4();
        self.store.create(job_id)?;
        metrics::counter!("recipe_jobs_submitted_total").increment(1);
        tracing::info!(job_id = %job_id, image_bytes = image_base64.len(), "Recipe generation job accepted");

        let orchestrator = self.orchestrator.clone();
        tokio::spawn(async move { orchestrator.run(job_id, image_base64).await });

        Ok(job_id)
    }

    pub fn poll_status(&self, job_id: Uuid) -> Result<JobStatusResponse, ServiceError> {
        self.store
            .get(job_id)
            .map(|job| JobStatusResponse::from(&job))
            .ok_or(ServiceError::NotFound(job_id))
    }

    /// Hand out whatever result the job holds and forget the job.
    ///
    /// The result is `None` when the job has not completed; check the phase
    /// with [`Self::poll_status`] first, or use [`Self::fetch_completed_result`].
    pub fn fetch_result(&self, job_id: Uuid) -> Result<Option<serde_json::Value>, ServiceError> {
        let job = self.store.take(job_id).ok_or(ServiceError::NotFound(job_id))?;
        tracing::info!(job_id = %job_id, phase = ?job.phase, "Generation job result collected");
        Ok(job.result)
    }

    /// Like [`Self::fetch_result`], but leaves unfinished jobs untouched.
    pub fn fetch_completed_result(&self, job_id: Uuid) -> Result<serde_json::Value, ServiceError> {
        let job = self.store.take_completed(job_id)?;
        tracing::info!(job_id = %job_id, "Generated recipe collected");
        job.result.ok_or(ServiceError::NotFound(job_id))
    }
}

/// Accept raw base64 or a `data:<mime>;base64,` URL; return plain base64 of
/// a JPEG, PNG or WebP image.
pub fn normalize_image(raw: &str) -> Result<String, ServiceError> {
    let raw = raw.trim();
    let encoded = match raw.strip_prefix("data:") {
        Some(data_url) => data_url
            .split_once(',')
            .map(|(_, payload)| payload)
            .ok_or_else(|| ServiceError::InvalidImage("malformed data URL".to_string()))?,
        None => raw,
    };
    if encoded.is_empty() {
        return Err(ServiceError::MissingImage);
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| ServiceError::InvalidImage(e.to_string()))?;

    match image::guess_format(&bytes) {
        Ok(image::ImageFormat::Jpeg | image::ImageFormat::Png | image::ImageFormat::WebP) => {
            Ok(encoded.to_string())
        }
        _ => Err(ServiceError::UnsupportedImage),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("No image provided")]
    MissingImage,

    #[error("Image is not valid base64: {0}")]
    InvalidImage(String),

    #[error("Image must be JPEG, PNG or WebP")]
    UnsupportedImage,

    #[error("Job {0} not found")]
    NotFound(Uuid),

    #[error("Job {id} has not completed yet (phase: {phase:?})")]
    NotCompleted { id: Uuid, phase: JobPhase },

    #[error("Job store error: {0}")]
    Store(JobStoreError),
}

impl From<JobStoreError> for ServiceError {
    fn from(err: JobStoreError) -> Self {
        match err {
            JobStoreError::NotFound(id) => ServiceError::NotFound(id),
            JobStoreError::NotCompleted { id, phase } => ServiceError::NotCompleted { id, phase },
            other => ServiceError::Store(other),
        }
    }
}
