use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::models::job::JobUpdate;
use crate::models::recipe::Recipe;

use super::fences::strip_code_fences;
use super::fragment::{decode_fragment, FragmentError};
use super::framer::{FrameError, LineFramer};
use super::job_store::{JobStore, JobStoreError};
use super::ollama::{GenerationBackend, UpstreamError};
use super::progress::{ProgressTracker, BASELINE_PROGRESS, FINALIZING_PROGRESS};

/// Drives generation jobs from the upstream stream to a terminal phase.
///
/// The job store is the only channel back to callers: every state change is
/// an `update` keyed by job id.
#[derive(Clone)]
pub struct Orchestrator {
    store: Arc<JobStore>,
    backend: Arc<dyn GenerationBackend>,
}

/// Generated text of one in-flight job.
struct Accumulator {
    text: String,
    chars: usize,
    progress: ProgressTracker,
}

impl Orchestrator {
    pub fn new(store: Arc<JobStore>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self { store, backend }
    }

    /// Run one job to `completed` or `error`. Failures are recorded on the job,
    /// never returned: nobody is waiting on this future.
    pub async fn run(&self, job_id: Uuid, image_base64: String) {
        let start = Instant::now();
        metrics::gauge!("recipe_jobs_active").increment(1.0);
        tracing::info!(job_id = %job_id, "Starting recipe generation");

        match self.generate(job_id, &image_base64).await {
            Ok(recipe) => match self.store.update(job_id, JobUpdate::completed(recipe)) {
                Ok(_) => {
                    metrics::counter!("recipe_jobs_completed_total").increment(1);
                    tracing::info!(
                        job_id = %job_id,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Recipe generation completed"
                    );
                }
                Err(e) => tracing::error!(job_id = %job_id, error = %e, "Job disappeared before completion"),
            },
            Err(GenerationError::Store(e)) => {
                // Evicted or consumed mid-run; there is nothing left to report to.
                tracing::error!(job_id = %job_id, error = %e, "Job store rejected update, abandoning generation");
            }
            Err(e) => {
                metrics::counter!("recipe_jobs_failed_total").increment(1);
                tracing::warn!(
                    job_id = %job_id,
                    duration_ms = start.elapsed().as_millis() as u64,
                    error = %e,
                    "Recipe generation failed"
                );
                if let Err(store_err) = self.store.update(job_id, JobUpdate::failed(e.to_string())) {
                    tracing::error!(job_id = %job_id, error = %store_err, "Could not record job failure");
                }
            }
        }

        metrics::histogram!("recipe_generation_seconds").record(start.elapsed().as_secs_f64());
        metrics::gauge!("recipe_jobs_active").decrement(1.0);
    }

    async fn generate(
        &self,
        job_id: Uuid,
        image_base64: &str,
    ) -> Result<serde_json::Value, GenerationError> {
        self.store.update(job_id, JobUpdate::progress(BASELINE_PROGRESS))?;

        let text = self.stream_text(job_id, image_base64).await?;

        self.store.update(job_id, JobUpdate::finalizing(FINALIZING_PROGRESS))?;
        tracing::debug!(job_id = %job_id, chars = text.len(), phase = "finalizing", "Parsing generated recipe");

        let recipe = parse_generated_recipe(&text)?;
        check_recipe_schema(job_id, &recipe);
        Ok(recipe)
    }

    /// Read the upstream body to its end and return the reassembled text.
    async fn stream_text(&self, job_id: Uuid, image_base64: &str) -> Result<String, GenerationError> {
        let mut chunks = self.backend.stream_generation(image_base64).await?;
        let mut framer = LineFramer::new();
        let mut acc = Accumulator {
            text: String::new(),
            chars: 0,
            progress: ProgressTracker::new(),
        };

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            for line in framer.push(&chunk) {
                self.absorb_line(job_id, &line?, &mut acc)?;
            }
        }
        for tail in framer.finish() {
            self.absorb_line(job_id, &tail?, &mut acc)?;
        }

        tracing::debug!(job_id = %job_id, chars = acc.chars, "Upstream stream ended");
        Ok(acc.text)
    }

    fn absorb_line(&self, job_id: Uuid, line: &str, acc: &mut Accumulator) -> Result<(), GenerationError> {
        let fragment = decode_fragment(line)?;
        if fragment.done {
            tracing::debug!(job_id = %job_id, "Upstream reported generation done");
        }
        if fragment.text.is_empty() {
            return Ok(());
        }

        acc.chars += fragment.text.chars().count();
        acc.text.push_str(&fragment.text);

        if let Some(progress) = acc.progress.advance(acc.chars) {
            self.store.update(job_id, JobUpdate::progress(progress))?;
            tracing::trace!(job_id = %job_id, progress, chars = acc.chars, "Generation progress");
        }
        Ok(())
    }
}

/// Strip fences from the accumulated text and parse it as one JSON object.
pub fn parse_generated_recipe(text: &str) -> Result<serde_json::Value, GenerationError> {
    let payload = strip_code_fences(text);
    let value: serde_json::Value =
        serde_json::from_str(&payload).map_err(|source| GenerationError::Parse {
            source,
            raw: payload.clone(),
        })?;

    if !value.is_object() {
        return Err(GenerationError::NotAnObject { raw: payload });
    }
    Ok(value)
}

/// The job completes with whatever object the model produced; deviations
/// from the recipe schema are only reported.
fn check_recipe_schema(job_id: Uuid, value: &serde_json::Value) {
    let issues = match serde_json::from_value::<Recipe>(value.clone()) {
        Ok(recipe) => recipe.schema_issues(),
        Err(e) => vec![e.to_string()],
    };

    if !issues.is_empty() {
        metrics::counter!("recipe_schema_mismatches_total").increment(1);
        tracing::warn!(job_id = %job_id, issues = ?issues, "Generated recipe does not match schema");
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Framing(#[from] FrameError),

    #[error(transparent)]
    Fragment(#[from] FragmentError),

    #[error("Generated recipe is not valid JSON ({source}); raw output: {raw}")]
    Parse {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    #[error("Generated recipe is not a JSON object; raw output: {raw}")]
    NotAnObject { raw: String },

    #[error(transparent)]
    Store(#[from] JobStoreError),
}
