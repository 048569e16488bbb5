use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle phase of a recipe generation job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Processing,
    Finalizing,
    Completed,
    Error,
}

impl JobPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobPhase::Completed | JobPhase::Error)
    }
}

/// A recipe generation job tracked in the in-memory job store.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationJob {
    pub id: Uuid,
    pub phase: JobPhase,
    /// 0-100, never decreases while the job is alive.
    pub progress: u8,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GenerationJob {
    pub fn new(id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            phase: JobPhase::Processing,
            progress: 0,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a partial update into this job.
    ///
    /// Progress is clamped to 100 and never moves backwards. A result is only
    /// kept alongside `Completed` and an error only alongside `Error`, so the
    /// job is always in exactly one of: running, completed with result, failed.
    pub fn apply(&mut self, update: JobUpdate, now: DateTime<Utc>) {
        if let Some(phase) = update.phase {
            self.phase = phase;
        }
        if let Some(progress) = update.progress {
            self.progress = self.progress.max(progress.min(100));
        }
        if let Some(result) = update.result {
            self.result = Some(result);
        }
        if let Some(error) = update.error {
            self.error = Some(error);
        }

        match self.phase {
            JobPhase::Completed => self.error = None,
            JobPhase::Error => self.result = None,
            JobPhase::Processing | JobPhase::Finalizing => {
                self.result = None;
                self.error = None;
            }
        }
        self.updated_at = now;
    }
}

/// Typed partial update for a [`GenerationJob`]. Fields left as `None` are untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    pub phase: Option<JobPhase>,
    pub progress: Option<u8>,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl JobUpdate {
    pub fn progress(progress: u8) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }

    pub fn finalizing(progress: u8) -> Self {
        Self {
            phase: Some(JobPhase::Finalizing),
            progress: Some(progress),
            ..Self::default()
        }
    }

    pub fn completed(result: serde_json::Value) -> Self {
        Self {
            phase: Some(JobPhase::Completed),
            progress: Some(100),
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            phase: Some(JobPhase::Error),
            error: Some(error.into()),
            ..Self::default()
        }
    }
}
