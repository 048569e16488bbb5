use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::models::job::{GenerationJob, JobPhase, JobUpdate};

/// In-memory registry of generation jobs.
///
/// Each operation takes the map lock once and never across an `.await`, so
/// operations on the same id are serialized and a sweep can never interleave
/// with half of an update.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<Uuid, GenerationJob>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh job in the `processing` phase.
    pub fn create(&self, id: Uuid) -> Result<(), JobStoreError> {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        if jobs.contains_key(&id) {
            return Err(JobStoreError::AlreadyExists(id));
        }
        jobs.insert(id, GenerationJob::new(id, Utc::now()));
        Ok(())
    }

    /// Merge `update` into an existing job and return the merged snapshot.
    ///
    /// Never inserts: updating an id that was deleted or evicted fails.
    pub fn update(&self, id: Uuid, update: JobUpdate) -> Result<GenerationJob, JobStoreError> {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        let job = jobs.get_mut(&id).ok_or(JobStoreError::NotFound(id))?;
        job.apply(update, Utc::now());
        Ok(job.clone())
    }

    pub fn get(&self, id: Uuid) -> Option<GenerationJob> {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        jobs.get(&id).cloned()
    }

    pub fn delete(&self, id: Uuid) {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        jobs.remove(&id);
    }

    /// Remove and return a job in one step.
    pub fn take(&self, id: Uuid) -> Option<GenerationJob> {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        jobs.remove(&id)
    }

    /// Remove and return a job only if it has completed. Running or failed
    /// jobs are left in place.
    pub fn take_completed(&self, id: Uuid) -> Result<GenerationJob, JobStoreError> {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        let phase = jobs.get(&id).ok_or(JobStoreError::NotFound(id))?.phase;
        if phase != JobPhase::Completed {
            return Err(JobStoreError::NotCompleted { id, phase });
        }
        jobs.remove(&id).ok_or(JobStoreError::NotFound(id))
    }

    /// Evict every job created before `now - max_age`. Returns how many were removed.
    pub fn sweep(&self, now: DateTime<Utc>, max_age: Duration) -> usize {
        let cutoff = match chrono::Duration::from_std(max_age)
            .ok()
            .and_then(|age| now.checked_sub_signed(age))
        {
            Some(cutoff) => cutoff,
            None => return 0,
        };

        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        let before = jobs.len();
        jobs.retain(|_, job| job.created_at >= cutoff);
        before - jobs.len()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run [`JobStore::sweep`] every `every` for as long as the runtime lives.
pub fn spawn_sweeper(store: Arc<JobStore>, every: Duration, max_age: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = store.sweep(Utc::now(), max_age);
            if evicted > 0 {
                metrics::counter!("recipe_jobs_evicted_total").increment(evicted as u64);
                tracing::info!(evicted, remaining = store.len(), "Evicted stale generation jobs");
            } else {
                tracing::trace!(remaining = store.len(), "Job sweep found nothing to evict");
            }
        }
    })
}

#[derive(Debug, thiserror::Error)]
pub enum JobStoreError {
    #[error("Job {0} already exists")]
    AlreadyExists(Uuid),

    #[error("Job {0} not found")]
    NotFound(Uuid),

    #[error("Job {id} has not completed (phase: {phase:?})")]
    NotCompleted { id: Uuid, phase: JobPhase },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_then_get() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.create(id).unwrap();

        let job = store.get(id).unwrap();
        assert_eq!(job.id, id);
        assert_eq!(job.phase, JobPhase::Processing);
        assert_eq!(job.progress, 0);
        assert!(job.result.is_none());
        assert!(job.error.is_none());
    }

    #[test]
    fn test_create_duplicate_fails() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.create(id).unwrap();
        assert!(matches!(store.create(id), Err(JobStoreError::AlreadyExists(_))));
    }

    #[test]
    fn test_update_merges_fields() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.create(id).unwrap();
        let created_at = store.get(id).unwrap().created_at;

        store.update(id, JobUpdate::progress(30)).unwrap();
        let job = store.update(id, JobUpdate::finalizing(97)).unwrap();

        assert_eq!(job.phase, JobPhase::Finalizing);
        assert_eq!(job.progress, 97);
        assert_eq!(job.created_at, created_at);

        let job = store.update(id, JobUpdate::progress(50)).unwrap();
        assert_eq!(job.phase, JobPhase::Finalizing);
        assert_eq!(job.progress, 97);
    }

    #[test]
    fn test_update_missing_fails() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(
            store.update(id, JobUpdate::progress(5)),
            Err(JobStoreError::NotFound(missing)) if missing == id
        ));
        assert!(store.get(id).is_none());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.create(id).unwrap();
        store.delete(id);
        store.delete(id);
        assert!(store.get(id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_take_completed_leaves_running_jobs() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.create(id).unwrap();

        assert!(matches!(
            store.take_completed(id),
            Err(JobStoreError::NotCompleted { phase: JobPhase::Processing, .. })
        ));
        assert!(store.get(id).is_some());

        store.update(id, JobUpdate::completed(json!({"a": 1}))).unwrap();
        let job = store.take_completed(id).unwrap();
        assert_eq!(job.result, Some(json!({"a": 1})));
        assert!(matches!(store.take_completed(id), Err(JobStoreError::NotFound(_))));
    }

    #[test]
    fn test_sweep_removes_only_old_jobs() {
        let store = JobStore::new();
        let old = Uuid::new_v4();
        store.create(old).unwrap();
        let old_created = store.get(old).unwrap().created_at;

        let max_age = Duration::from_secs(3600);
        let now = old_created + chrono::Duration::seconds(3601);

        // Created "now" relative to the sweep clock, so it is young.
        let young = Uuid::new_v4();
        store.create(young).unwrap();
        {
            let mut jobs = store.jobs.write().unwrap();
            jobs.get_mut(&young).unwrap().created_at = now - chrono::Duration::seconds(10);
        }

        assert_eq!(store.sweep(now, max_age), 1);
        assert!(store.get(old).is_none());
        assert!(store.get(young).is_some());

        assert_eq!(store.sweep(old_created, max_age), 0);
        assert_eq!(store.sweep(now, Duration::MAX), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_on_interval() {
        let store = Arc::new(JobStore::new());
        let id = Uuid::new_v4();
        store.create(id).unwrap();

        let handle = spawn_sweeper(store.clone(), Duration::from_secs(60), Duration::ZERO);
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(store.get(id).is_none());
        handle.abort();
    }
}
