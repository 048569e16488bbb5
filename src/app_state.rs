use std::sync::Arc;

use crate::services::{generation::GenerationService, job_store::JobStore, ollama::GenerationBackend};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub generation: GenerationService,
}

impl AppState {
    pub fn new(store: Arc<JobStore>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            generation: GenerationService::new(store, backend),
        }
    }

    pub fn jobs(&self) -> &Arc<JobStore> {
        self.generation.store()
    }
}
