//! Test helper utilities: scripted model backends and job polling

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use futures::channel::mpsc;
use futures::StreamExt;
use recipe_gen::models::generation::JobStatusResponse;
use recipe_gen::models::job::JobPhase;
use recipe_gen::services::generation::GenerationService;
use recipe_gen::services::job_store::JobStore;
use recipe_gen::services::ollama::{ChunkStream, GenerationBackend, UpstreamError};
use reqwest::StatusCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Replays a fixed list of body chunks for every generation request.
pub struct ScriptedBackend {
    chunks: Vec<Vec<u8>>,
    fail_after: Option<usize>,
}

impl ScriptedBackend {
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks,
            fail_after: None,
        }
    }

    pub fn from_lines(lines: &[&str]) -> Self {
        let body: String = lines.iter().map(|l| format!("{l}\n")).collect();
        Self::new(vec![body.into_bytes()])
    }

    /// Drop the connection after `n` chunks were delivered.
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn stream_generation(&self, _image_base64: &str) -> Result<ChunkStream, UpstreamError> {
        let mut items: Vec<Result<Bytes, UpstreamError>> = self
            .chunks
            .iter()
            .take(self.fail_after.unwrap_or(usize::MAX))
            .map(|c| Ok(Bytes::from(c.clone())))
            .collect();
        if self.fail_after.is_some() {
            items.push(Err(UpstreamError::Status {
                status: StatusCode::BAD_GATEWAY,
                body: "connection reset by model server".to_string(),
            }));
        }
        Ok(futures::stream::iter(items).boxed())
    }
}

/// Refuses every request, like a model server that is down.
pub struct UnreachableBackend;

#[async_trait]
impl GenerationBackend for UnreachableBackend {
    async fn stream_generation(&self, _image_base64: &str) -> Result<ChunkStream, UpstreamError> {
        Err(UpstreamError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "ollama is not running".to_string(),
        })
    }
}

/// Streams whatever the test pushes through the returned sender, so the test
/// controls exactly when each chunk arrives.
pub struct ChannelBackend {
    receiver: Mutex<Option<mpsc::UnboundedReceiver<Result<Bytes, UpstreamError>>>>,
}

impl ChannelBackend {
    pub fn new() -> (Self, mpsc::UnboundedSender<Result<Bytes, UpstreamError>>) {
        let (tx, rx) = mpsc::unbounded();
        (
            Self {
                receiver: Mutex::new(Some(rx)),
            },
            tx,
        )
    }
}

#[async_trait]
impl GenerationBackend for ChannelBackend {
    async fn stream_generation(&self, _image_base64: &str) -> Result<ChunkStream, UpstreamError> {
        let rx = self
            .receiver
            .lock()
            .unwrap()
            .take()
            .expect("ChannelBackend serves a single generation");
        Ok(rx.boxed())
    }
}

pub fn service_with(backend: impl GenerationBackend + 'static) -> GenerationService {
    GenerationService::new(Arc::new(JobStore::new()), Arc::new(backend))
}

/// Poll until the job reaches `completed` or `error`.
pub async fn wait_for_terminal(service: &GenerationService, job_id: Uuid) -> JobStatusResponse {
    wait_until(service, job_id, |s| s.phase.is_terminal()).await
}

/// Poll until `condition` holds for the job's status.
pub async fn wait_until(
    service: &GenerationService,
    job_id: Uuid,
    condition: impl Fn(&JobStatusResponse) -> bool,
) -> JobStatusResponse {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let status = service.poll_status(job_id).expect("job should exist");
            if condition(&status) {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("job did not reach the expected state in time")
}

pub fn is_phase(phase: JobPhase) -> impl Fn(&JobStatusResponse) -> bool {
    move |status| status.phase == phase
}
