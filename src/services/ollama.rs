use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use super::prompt::RECIPE_GENERATION_PROMPT;

/// Raw response body of a streaming generation, chunked however the network delivers it.
pub type ChunkStream = BoxStream<'static, Result<Bytes, UpstreamError>>;

/// A vision-language model that streams generated text for an image.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Open a streaming generation for a base64-encoded image.
    async fn stream_generation(&self, image_base64: &str) -> Result<ChunkStream, UpstreamError>;
}

/// Client for an Ollama server's `/api/generate` endpoint.
pub struct OllamaClient {
    http: Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: [&'a str; 1],
    stream: bool,
}

impl OllamaClient {
    /// No request timeout is configured: generation may legitimately run for minutes.
    pub fn new(base_url: &str, model: &str) -> Result<Self, UpstreamError> {
        let http = Client::builder().build().map_err(UpstreamError::Http)?;
        Ok(Self {
            http,
            endpoint: format!("{}/api/generate", base_url.trim_end_matches('/')),
            model: model.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationBackend for OllamaClient {
    async fn stream_generation(&self, image_base64: &str) -> Result<ChunkStream, UpstreamError> {
        let request_body = GenerateRequest {
            model: &self.model,
            prompt: RECIPE_GENERATION_PROMPT,
            images: [image_base64],
            stream: true,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, "text/event-stream")
            .json(&request_body)
            .send()
            .await
            .map_err(UpstreamError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(UpstreamError::Http))
            .boxed())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("HTTP request to model server failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}
