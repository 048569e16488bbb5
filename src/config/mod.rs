use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:6000")
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of the Ollama server (e.g., "http://localhost:11434")
    pub ollama_url: String,

    /// Vision-language model used for generation
    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,

    /// Jobs older than this are evicted, finished or not
    #[serde(default = "default_job_max_age_secs")]
    pub job_max_age_secs: u64,

    /// How often the eviction sweep runs
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Maximum accepted request body, base64 image included
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:6000".to_string()
}

fn default_ollama_model() -> String {
    "llava:7b".to_string()
}

fn default_job_max_age_secs() -> u64 {
    60 * 60
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn job_max_age(&self) -> Duration {
        Duration::from_secs(self.job_max_age_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}
