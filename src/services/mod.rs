pub mod fences;
pub mod fragment;
pub mod framer;
pub mod generation;
pub mod job_store;
pub mod ollama;
pub mod orchestrator;
pub mod progress;
pub mod prompt;
