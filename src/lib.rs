//! Recipe generation service
//!
//! Turns a food photo into a structured recipe by streaming a vision-language
//! model's output in a background job that callers poll for progress.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
