use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use recipe_gen::app_state::AppState;
use recipe_gen::config::AppConfig;
use recipe_gen::routes;
use recipe_gen::services::{
    job_store::{self, JobStore},
    ollama::OllamaClient,
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing recipe-gen server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!(
        "recipe_jobs_submitted_total",
        "Total recipe generation jobs submitted"
    );
    metrics::describe_counter!(
        "recipe_jobs_completed_total",
        "Total recipe generation jobs completed"
    );
    metrics::describe_counter!(
        "recipe_jobs_failed_total",
        "Total recipe generation jobs that failed"
    );
    metrics::describe_counter!(
        "recipe_jobs_evicted_total",
        "Total jobs removed by the eviction sweep"
    );
    metrics::describe_counter!(
        "recipe_schema_mismatches_total",
        "Generated recipes that deviate from the recipe schema"
    );
    metrics::describe_gauge!(
        "recipe_jobs_active",
        "Generation jobs currently streaming from the model"
    );
    metrics::describe_histogram!(
        "recipe_generation_seconds",
        "Time from job start to completion or failure"
    );

    // Initialize the model client
    tracing::info!(url = %config.ollama_url, model = %config.ollama_model, "Initializing Ollama client");
    let backend = OllamaClient::new(&config.ollama_url, &config.ollama_model)
        .expect("Failed to initialize Ollama client");

    // Job store lives for the whole process; the sweeper bounds its size
    let store = Arc::new(JobStore::new());
    let _sweeper = job_store::spawn_sweeper(
        store.clone(),
        config.sweep_interval(),
        config.job_max_age(),
    );
    tracing::info!(
        max_age_secs = config.job_max_age_secs,
        interval_secs = config.sweep_interval_secs,
        "Job eviction sweep started"
    );

    // Create shared application state
    let state = AppState::new(store, Arc::new(backend));

    // Build API routes
    let app = routes::api_routes(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes));

    tracing::info!("Starting recipe-gen on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
