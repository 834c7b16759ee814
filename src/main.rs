use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use seo_audit_hw::app_state::AppState;
use seo_audit_hw::config::AppConfig;
use seo_audit_hw::routes;
use seo_audit_hw::services::{backend::BackendClient, tracker::AnalysisTracker};

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

    tracing::info!("Initializing seo-audit-hw server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!("analysis_jobs_started_total", "Analysis jobs accepted by the backend");
    metrics::describe_counter!("analysis_jobs_completed_total", "Analysis jobs that reached completed");
    metrics::describe_counter!("analysis_jobs_failed_total", "Analysis jobs that reached failed");
    metrics::describe_counter!(
        "analysis_jobs_timed_out_total",
        "Analysis jobs without a terminal status before the poll deadline"
    );
    metrics::describe_counter!("analysis_polls_total", "Status fetches issued");
    metrics::describe_counter!("analysis_poll_errors_total", "Status fetches that failed transiently");
    metrics::describe_histogram!(
        "analysis_job_seconds",
        "Time from analysis start to the end of polling"
    );

    // Initialize audit backend client
    tracing::info!(base_url = %config.api_base_url, "Initializing audit backend client");
    let backend = Arc::new(
        BackendClient::new(&config.api_base_url, &config.api_token)
            .expect("Failed to initialize audit backend client"),
    );

    let analyses = AnalysisTracker::new(backend.clone(), config.poll_settings());
    let state = AppState::new(backend, analyses, config.max_selections);

    let app = routes::api_router(state).route(
        "/metrics",
        get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
    );

    tracing::info!("Starting seo-audit-hw on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
