use clap::Parser;
use seo_audit_hw::{
    config::AppConfig,
    services::{
        backend::BackendClient,
        poller::{JobPoller, PollOutcome, PollerError, StartOptions},
    },
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const EXIT_FAILED: u8 = 1;
const EXIT_TIMED_OUT: u8 = 2;
const EXIT_START_REJECTED: u8 = 3;
const EXIT_USAGE: u8 = 64;

#[derive(Debug, Parser)]
#[command(name = "analyze")]
#[command(about = "Run one website analysis to completion")]
struct Cli {
    /// Client whose website is analysed
    client_id: String,

    /// Re-run the analysis even if a report already exists
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version go to stdout and are not usage errors.
            let code = if e.use_stderr() { EXIT_USAGE } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };
    let client_id = cli.client_id;

    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration");
    let backend = BackendClient::new(&config.api_base_url, &config.api_token)
        .expect("Failed to initialize audit backend client");
    let poller = JobPoller::new(Arc::new(backend), config.poll_settings());

    let handle = match poller.start(&client_id, StartOptions { force_restart: cli.force }).await {
        Ok(handle) => handle,
        Err(PollerError::StartRejected(reason)) => {
            tracing::error!(client_id = %client_id, reason = %reason, "Backend refused to start analysis");
            return ExitCode::from(EXIT_START_REJECTED);
        }
        Err(e) => {
            tracing::error!(client_id = %client_id, error = %e, "Could not start analysis");
            return ExitCode::from(EXIT_START_REJECTED);
        }
    };

    // Report each snapshot as it arrives.
    let mut updates = handle.updates();
    let progress = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            if let Some(result) = updates.borrow_and_update().as_ref() {
                tracing::info!(status = %result.status, "Analysis status");
            }
        }
    });

    let outcome = handle.wait().await;
    progress.abort();

    match outcome {
        PollOutcome::Completed(result) => {
            for (priority, recommendations) in result.recommendations_by_priority() {
                for r in recommendations {
                    tracing::info!(
                        priority = %priority,
                        category = %r.category,
                        title = %r.title,
                        action = %r.action,
                        "Recommendation"
                    );
                }
            }
            ExitCode::SUCCESS
        }
        PollOutcome::Failed(_) => ExitCode::from(EXIT_FAILED),
        PollOutcome::TimedOut { .. } | PollOutcome::Cancelled => ExitCode::from(EXIT_TIMED_OUT),
    }
}
