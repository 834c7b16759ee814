//! Poll-until-terminal driver for website analysis jobs.
//!
//! A [`JobPoller`] owns at most one polling loop. `start` sends the start
//! request and, once accepted, spawns a task that fetches the job status on
//! a fixed interval until the backend reports `completed` or `failed`, the
//! overall timeout elapses, or the loop is cancelled. Each fetch is awaited
//! before the next interval begins, and the interval and timeout are raced
//! inside the same task so every exit path drops both.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::models::analysis::{AnalysisResult, JobStatus};
use crate::services::backend::{AnalysisBackend, BackendError};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);

/// Cadence and overall deadline of a polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartOptions {
    /// Cancel an active loop instead of rejecting, and ask the backend to
    /// re-run the analysis.
    pub force_restart: bool,
}

/// How a polling loop ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PollOutcome {
    Completed(AnalysisResult),
    Failed(AnalysisResult),
    /// No terminal status before the deadline.
    TimedOut { last: Option<AnalysisResult> },
    Cancelled,
}

impl PollOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            PollOutcome::Completed(_) => "completed",
            PollOutcome::Failed(_) => "failed",
            PollOutcome::TimedOut { .. } => "timed_out",
            PollOutcome::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PollerState {
    Idle,
    Polling { job_key: String },
}

/// Result of a single status fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum PollTick {
    Status(AnalysisResult),
    /// The backend answered without an analysis snapshot.
    NoAnalysis,
    /// Transport or decode failure; logged and retried on the next tick.
    TransientError,
}

/// Invoked once per job run that ends in `completed`.
pub type CompletionCallback = Arc<dyn Fn(&str, &AnalysisResult) + Send + Sync>;

/// Caller side of a started polling loop.
pub struct PollHandle {
    job_key: String,
    updates: watch::Receiver<Option<AnalysisResult>>,
    outcome: oneshot::Receiver<PollOutcome>,
}

impl PollHandle {
    pub fn job_key(&self) -> &str {
        &self.job_key
    }

    /// Status snapshots in the order their responses arrived.
    pub fn updates(&self) -> watch::Receiver<Option<AnalysisResult>> {
        self.updates.clone()
    }

    /// Wait for the loop to stop.
    pub async fn wait(self) -> PollOutcome {
        self.outcome.await.unwrap_or(PollOutcome::Cancelled)
    }
}

struct ActivePoll {
    job_key: String,
    stop: CancellationToken,
    task: JoinHandle<()>,
}

impl ActivePoll {
    fn is_running(&self) -> bool {
        !self.stop.is_cancelled()
    }
}

/// Drives one analysis job at a time from start to a terminal status.
pub struct JobPoller {
    backend: Arc<dyn AnalysisBackend>,
    settings: PollSettings,
    on_complete: Option<CompletionCallback>,
    starting: Mutex<()>,
    active: Mutex<Option<ActivePoll>>,
    latest: Arc<watch::Sender<Option<AnalysisResult>>>,
    last_outcome: Arc<watch::Sender<Option<PollOutcome>>>,
}

impl JobPoller {
    pub fn new(backend: Arc<dyn AnalysisBackend>, settings: PollSettings) -> Self {
        Self {
            backend,
            settings,
            on_complete: None,
            starting: Mutex::new(()),
            active: Mutex::new(None),
            latest: Arc::new(watch::Sender::new(None)),
            last_outcome: Arc::new(watch::Sender::new(None)),
        }
    }

    pub fn on_complete(mut self, callback: impl Fn(&str, &AnalysisResult) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(callback));
        self
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    pub async fn state(&self) -> PollerState {
        match self.active.lock().await.as_ref() {
            Some(active) if active.is_running() => PollerState::Polling {
                job_key: active.job_key.clone(),
            },
            _ => PollerState::Idle,
        }
    }

    /// Latest status snapshot of the current or most recent job.
    pub fn latest(&self) -> Option<AnalysisResult> {
        self.latest.borrow().clone()
    }

    pub fn last_outcome(&self) -> Option<PollOutcome> {
        self.last_outcome.borrow().clone()
    }

    /// Send the start request and begin polling.
    ///
    /// While a loop is active this fails with [`PollerError::AlreadyPolling`]
    /// unless `force_restart` is set, in which case the previous loop is
    /// cancelled and joined first. A rejected start leaves the poller idle.
    pub async fn start(&self, job_key: &str, options: StartOptions) -> Result<PollHandle, PollerError> {
        // One start at a time. `active` is never held across the start request.
        let _starting = self.starting.lock().await;

        let previous = {
            let mut active = self.active.lock().await;
            if let Some(current) = active.as_ref().filter(|a| a.is_running()) {
                if !options.force_restart {
                    return Err(PollerError::AlreadyPolling(current.job_key.clone()));
                }
                tracing::info!(
                    job_key = %current.job_key,
                    "Force restart requested, cancelling active poll"
                );
            }
            active.take()
        };
        if let Some(previous) = previous {
            previous.stop.cancel();
            if let Err(e) = previous.task.await {
                tracing::error!(job_key = %previous.job_key, error = %e, "Poll task ended abnormally");
            }
        }

        self.backend
            .start_analysis(job_key, options.force_restart)
            .await
            .map_err(|e| match e {
                BackendError::Rejected { message, .. } => PollerError::StartRejected(message),
                other => PollerError::Backend(other),
            })
            .inspect_err(|e| tracing::warn!(job_key, error = %e, "Analysis start failed"))?;

        metrics::counter!("analysis_jobs_started_total").increment(1);
        tracing::info!(
            job_key,
            interval_secs = self.settings.interval.as_secs_f64(),
            timeout_secs = self.settings.timeout.as_secs_f64(),
            "Analysis started, polling for status"
        );

        self.latest.send_replace(None);
        let updates = self.latest.subscribe();
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let stop = CancellationToken::new();

        let task = tokio::spawn(drive(
            Arc::clone(&self.backend),
            job_key.to_string(),
            self.settings,
            stop.clone(),
            Arc::clone(&self.latest),
            Arc::clone(&self.last_outcome),
            self.on_complete.clone(),
            outcome_tx,
        ));

        *self.active.lock().await = Some(ActivePoll {
            job_key: job_key.to_string(),
            stop,
            task,
        });

        Ok(PollHandle {
            job_key: job_key.to_string(),
            updates,
            outcome: outcome_rx,
        })
    }

    /// Fetch the status once without touching the loop.
    pub async fn poll_once(&self, job_key: &str) -> PollTick {
        poll_once(self.backend.as_ref(), job_key).await
    }

    /// Stop the active loop, if any, and wait for it to exit.
    /// Returns whether a loop was running.
    pub async fn cancel(&self) -> bool {
        let Some(active) = self.active.lock().await.take() else {
            return false;
        };
        let was_running = active.is_running();
        active.stop.cancel();
        if let Err(e) = active.task.await {
            tracing::error!(job_key = %active.job_key, error = %e, "Poll task ended abnormally");
        }
        was_running
    }
}

impl Drop for JobPoller {
    fn drop(&mut self) {
        if let Some(active) = self.active.get_mut() {
            active.stop.cancel();
        }
    }
}

/// Fetch the job status once. Failures are logged and reported as
/// [`PollTick::TransientError`]; they never end a loop.
pub async fn poll_once(backend: &dyn AnalysisBackend, job_key: &str) -> PollTick {
    metrics::counter!("analysis_polls_total").increment(1);

    match backend.fetch_status(job_key).await {
        Ok(Some(result)) => PollTick::Status(result),
        Ok(None) => {
            tracing::debug!(job_key, "Backend has no analysis yet");
            PollTick::NoAnalysis
        }
        Err(e) => {
            metrics::counter!("analysis_poll_errors_total").increment(1);
            tracing::warn!(job_key, error = %e, "Status fetch failed, retrying on next tick");
            PollTick::TransientError
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn drive(
    backend: Arc<dyn AnalysisBackend>,
    job_key: String,
    settings: PollSettings,
    stop: CancellationToken,
    latest: Arc<watch::Sender<Option<AnalysisResult>>>,
    last_outcome: Arc<watch::Sender<Option<PollOutcome>>>,
    on_complete: Option<CompletionCallback>,
    outcome_tx: oneshot::Sender<PollOutcome>,
) {
    let started = Instant::now();
    let outcome = run_loop(backend.as_ref(), &job_key, settings, &stop, &latest).await;
    stop.cancel();

    let elapsed = started.elapsed();
    metrics::histogram!("analysis_job_seconds").record(elapsed.as_secs_f64());
    match &outcome {
        PollOutcome::Completed(_) => {
            metrics::counter!("analysis_jobs_completed_total").increment(1);
            tracing::info!(job_key = %job_key, elapsed_secs = elapsed.as_secs(), "Analysis completed");
        }
        PollOutcome::Failed(_) => {
            metrics::counter!("analysis_jobs_failed_total").increment(1);
            tracing::info!(job_key = %job_key, elapsed_secs = elapsed.as_secs(), "Analysis failed");
        }
        PollOutcome::TimedOut { .. } => {
            metrics::counter!("analysis_jobs_timed_out_total").increment(1);
            tracing::warn!(
                job_key = %job_key,
                timeout_secs = settings.timeout.as_secs(),
                "Analysis did not reach a terminal status before the deadline"
            );
        }
        PollOutcome::Cancelled => tracing::info!(job_key = %job_key, "Analysis polling cancelled"),
    }

    if let (PollOutcome::Completed(result), Some(callback)) = (&outcome, &on_complete) {
        callback(&job_key, result);
    }

    last_outcome.send_replace(Some(outcome.clone()));
    // The caller may have dropped its handle.
    let _ = outcome_tx.send(outcome);
}

async fn run_loop(
    backend: &dyn AnalysisBackend,
    job_key: &str,
    settings: PollSettings,
    stop: &CancellationToken,
    latest: &watch::Sender<Option<AnalysisResult>>,
) -> PollOutcome {
    let deadline = Instant::now() + settings.timeout;
    let timed_out = || PollOutcome::TimedOut {
        last: latest.borrow().clone(),
    };
    let mut attempt: u32 = 0;

    loop {
        tokio::select! {
            biased;
            _ = stop.cancelled() => return PollOutcome::Cancelled,
            _ = sleep_until(deadline) => return timed_out(),
            _ = sleep(settings.interval) => {}
        }

        attempt += 1;
        let tick = tokio::select! {
            biased;
            _ = stop.cancelled() => return PollOutcome::Cancelled,
            _ = sleep_until(deadline) => return timed_out(),
            tick = poll_once(backend, job_key) => tick,
        };

        if let PollTick::Status(result) = tick {
            tracing::debug!(job_key, attempt, status = %result.status, "Analysis status");
            latest.send_replace(Some(result.clone()));
            match result.status {
                JobStatus::Completed => return PollOutcome::Completed(result),
                JobStatus::Failed => return PollOutcome::Failed(result),
                _ => {}
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    #[error("Analysis start rejected: {0}")]
    StartRejected(String),

    #[error("Analysis already polling for {0}")]
    AlreadyPolling(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}
