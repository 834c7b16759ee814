//! Test helpers: a scripted in-memory audit backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use seo_audit_hw::models::analysis::{AnalysisResult, JobStatus};
use seo_audit_hw::services::backend::{AnalysisBackend, BackendError};

/// One scripted answer of the status endpoint.
#[derive(Debug, Clone)]
pub enum StatusReply {
    Snapshot(JobStatus),
    Empty,
    Error,
}

/// Backend answering status fetches from a script. Once the script runs
/// out every fetch reports `pending`.
pub struct ScriptedBackend {
    start_rejection: Option<String>,
    statuses: Mutex<VecDeque<StatusReply>>,
    fetch_delay: Option<Duration>,
    start_delay: Option<Duration>,
    force_flags: Mutex<Vec<bool>>,
    start_calls: AtomicUsize,
    status_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(statuses: impl IntoIterator<Item = StatusReply>) -> Self {
        Self {
            start_rejection: None,
            statuses: Mutex::new(statuses.into_iter().collect()),
            fetch_delay: None,
            start_delay: None,
            force_flags: Mutex::new(Vec::new()),
            start_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            start_rejection: Some(message.to_string()),
            ..Self::always_pending()
        }
    }

    pub fn always_pending() -> Self {
        Self::new(Vec::<StatusReply>::new())
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = Some(delay);
        self
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn force_flags(&self) -> Vec<bool> {
        self.force_flags.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisBackend for ScriptedBackend {
    async fn start_analysis(&self, _client_id: &str, force_reanalyze: bool) -> Result<(), BackendError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.force_flags.lock().unwrap().push(force_reanalyze);

        if let Some(delay) = self.start_delay {
            tokio::time::sleep(delay).await;
        }

        match &self.start_rejection {
            Some(message) => Err(BackendError::Rejected {
                status: 400,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn fetch_status(&self, _client_id: &str) -> Result<Option<AnalysisResult>, BackendError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let reply = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(StatusReply::Snapshot(JobStatus::Pending));

        match reply {
            StatusReply::Snapshot(status) => Ok(Some(AnalysisResult::with_status(status))),
            StatusReply::Empty => Ok(None),
            StatusReply::Error => Err(BackendError::Rejected {
                status: 503,
                message: "upstream unavailable".to_string(),
            }),
        }
    }
}
