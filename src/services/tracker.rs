use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::analysis::AnalysisResult;
use crate::services::backend::AnalysisBackend;
use crate::services::poller::{JobPoller, PollHandle, PollSettings, PollerError, PollerState, StartOptions};

/// One [`JobPoller`] per client, created on first start.
pub struct AnalysisTracker {
    backend: Arc<dyn AnalysisBackend>,
    settings: PollSettings,
    pollers: RwLock<HashMap<String, Arc<JobPoller>>>,
}

impl AnalysisTracker {
    pub fn new(backend: Arc<dyn AnalysisBackend>, settings: PollSettings) -> Self {
        Self {
            backend,
            settings,
            pollers: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, client_id: &str) -> Option<Arc<JobPoller>> {
        self.pollers.read().await.get(client_id).cloned()
    }

    async fn poller_for(&self, client_id: &str) -> Arc<JobPoller> {
        if let Some(poller) = self.get(client_id).await {
            return poller;
        }

        let mut pollers = self.pollers.write().await;
        let poller = pollers.entry(client_id.to_string()).or_insert_with(|| {
            Arc::new(JobPoller::new(Arc::clone(&self.backend), self.settings).on_complete(log_completion))
        });
        Arc::clone(poller)
    }

    /// Start polling for a client. A failed first start does not keep the
    /// client's poller around.
    pub async fn start(&self, client_id: &str, options: StartOptions) -> Result<PollHandle, PollerError> {
        let poller = self.poller_for(client_id).await;
        let result = poller.start(client_id, options).await;
        if result.is_err() {
            drop(poller);
            self.evict_unused(client_id).await;
        }
        result
    }

    /// Remove a poller that never ran a loop, unless another caller still
    /// holds it (the map's reference is the only one left).
    async fn evict_unused(&self, client_id: &str) {
        let mut pollers = self.pollers.write().await;
        let Some(poller) = pollers.get(client_id) else {
            return;
        };
        if Arc::strong_count(poller) == 1
            && poller.last_outcome().is_none()
            && poller.state().await == PollerState::Idle
        {
            pollers.remove(client_id);
            tracing::debug!(client_id, "Dropped poller after failed start");
        }
    }

    /// Returns whether a loop was running for the client.
    pub async fn cancel(&self, client_id: &str) -> bool {
        match self.get(client_id).await {
            Some(poller) => poller.cancel().await,
            None => false,
        }
    }

    pub async fn active_count(&self) -> usize {
        let pollers: Vec<Arc<JobPoller>> = self.pollers.read().await.values().cloned().collect();
        let mut active = 0;
        for poller in pollers {
            if matches!(poller.state().await, PollerState::Polling { .. }) {
                active += 1;
            }
        }
        active
    }

    /// Clients with a poller, running or not.
    pub async fn tracked_count(&self) -> usize {
        self.pollers.read().await.len()
    }
}

fn log_completion(client_id: &str, result: &AnalysisResult) {
    tracing::info!(
        client_id,
        recommendations = result.recommendations.as_ref().map_or(0, Vec::len),
        completed = result.completed_recommendations(),
        "Analysis report ready"
    );
}
