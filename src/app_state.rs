use std::sync::Arc;

use crate::services::{backend::BackendClient, tracker::AnalysisTracker};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
    pub analyses: Arc<AnalysisTracker>,
    pub max_selections: usize,
}

impl AppState {
    pub fn new(backend: Arc<BackendClient>, analyses: AnalysisTracker, max_selections: usize) -> Self {
        Self {
            backend,
            analyses: Arc::new(analyses),
            max_selections,
        }
    }
}
