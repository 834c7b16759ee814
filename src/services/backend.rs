use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::models::analysis::{
    AnalysisResult, AnalysisStatusEnvelope, BackendErrorBody, StartAnalysisRequest,
};

/// Remote audit backend as seen by the job poller.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Ask the backend to start (or restart) the analysis for a client.
    async fn start_analysis(&self, client_id: &str, force_reanalyze: bool)
        -> Result<(), BackendError>;

    /// Fetch the current analysis snapshot, if the backend has one.
    async fn fetch_status(&self, client_id: &str) -> Result<Option<AnalysisResult>, BackendError>;
}

/// Client for the audit backend's analysis endpoints.
///
/// Injects the bearer credential into every request.
pub struct BackendClient {
    http: Client,
    base_url: String,
    api_token: String,
}

impl BackendClient {
    pub fn new(base_url: &str, api_token: &str) -> Result<Self, BackendError> {
        let base_url = base_url.trim_end_matches('/');
        reqwest::Url::parse(base_url).map_err(|e| BackendError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            http: Client::new(),
            base_url: base_url.to_string(),
            api_token: api_token.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the backend answers at all (for health checks).
    pub async fn health_check(&self) -> Result<(), BackendError> {
        self.http
            .get(&self.base_url)
            .send()
            .await
            .map_err(BackendError::Http)?;
        Ok(())
    }

    async fn rejection(response: Response) -> BackendError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<BackendErrorBody>(&body) {
            Ok(parsed) => parsed.error,
            Err(_) => body,
        };
        BackendError::Rejected { status, message }
    }
}

#[async_trait]
impl AnalysisBackend for BackendClient {
    async fn start_analysis(
        &self,
        client_id: &str,
        force_reanalyze: bool,
    ) -> Result<(), BackendError> {
        let url = format!("{}/analysis/analyze/{}", self.base_url, client_id);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&StartAnalysisRequest { force_reanalyze })
            .send()
            .await
            .map_err(BackendError::Http)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        tracing::debug!(client_id, status = %response.status(), "Analysis start accepted");
        Ok(())
    }

    async fn fetch_status(&self, client_id: &str) -> Result<Option<AnalysisResult>, BackendError> {
        let url = format!("{}/analysis/status/{}", self.base_url, client_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(BackendError::Http)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let envelope: AnalysisStatusEnvelope = response.json().await.map_err(BackendError::Http)?;
        Ok(envelope.analysis)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}
