use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Status of a website analysis job as reported by the audit backend.
///
/// The token set is owned by the backend, so unknown tokens are kept verbatim
/// in [`JobStatus::Other`]. Only `completed` and `failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    Analyzing,
    Crawling,
    Completed,
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Analyzing => "analyzing",
            JobStatus::Crawling => "crawling",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Other(token) => token,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl From<String> for JobStatus {
    fn from(token: String) -> Self {
        match token.as_str() {
            "pending" => JobStatus::Pending,
            "analyzing" => JobStatus::Analyzing,
            "crawling" => JobStatus::Crawling,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Other(token),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Other(token) => token,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommendation priority, highest first when ordered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// A single actionable item produced by the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Snapshot of an analysis job. Replaced wholesale on every status fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<DateTime<Utc>>,
    /// Structured report; its shape is backend-defined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<Recommendation>>,
}

impl AnalysisResult {
    pub fn with_status(status: JobStatus) -> Self {
        Self {
            status,
            analyzed_at: None,
            insights: None,
            recommendations: None,
        }
    }

    /// Recommendations grouped high, medium, low. Received order is kept
    /// within each group and empty groups are omitted.
    pub fn recommendations_by_priority(&self) -> Vec<(Priority, Vec<&Recommendation>)> {
        let recommendations = self.recommendations.as_deref().unwrap_or_default();
        [Priority::High, Priority::Medium, Priority::Low]
            .into_iter()
            .filter_map(|priority| {
                let group: Vec<&Recommendation> = recommendations
                    .iter()
                    .filter(|r| r.priority == priority)
                    .collect();
                (!group.is_empty()).then_some((priority, group))
            })
            .collect()
    }

    pub fn completed_recommendations(&self) -> usize {
        self.recommendations
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|r| r.completed == Some(true))
            .count()
    }
}

/// Body of `POST /analysis/analyze/{clientId}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAnalysisRequest {
    pub force_reanalyze: bool,
}

/// Body of `GET /analysis/status/{clientId}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisStatusEnvelope {
    #[serde(default)]
    pub analysis: Option<AnalysisResult>,
}

/// Error body returned by the backend on rejected requests.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendErrorBody {
    pub error: String,
}
