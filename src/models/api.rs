use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::models::analysis::AnalysisResult;
use crate::models::keyword::{Keyword, KeywordQuery, RankContext, SortMode};
use crate::services::poller::{PollOutcome, PollerState};
use crate::services::ranking::RankedKeyword;
use crate::services::selection::ToggleOutcome;

/// Body of `POST /api/v1/analysis/{client_id}`.
#[derive(Debug, Default, Deserialize)]
pub struct StartAnalysisBody {
    #[serde(default)]
    pub force_reanalyze: bool,
}

/// Poller state and latest snapshot for one client.
#[derive(Debug, Serialize)]
pub struct AnalysisStateResponse {
    pub client_id: String,
    pub poller: PollerState,
    pub analysis: Option<AnalysisResult>,
    pub last_outcome: Option<PollOutcome>,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub client_id: String,
    pub cancelled: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of `POST /api/v1/keywords/rank`.
#[derive(Debug, Deserialize, Validate)]
pub struct RankRequest {
    #[garde(length(max = 1000), dive)]
    pub candidates: Vec<Keyword>,

    #[garde(length(max = 200))]
    #[serde(default)]
    pub page_name: String,

    #[garde(length(max = 200))]
    #[serde(default)]
    pub service: String,

    #[garde(length(max = 200))]
    #[serde(default)]
    pub search: String,

    #[garde(skip)]
    #[serde(default)]
    pub relevant_only: bool,

    #[garde(skip)]
    #[serde(default)]
    pub sort: SortMode,
}

impl RankRequest {
    pub fn context(&self) -> RankContext {
        RankContext::new(self.page_name.as_str(), self.service.as_str())
    }

    pub fn query(&self) -> KeywordQuery {
        KeywordQuery {
            search: self.search.clone(),
            relevant_only: self.relevant_only,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub total: usize,
    pub keywords: Vec<RankedKeyword>,
}

/// Change applied to a caller-owned selection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionAction {
    Toggle { keyword: String },
    AutoSelectRelevant,
    HighVolumeLowDifficulty,
    Clear,
}

/// Body of `POST /api/v1/keywords/selection`.
///
/// Bulk actions work on the filtered candidate list, so the search box
/// state travels with the request.
#[derive(Debug, Deserialize, Validate)]
pub struct SelectionRequest {
    #[garde(length(max = 1000), dive)]
    pub candidates: Vec<Keyword>,

    #[garde(dive)]
    #[serde(default)]
    pub selected: Vec<Keyword>,

    #[garde(range(min = 1, max = 50))]
    pub max_selections: Option<usize>,

    #[garde(length(max = 200))]
    #[serde(default)]
    pub page_name: String,

    #[garde(length(max = 200))]
    #[serde(default)]
    pub service: String,

    #[garde(length(max = 200))]
    #[serde(default)]
    pub search: String,

    #[garde(skip)]
    #[serde(default)]
    pub relevant_only: bool,

    #[garde(skip)]
    pub action: SelectionAction,
}

impl SelectionRequest {
    pub fn context(&self) -> RankContext {
        RankContext::new(self.page_name.as_str(), self.service.as_str())
    }

    pub fn query(&self) -> KeywordQuery {
        KeywordQuery {
            search: self.search.clone(),
            relevant_only: self.relevant_only,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub selected: Vec<Keyword>,
    pub primary: Option<Keyword>,
    pub secondary: Vec<Keyword>,
    pub max_selections: usize,
    pub is_full: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toggle: Option<ToggleOutcome>,
}
