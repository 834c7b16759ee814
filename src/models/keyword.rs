use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Search intent attached to a keyword candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Intent {
    Informational,
    Transactional,
    Navigational,
    Local,
}

/// A keyword candidate. `keyword` is the identifying key within a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    #[garde(length(min = 1, max = 200))]
    pub keyword: String,

    #[garde(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_volume: Option<u64>,

    #[garde(range(min = 0.0, max = 100.0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,

    #[garde(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
}

impl Keyword {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            search_volume: None,
            difficulty: None,
            intent: None,
        }
    }

    pub fn with_volume(mut self, search_volume: u64) -> Self {
        self.search_volume = Some(search_volume);
        self
    }

    pub fn with_difficulty(mut self, difficulty: f64) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = Some(intent);
        self
    }
}

/// Ordering applied to the filtered candidate view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortMode {
    /// Relevance score, descending.
    #[default]
    Relevance,
    /// Search volume, descending. Missing volume sorts as 0.
    Volume,
    /// Difficulty, ascending. Missing difficulty sorts as 0.
    Difficulty,
    /// Keyword text, ascending, ignoring case.
    Alphabetical,
}

/// Free-text hints the relevance score is measured against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankContext {
    #[serde(default)]
    pub page_name: String,
    #[serde(default)]
    pub service: String,
}

impl RankContext {
    pub fn new(page_name: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            page_name: page_name.into(),
            service: service.into(),
        }
    }
}

/// Search box state of the keyword selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub relevant_only: bool,
}
