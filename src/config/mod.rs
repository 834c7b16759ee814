use serde::Deserialize;
use std::time::Duration;

use crate::services::poller::PollSettings;
use crate::services::selection::DEFAULT_MAX_SELECTIONS;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000"). Unused by the CLI driver.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of the audit backend API
    pub api_base_url: String,

    /// Bearer token sent with every backend request
    pub api_token: String,

    /// Seconds between status polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Seconds before a poll loop gives up without a terminal status
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// Default keyword selection capacity
    #[serde(default = "default_max_selections")]
    pub max_selections: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_poll_timeout_secs() -> u64 {
    300
}

fn default_max_selections() -> usize {
    DEFAULT_MAX_SELECTIONS
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(self.poll_interval_secs),
            timeout: Duration::from_secs(self.poll_timeout_secs),
        }
    }
}
