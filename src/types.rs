use serde::{Deserialize, Serialize};

/// Configuration stored in ~/.healthdash/config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the local data service answering `/api/query`.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Upper bound on intraday grid points per chart.
    #[serde(default = "default_max_points")]
    pub max_points: usize,
    /// Candidate grid steps in minutes, smallest first.
    #[serde(default = "default_interval_ladder_minutes")]
    pub interval_ladder_minutes: Vec<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_points: default_max_points(),
            interval_ladder_minutes: default_interval_ladder_minutes(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_points() -> usize {
    crate::series::intraday::MAX_POINTS
}

fn default_interval_ladder_minutes() -> Vec<u32> {
    crate::series::intraday::DEFAULT_INTERVAL_LADDER_MINUTES.to_vec()
}
