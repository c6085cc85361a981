//! Provider endpoint configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// MLB Stats API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlbApiConfig {
    /// Base URL, without trailing slash
    #[serde(default = "default_mlb_base_url")]
    pub base_url: String,
    /// Sport id passed to the schedule endpoint (1 = MLB)
    #[serde(default = "default_sport_id")]
    pub sport_id: u32,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_mlb_base_url() -> String {
    "https://statsapi.mlb.com".to_string()
}

fn default_sport_id() -> u32 {
    1
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for MlbApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_mlb_base_url(),
            sport_id: default_sport_id(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl MlbApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Financial Modeling Prep API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FmpApiConfig {
    /// Base URL, without trailing slash
    #[serde(default = "default_fmp_base_url")]
    pub base_url: String,
    /// API key sent as the `apikey` query parameter
    #[serde(default)]
    pub api_key: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_fmp_base_url() -> String {
    "https://financialmodelingprep.com".to_string()
}

impl Default for FmpApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_fmp_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FmpApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
