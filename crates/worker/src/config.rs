//! Scheduler and per-feed configuration.

use std::path::PathBuf;
use std::time::Duration;

use feeds::config::{FmpApiConfig, MlbApiConfig};
use poller_core::{MarketHoursConfig, QuotaLimits};
use serde::{Deserialize, Serialize};
use store::{DatabaseConfig, RetryConfig};

/// Outer loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Sleep between passes in seconds, independent of how long a pass took
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Upper bound on in-flight per-item requests within one feed
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    /// Stop the process when a feed exhausts its connection attempts
    #[serde(default)]
    pub fail_fast_on_connect: bool,
}

fn default_interval_secs() -> u64 {
    1800
}

fn default_max_concurrent_requests() -> usize {
    4
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_concurrent_requests: default_max_concurrent_requests(),
            fail_fast_on_connect: false,
        }
    }
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

fn default_enabled() -> bool {
    true
}

/// MLB games feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamesFeedConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub api: MlbApiConfig,
    /// JSON file holding this feed's call counts
    #[serde(default = "default_games_counter_file")]
    pub counter_file: PathBuf,
    #[serde(default)]
    pub limits: QuotaLimits,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_games_counter_file() -> PathBuf {
    PathBuf::from("mlb_api_call_count.json")
}

impl Default for GamesFeedConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api: MlbApiConfig::default(),
            counter_file: default_games_counter_file(),
            limits: QuotaLimits::default(),
            database: DatabaseConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// FMP stock quote feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotesFeedConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub api: FmpApiConfig,
    /// Ticker symbols polled each cycle, in order
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    #[serde(default = "default_quotes_counter_file")]
    pub counter_file: PathBuf,
    #[serde(default)]
    pub limits: QuotaLimits,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub market_hours: MarketHoursConfig,
}

fn default_symbols() -> Vec<String> {
    ["AAPL", "GOOGL", "MSFT", "AMZN", "TSLA", "NVDA", "DLB"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_quotes_counter_file() -> PathBuf {
    PathBuf::from("stock_api_call_count.json")
}

impl Default for QuotesFeedConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api: FmpApiConfig::default(),
            symbols: default_symbols(),
            counter_file: default_quotes_counter_file(),
            limits: QuotaLimits::default(),
            database: DatabaseConfig::default(),
            retry: RetryConfig::default(),
            market_hours: MarketHoursConfig::default(),
        }
    }
}
