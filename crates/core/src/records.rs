//! Normalized snapshot records written to the store.
//!
//! Each poll produces a fresh set of these. They are never mutated after
//! construction, only superseded by the next write for the same key.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A record with a business identifier used to deduplicate across polls.
pub trait Record: Send + Sync {
    /// Short label used in logs ("game", "quote").
    const KIND: &'static str;

    /// The natural key, rendered for logging.
    fn natural_key(&self) -> String;
}

/// One MLB game as of the latest poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_pk: i64,
    pub game_date: NaiveDate,
    pub game_time: NaiveTime,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub inning: Option<i32>,
    pub inning_state: String,
    pub status: String,
}

impl Record for GameRecord {
    const KIND: &'static str = "game";

    fn natural_key(&self) -> String {
        self.game_pk.to_string()
    }
}

/// One equity quote as of the latest poll.
///
/// Columns the provider reported as null stay `None` and are stored as NULL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub symbol: String,
    pub name: Option<String>,
    pub price: f64,
    pub changes_percentage: Option<f64>,
    pub change: Option<f64>,
    pub day_low: Option<f64>,
    pub day_high: Option<f64>,
    pub year_high: Option<f64>,
    pub year_low: Option<f64>,
    pub market_cap: Option<f64>,
    pub price_avg_50: Option<f64>,
    pub price_avg_200: Option<f64>,
    pub exchange: Option<String>,
    pub volume: Option<i64>,
    pub avg_volume: Option<i64>,
    pub open: Option<f64>,
    pub previous_close: Option<f64>,
    pub eps: Option<f64>,
    pub pe: Option<f64>,
    pub earnings_announcement: Option<NaiveDateTime>,
    pub shares_outstanding: Option<f64>,
    /// Provider timestamp, stored as received.
    pub timestamp: i64,
}

impl Record for QuoteRecord {
    const KIND: &'static str = "quote";

    fn natural_key(&self) -> String {
        self.symbol.clone()
    }
}

/// Parse the provider's earnings announcement timestamp.
///
/// Accepts `2025-01-30T21:30:00.000+0000`; anything after the first `.` is
/// dropped. Returns `None` when the remainder is not `%Y-%m-%dT%H:%M:%S`.
pub fn parse_earnings_announcement(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.split('.').next().unwrap_or(raw);
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S").ok()
}
