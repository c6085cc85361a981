//! Test fixtures for games and quotes.

use chrono::{NaiveDate, TimeZone, Utc};
use feeds::{GameSummary, Linescore};
use poller_core::{GameRecord, QuoteRecord};

/// Date every fixture game is played on.
pub fn game_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

/// A listed game starting at 23:05 UTC on [`game_day`].
pub fn game_summary(game_pk: i64, home: &str, away: &str) -> GameSummary {
    GameSummary {
        game_pk,
        game_date: Utc.with_ymd_and_hms(2024, 6, 3, 23, 5, 0).unwrap(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        status: "In Progress".to_string(),
    }
}

pub fn linescore(home_runs: i32, away_runs: i32, inning: i32, state: &str) -> Linescore {
    Linescore {
        current_inning: Some(inning),
        inning_state: Some(state.to_string()),
        home_runs: Some(home_runs),
        away_runs: Some(away_runs),
    }
}

/// A fully populated game snapshot.
pub fn game_record(game_pk: i64, status: &str) -> GameRecord {
    game_summary(game_pk, "Boston Red Sox", "New York Yankees")
        .into_record(linescore(3, 2, 7, "Top"))
        .with_status(status)
}

/// A quote with plausible values for every column.
pub fn quote(symbol: &str, price: f64) -> QuoteRecord {
    QuoteRecord {
        symbol: symbol.to_string(),
        name: Some(format!("{symbol} Inc.")),
        price,
        changes_percentage: Some(0.76),
        change: Some(1.47),
        day_low: Some(price - 2.0),
        day_high: Some(price + 1.0),
        year_high: Some(price + 20.0),
        year_low: Some(price - 30.0),
        market_cap: Some(2.98e12),
        price_avg_50: Some(price - 5.0),
        price_avg_200: Some(price - 10.0),
        exchange: Some("NASDAQ".to_string()),
        volume: Some(50_123_456),
        avg_volume: Some(58_000_000),
        open: Some(price - 1.0),
        previous_close: Some(price - 1.5),
        eps: Some(6.43),
        pe: Some(30.2),
        earnings_announcement: NaiveDate::from_ymd_opt(2024, 8, 1)
            .and_then(|d| d.and_hms_opt(20, 30, 0)),
        shares_outstanding: Some(1.5e10),
        timestamp: 1_717_444_801,
    }
}

trait WithStatus {
    fn with_status(self, status: &str) -> Self;
}

impl WithStatus for GameRecord {
    fn with_status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }
}

/// A fund-style quote: only the always-present columns are set.
pub fn sparse_quote(symbol: &str, price: f64) -> QuoteRecord {
    QuoteRecord {
        symbol: symbol.to_string(),
        name: None,
        price,
        changes_percentage: None,
        change: None,
        day_low: None,
        day_high: None,
        year_high: None,
        year_low: None,
        market_cap: None,
        price_avg_50: None,
        price_avg_200: None,
        exchange: None,
        volume: None,
        avg_volume: None,
        open: None,
        previous_close: None,
        eps: None,
        pe: None,
        earnings_announcement: None,
        shares_outstanding: None,
        timestamp: 1_717_444_801,
    }
}
