//! Destination table schemas.
//!
//! Each table is keyed by a single natural identifier so that
//! `ON DUPLICATE KEY UPDATE` converges to the latest snapshot.

pub const GAMES_TABLE: &str = "MLB";
pub const QUOTES_TABLE: &str = "nuStockTracker";

/// MLB games keyed by `gamePk`.
pub const CREATE_GAMES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS MLB (
    gamePk BIGINT NOT NULL PRIMARY KEY,
    game_date DATE NOT NULL,
    game_time TIME NOT NULL,
    home_team VARCHAR(100) NOT NULL,
    away_team VARCHAR(100) NOT NULL,
    home_score INT NULL,
    away_score INT NULL,
    inning INT NULL,
    inning_state VARCHAR(20) NOT NULL,
    status VARCHAR(64) NOT NULL,
    last_updated DATETIME NOT NULL
)
"#;

/// Equity quotes keyed by `symbol`.
pub const CREATE_QUOTES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS nuStockTracker (
    symbol VARCHAR(16) NOT NULL PRIMARY KEY,
    name VARCHAR(255) NULL,
    price DOUBLE NOT NULL,
    changes_percentage DOUBLE NULL,
    change_value DOUBLE NULL,
    day_low DOUBLE NULL,
    day_high DOUBLE NULL,
    year_high DOUBLE NULL,
    year_low DOUBLE NULL,
    market_cap DOUBLE NULL,
    price_avg_50 DOUBLE NULL,
    price_avg_200 DOUBLE NULL,
    exchange VARCHAR(32) NULL,
    volume BIGINT NULL,
    avg_volume BIGINT NULL,
    `open` DOUBLE NULL,
    previous_close DOUBLE NULL,
    eps DOUBLE NULL,
    pe DOUBLE NULL,
    earnings_announcement DATETIME NULL,
    shares_outstanding DOUBLE NULL,
    `timestamp` BIGINT NOT NULL
)
"#;

/// Returns all DDL statements.
pub fn all_tables() -> Vec<&'static str> {
    vec![CREATE_GAMES_TABLE, CREATE_QUOTES_TABLE]
}
