//! MySQL / MariaDB destination.

use async_trait::async_trait;
use poller_core::{Error, GameRecord, QuoteRecord, Result};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection, Row};
use tracing::{debug, warn};

use crate::config::DatabaseConfig;
use crate::connector::Connect;
use crate::schema::{all_tables, GAMES_TABLE, QUOTES_TABLE};
use crate::upsert::RecordWriter;

const UPSERT_GAME: &str = r#"
INSERT INTO MLB (
    gamePk, game_date, game_time, home_team, away_team,
    home_score, away_score, inning, inning_state,
    status, last_updated
)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NOW())
ON DUPLICATE KEY UPDATE
    game_date = VALUES(game_date),
    game_time = VALUES(game_time),
    home_team = VALUES(home_team),
    away_team = VALUES(away_team),
    home_score = VALUES(home_score),
    away_score = VALUES(away_score),
    inning = VALUES(inning),
    inning_state = VALUES(inning_state),
    status = VALUES(status),
    last_updated = NOW()
"#;

const UPSERT_QUOTE: &str = r#"
INSERT INTO nuStockTracker (
    symbol, name, price, changes_percentage, change_value,
    day_low, day_high, year_high, year_low, market_cap,
    price_avg_50, price_avg_200, exchange, volume, avg_volume,
    `open`, previous_close, eps, pe, earnings_announcement,
    shares_outstanding, `timestamp`
)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
ON DUPLICATE KEY UPDATE
    name = VALUES(name),
    price = VALUES(price),
    changes_percentage = VALUES(changes_percentage),
    change_value = VALUES(change_value),
    day_low = VALUES(day_low),
    day_high = VALUES(day_high),
    year_high = VALUES(year_high),
    year_low = VALUES(year_low),
    market_cap = VALUES(market_cap),
    price_avg_50 = VALUES(price_avg_50),
    price_avg_200 = VALUES(price_avg_200),
    exchange = VALUES(exchange),
    volume = VALUES(volume),
    avg_volume = VALUES(avg_volume),
    `open` = VALUES(`open`),
    previous_close = VALUES(previous_close),
    eps = VALUES(eps),
    pe = VALUES(pe),
    earnings_announcement = VALUES(earnings_announcement),
    shares_outstanding = VALUES(shares_outstanding),
    `timestamp` = VALUES(`timestamp`)
"#;

/// Opens single MySQL connections from a [`DatabaseConfig`].
#[derive(Debug, Clone)]
pub struct MySqlConnector {
    config: DatabaseConfig,
}

impl MySqlConnector {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    fn options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .username(&self.config.user)
            .password(&self.config.password)
            .database(&self.config.database)
    }
}

#[async_trait]
impl Connect for MySqlConnector {
    type Connection = MySqlStore;

    async fn connect(&self) -> Result<MySqlStore> {
        let conn = tokio::time::timeout(self.config.connect_timeout(), self.options().connect())
            .await
            .map_err(|_| {
                Error::connection(format!(
                    "timed out after {}s",
                    self.config.connect_timeout_secs
                ))
            })?
            .map_err(|e| Error::connection(e.to_string()))?;

        let mut store = MySqlStore { conn };
        if self.config.ensure_schema {
            store.init_schema().await?;
        }
        Ok(store)
    }

    fn target(&self) -> String {
        self.config.display_target()
    }

    async fn close(&self, store: MySqlStore) {
        store.close().await;
    }
}

/// An open connection that upserts records.
pub struct MySqlStore {
    conn: MySqlConnection,
}

impl MySqlStore {
    /// Creates destination tables if they are missing.
    pub async fn init_schema(&mut self) -> Result<()> {
        for ddl in all_tables() {
            sqlx::query(ddl)
                .execute(&mut self.conn)
                .await
                .map_err(|e| Error::database(format!("Failed to execute DDL: {}", e)))?;
        }

        debug!("Destination schema initialized");
        Ok(())
    }

    /// Closes the connection, logging rather than failing on error.
    pub async fn close(self) {
        if let Err(e) = self.conn.close().await {
            warn!(error = %e, "Failed to close database connection cleanly");
        }
    }

    pub async fn count_games(&mut self) -> Result<i64> {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {GAMES_TABLE}"))
            .fetch_one(&mut self.conn)
            .await
            .map_err(|e| Error::database(e.to_string()))
    }

    pub async fn count_quotes(&mut self) -> Result<i64> {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {QUOTES_TABLE}"))
            .fetch_one(&mut self.conn)
            .await
            .map_err(|e| Error::database(e.to_string()))
    }

    /// Reads back one game row.
    pub async fn fetch_game(&mut self, game_pk: i64) -> Result<Option<GameRecord>> {
        let row = sqlx::query(
            "SELECT gamePk, game_date, game_time, home_team, away_team, home_score, \
             away_score, inning, inning_state, status FROM MLB WHERE gamePk = ?",
        )
        .bind(game_pk)
        .fetch_optional(&mut self.conn)
        .await
        .map_err(|e| Error::database(e.to_string()))?;

        row.map(|row| {
            Ok(GameRecord {
                game_pk: row.try_get("gamePk").map_err(decode_err)?,
                game_date: row.try_get("game_date").map_err(decode_err)?,
                game_time: row.try_get("game_time").map_err(decode_err)?,
                home_team: row.try_get("home_team").map_err(decode_err)?,
                away_team: row.try_get("away_team").map_err(decode_err)?,
                home_score: row.try_get("home_score").map_err(decode_err)?,
                away_score: row.try_get("away_score").map_err(decode_err)?,
                inning: row.try_get("inning").map_err(decode_err)?,
                inning_state: row.try_get("inning_state").map_err(decode_err)?,
                status: row.try_get("status").map_err(decode_err)?,
            })
        })
        .transpose()
    }

    /// Reads back the price column of one quote row.
    pub async fn fetch_quote_price(&mut self, symbol: &str) -> Result<Option<f64>> {
        sqlx::query_scalar("SELECT price FROM nuStockTracker WHERE symbol = ?")
            .bind(symbol)
            .fetch_optional(&mut self.conn)
            .await
            .map_err(|e| Error::database(e.to_string()))
    }
}

fn decode_err(e: sqlx::Error) -> Error {
    Error::database(format!("Failed to decode row: {}", e))
}

#[async_trait]
impl RecordWriter<GameRecord> for MySqlStore {
    async fn upsert(&mut self, game: &GameRecord) -> Result<()> {
        sqlx::query(UPSERT_GAME)
            .bind(game.game_pk)
            .bind(game.game_date)
            .bind(game.game_time)
            .bind(&game.home_team)
            .bind(&game.away_team)
            .bind(game.home_score)
            .bind(game.away_score)
            .bind(game.inning)
            .bind(&game.inning_state)
            .bind(&game.status)
            .execute(&mut self.conn)
            .await
            .map_err(|e| Error::database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl RecordWriter<QuoteRecord> for MySqlStore {
    async fn upsert(&mut self, quote: &QuoteRecord) -> Result<()> {
        sqlx::query(UPSERT_QUOTE)
            .bind(&quote.symbol)
            .bind(&quote.name)
            .bind(quote.price)
            .bind(quote.changes_percentage)
            .bind(quote.change)
            .bind(quote.day_low)
            .bind(quote.day_high)
            .bind(quote.year_high)
            .bind(quote.year_low)
            .bind(quote.market_cap)
            .bind(quote.price_avg_50)
            .bind(quote.price_avg_200)
            .bind(&quote.exchange)
            .bind(quote.volume)
            .bind(quote.avg_volume)
            .bind(quote.open)
            .bind(quote.previous_close)
            .bind(quote.eps)
            .bind(quote.pe)
            .bind(quote.earnings_announcement)
            .bind(quote.shares_outstanding)
            .bind(quote.timestamp)
            .execute(&mut self.conn)
            .await
            .map_err(|e| Error::database(e.to_string()))?;
        Ok(())
    }
}
