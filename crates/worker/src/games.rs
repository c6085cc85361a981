//! MLB games feed.
//!
//! One cycle: connect, list today's games, fetch each game's linescore with
//! bounded concurrency, upsert every game that produced a snapshot, close.
//! A failed linescore drops that game for the cycle; a failed schedule
//! request aborts the cycle.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use feeds::{GameSummary, ScheduleSource};
use futures::stream::{self, StreamExt};
use poller_core::{CallCounterStore, GameRecord, Result};
use store::{upsert_all, Connect, RecordWriter, RetryConnector};
use telemetry::metrics;
use tracing::{debug, info, warn};

use crate::feed::{account_call, CycleReport, Feed};

const FEED_NAME: &str = "mlb";

/// Polls the day's MLB games into the `MLB` table.
pub struct GamesFeed<S, C> {
    source: S,
    connector: RetryConnector<C>,
    counter: CallCounterStore,
    max_concurrent: usize,
    date: Option<NaiveDate>,
}

impl<S, C> GamesFeed<S, C>
where
    S: ScheduleSource,
    C: Connect,
    C::Connection: RecordWriter<GameRecord>,
{
    pub fn new(source: S, connector: RetryConnector<C>, counter: CallCounterStore) -> Self {
        Self {
            source,
            connector,
            counter,
            max_concurrent: 4,
            date: None,
        }
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Polls a fixed date instead of the local calendar day.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn counter(&self) -> &CallCounterStore {
        &self.counter
    }

    async fn poll(&self, conn: &mut C::Connection) -> Result<CycleReport> {
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        account_call(FEED_NAME, &self.counter)?;
        let games = self.source.games_on(date).await.inspect_err(|e| {
            metrics().fetch_errors.inc();
            warn!(date = %date, error = %e, "Failed to fetch MLB schedule");
        })?;

        let mut report = CycleReport {
            processed: games.len(),
            ..Default::default()
        };

        if games.is_empty() {
            info!(date = %date, "No games scheduled");
            return Ok(report);
        }
        debug!(date = %date, games = games.len(), "Fetching linescores");

        let records: Vec<GameRecord> = stream::iter(games)
            .map(|game| self.snapshot(game))
            .buffered(self.max_concurrent)
            .filter_map(|record| async move { record })
            .collect()
            .await;

        report.fetched = records.len();
        report.skipped = report.processed - records.len();
        metrics().records_fetched.inc_by(report.fetched as u64);
        metrics().items_skipped.inc_by(report.skipped as u64);

        let written = upsert_all(conn, &records).await;
        report.written = written.written;
        report.failed = written.failed;

        info!(
            date = %date,
            written = report.written,
            skipped = report.skipped,
            failed = report.failed,
            "Processed {} games",
            report.processed
        );
        Ok(report)
    }

    async fn snapshot(&self, game: GameSummary) -> Option<GameRecord> {
        let game_pk = game.game_pk;
        if account_call(FEED_NAME, &self.counter).is_err() {
            return None;
        }

        match self.source.linescore(game_pk).await {
            Ok(linescore) => Some(game.into_record(linescore)),
            Err(e) => {
                metrics().fetch_errors.inc();
                warn!(
                    game_pk = game_pk,
                    error = %e,
                    "Failed to fetch linescore, skipping game"
                );
                None
            }
        }
    }
}

#[async_trait]
impl<S, C> Feed for GamesFeed<S, C>
where
    S: ScheduleSource,
    C: Connect,
    C::Connection: RecordWriter<GameRecord>,
{
    fn name(&self) -> &str {
        FEED_NAME
    }

    async fn run_cycle(&self) -> Result<CycleReport> {
        let mut conn = self.connector.connect().await?;
        let result = self.poll(&mut conn).await;
        self.connector.close(conn).await;
        result
    }
}
