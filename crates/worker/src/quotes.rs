//! Stock quote feed.

use async_trait::async_trait;
use feeds::QuoteSource;
use futures::stream::{self, StreamExt};
use poller_core::{CallCounterStore, Gate, MarketHours, QuoteRecord, Result};
use store::{upsert_all, Connect, RecordWriter, RetryConnector};
use telemetry::metrics;
use tracing::{error, info, warn};

use crate::feed::{account_call, CycleReport, Feed};

const FEED_NAME: &str = "fmp";

/// Polls quotes for a fixed symbol list into the `nuStockTracker` table,
/// only while the market is open.
pub struct QuotesFeed<S, C> {
    source: S,
    connector: RetryConnector<C>,
    counter: CallCounterStore,
    symbols: Vec<String>,
    gate: Box<dyn Gate>,
    max_concurrent: usize,
}

impl<S, C> QuotesFeed<S, C>
where
    S: QuoteSource,
    C: Connect,
    C::Connection: RecordWriter<QuoteRecord>,
{
    /// Repeated symbols are polled once, at their first position.
    pub fn new(
        source: S,
        connector: RetryConnector<C>,
        counter: CallCounterStore,
        symbols: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for symbol in symbols {
            let symbol = symbol.trim().to_uppercase();
            if symbol.is_empty() || unique.contains(&symbol) {
                continue;
            }
            unique.push(symbol);
        }

        Self {
            source,
            connector,
            counter,
            symbols: unique,
            gate: Box::new(MarketHours::us_equities()),
            max_concurrent: 4,
        }
    }

    pub fn with_gate(mut self, gate: impl Gate + 'static) -> Self {
        self.gate = Box::new(gate);
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn counter(&self) -> &CallCounterStore {
        &self.counter
    }

    async fn poll(&self, conn: &mut C::Connection) -> Result<CycleReport> {
        info!(symbols = ?self.symbols, "Fetching stock data");
        let per_symbol: Vec<Vec<QuoteRecord>> = stream::iter(self.symbols.clone())
            .map(|symbol| async move { self.quotes_for(&symbol).await })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let mut report = CycleReport {
            processed: self.symbols.len(),
            skipped: per_symbol.iter().filter(|quotes| quotes.is_empty()).count(),
            ..Default::default()
        };
        let records: Vec<QuoteRecord> = per_symbol.into_iter().flatten().collect();
        report.fetched = records.len();
        metrics().records_fetched.inc_by(report.fetched as u64);
        metrics().items_skipped.inc_by(report.skipped as u64);

        if records.is_empty() {
            error!(symbols = ?self.symbols, "No data retrieved for any symbol");
            return Ok(report);
        }

        let written = upsert_all(conn, &records).await;
        report.written = written.written;
        report.failed = written.failed;

        info!(
            written = report.written,
            skipped = report.skipped,
            failed = report.failed,
            "Processed {} symbols",
            report.processed
        );
        Ok(report)
    }

    async fn quotes_for(&self, symbol: &str) -> Vec<QuoteRecord> {
        if account_call(FEED_NAME, &self.counter).is_err() {
            return Vec::new();
        }

        match self.source.quote(symbol).await {
            Ok(quotes) if quotes.is_empty() => {
                warn!(symbol = symbol, "No data returned for symbol");
                Vec::new()
            }
            Ok(quotes) => quotes,
            Err(e) => {
                metrics().fetch_errors.inc();
                warn!(symbol = symbol, error = %e, "Failed to fetch quote, skipping symbol");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl<S, C> Feed for QuotesFeed<S, C>
where
    S: QuoteSource,
    C: Connect,
    C::Connection: RecordWriter<QuoteRecord>,
{
    fn name(&self) -> &str {
        FEED_NAME
    }

    fn gate(&self) -> Option<&dyn Gate> {
        Some(self.gate.as_ref())
    }

    async fn run_cycle(&self) -> Result<CycleReport> {
        let mut conn = self.connector.connect().await?;
        let result = self.poll(&mut conn).await;
        self.connector.close(conn).await;
        result
    }
}
