//! Tests for the stock quote feed cycle.

use integration_tests::{
    fixtures,
    mocks::MockQuoteSource,
    setup::{AlwaysClosed, TestContext},
};
use poller_core::QuotaLimits;
use tokio_util::sync::CancellationToken;
use worker::{CycleReport, Feed, FeedOutcome, Scheduler, SchedulerConfig};

#[tokio::test]
async fn test_quotes_written_per_symbol() {
    let ctx = TestContext::new();
    let source = MockQuoteSource::new()
        .with_quote(fixtures::quote("AAPL", 194.35))
        .with_quote(fixtures::quote("MSFT", 424.1));
    let feed = ctx.quotes_feed(source, &["AAPL", "MSFT"]);

    let report = feed.run_cycle().await.unwrap();

    assert_eq!(report.written, 2);
    assert_eq!(ctx.store.quote_count(), 2);
    assert_eq!(ctx.connector.closes(), 1);
    let aapl = ctx.store.quote("AAPL").unwrap();
    assert_eq!(aapl.price, 194.35);
    assert_eq!(aapl.exchange.as_deref(), Some("NASDAQ"));
}

/// A fund quote with mostly null columns is still written.
#[tokio::test]
async fn test_sparse_quote_is_written() {
    let ctx = TestContext::new();
    let source = MockQuoteSource::new()
        .with_quote(fixtures::sparse_quote("SPY", 532.1));
    let feed = ctx.quotes_feed(source, &["SPY"]);

    let report = feed.run_cycle().await.unwrap();

    assert_eq!(report.written, 1);
    let spy = ctx.store.quote("SPY").unwrap();
    assert_eq!(spy.price, 532.1);
    assert!(spy.market_cap.is_none());
    assert!(spy.name.is_none());
}

/// Failed and empty symbols are skipped; the rest are written.
#[tokio::test]
async fn test_failed_and_empty_symbols_are_skipped() {
    let ctx = TestContext::new();
    let source = MockQuoteSource::new()
        .with_quote(fixtures::quote("AAPL", 194.35))
        .with_quote(fixtures::quote("NVDA", 120.9))
        .with_failure("TSLA");
    let feed = ctx.quotes_feed(source, &["AAPL", "TSLA", "DLB", "NVDA"]);

    let report = feed.run_cycle().await.unwrap();

    assert_eq!(
        report,
        CycleReport {
            processed: 4,
            fetched: 2,
            skipped: 2,
            written: 2,
            failed: 0,
        }
    );
    assert!(ctx.store.quote("TSLA").is_none());
    assert!(ctx.store.quote("DLB").is_none());
}

/// Nothing came back for any symbol: no writes at all.
#[tokio::test]
async fn test_no_data_for_any_symbol_writes_nothing() {
    let ctx = TestContext::new();
    let source = MockQuoteSource::new().with_failure("AAPL");
    let feed = ctx.quotes_feed(source.clone(), &["AAPL", "MSFT"]);

    let report = feed.run_cycle().await.unwrap();

    assert_eq!(report.fetched, 0);
    assert_eq!(report.skipped, 2);
    assert_eq!(ctx.store.write_attempts(), 0);
    assert_eq!(source.requested().len(), 2);
    assert_eq!(ctx.connector.closes(), 1);
}

#[tokio::test]
async fn test_duplicate_symbols_polled_once() {
    let ctx = TestContext::new();
    let source = MockQuoteSource::new()
        .with_quote(fixtures::quote("AAPL", 194.35))
        .with_quote(fixtures::quote("GOOGL", 176.2))
        .with_quote(fixtures::quote("MSFT", 424.1));
    let feed = ctx.quotes_feed(source.clone(), &["AAPL", "googl", "MSFT", " GOOGL "]);

    assert_eq!(feed.symbols(), ["AAPL", "GOOGL", "MSFT"]);
    feed.run_cycle().await.unwrap();

    assert_eq!(source.requested(), vec!["AAPL", "GOOGL", "MSFT"]);
    assert_eq!(feed.counter().current().daily.count, 3);
}

#[tokio::test]
async fn test_requests_keep_symbol_order() {
    let ctx = TestContext::new();
    let symbols = ["DLB", "AAPL", "NVDA", "AMZN", "TSLA", "MSFT"];
    let source = MockQuoteSource::new();
    let feed = ctx
        .quotes_feed(source.clone(), &symbols)
        .with_max_concurrent(2);

    feed.run_cycle().await.unwrap();

    assert_eq!(source.requested(), symbols.to_vec());
}

#[tokio::test]
async fn test_quota_limit_stops_requests() {
    let ctx = TestContext::new();
    let source = MockQuoteSource::new()
        .with_quote(fixtures::quote("AAPL", 194.35))
        .with_quote(fixtures::quote("MSFT", 424.1))
        .with_quote(fixtures::quote("NVDA", 120.9));
    let feed = ctx.quotes_feed_with_limits(
        source.clone(),
        &["AAPL", "MSFT", "NVDA"],
        QuotaLimits {
            daily: None,
            monthly: Some(2),
        },
    );

    let report = feed.run_cycle().await.unwrap();

    assert_eq!(report.written, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(source.requested(), vec!["AAPL", "MSFT"]);
}

/// A closed market means no connection, no requests, no writes.
#[tokio::test]
async fn test_closed_market_does_no_work() {
    let ctx = TestContext::new();
    let source = MockQuoteSource::new().with_quote(fixtures::quote("AAPL", 194.35));
    let feed = ctx.quotes_feed(source.clone(), &["AAPL"]).with_gate(AlwaysClosed);
    let scheduler =
        Scheduler::new(SchedulerConfig::default(), CancellationToken::new()).with_feed(feed);

    let outcomes = scheduler.run_pass().await.unwrap();

    assert_eq!(outcomes, vec![FeedOutcome::Gated]);
    assert_eq!(ctx.connector.attempts(), 0);
    assert!(source.requested().is_empty());
    assert_eq!(ctx.store.quote_count(), 0);
    assert!(!ctx.counter_path("stock").exists());
}
