//! Tests for the MLB games feed cycle.
//!
//! Runs the production cycle against mock sources and an in-memory store.

use integration_tests::{fixtures, mocks::MockScheduleSource, setup::TestContext};
use poller_core::{Error, QuotaLimits};
use worker::{CycleReport, Feed};

/// One game's linescore fails: the other game is still written.
#[tokio::test]
async fn test_failed_linescore_skips_only_that_game() {
    let ctx = TestContext::new();
    let source = MockScheduleSource::new()
        .with_game(
            fixtures::game_summary(745001, "Boston Red Sox", "New York Yankees"),
            Some(fixtures::linescore(3, 2, 7, "Top")),
        )
        .with_game(
            fixtures::game_summary(745002, "Los Angeles Angels", "Seattle Mariners"),
            None,
        );
    let feed = ctx.games_feed(source);

    let report = feed.run_cycle().await.unwrap();

    assert_eq!(
        report,
        CycleReport {
            processed: 2,
            fetched: 1,
            skipped: 1,
            written: 1,
            failed: 0,
        }
    );
    assert_eq!(ctx.store.game_count(), 1);
    assert!(ctx.store.game(745002).is_none());
    assert_eq!(ctx.connector.closes(), 1);

    let game = ctx.store.game(745001).unwrap();
    assert_eq!(game.home_score, Some(3));
    assert_eq!(game.away_score, Some(2));
    assert_eq!(game.inning, Some(7));
    assert_eq!(game.inning_state, "Top");
    assert_eq!(game.home_team, "Boston Red Sox");
    assert_eq!(game.game_date, fixtures::game_day());
    assert_eq!(game.game_time.to_string(), "23:05:00");
}

/// Schedule plus one linescore per game, all counted.
#[tokio::test]
async fn test_every_request_is_counted() {
    let ctx = TestContext::new();
    let source = MockScheduleSource::new()
        .with_game(
            fixtures::game_summary(1, "A", "B"),
            Some(fixtures::linescore(0, 0, 1, "Top")),
        )
        .with_game(fixtures::game_summary(2, "C", "D"), None)
        .with_game(
            fixtures::game_summary(3, "E", "F"),
            Some(fixtures::linescore(1, 0, 2, "Bottom")),
        );
    let feed = ctx.games_feed(source.clone());

    feed.run_cycle().await.unwrap();

    assert_eq!(source.requests(), 4);
    let counts = feed.counter().current();
    assert_eq!(counts.daily.count, 4);
    assert_eq!(counts.monthly.count, 4);
}

/// A second cycle refreshes rows in place.
#[tokio::test]
async fn test_repeated_cycles_update_rows() {
    let ctx = TestContext::new();
    let source = MockScheduleSource::new().with_game(
        fixtures::game_summary(745001, "Boston Red Sox", "New York Yankees"),
        Some(fixtures::linescore(3, 2, 7, "Top")),
    );
    let feed = ctx.games_feed(source.clone());

    feed.run_cycle().await.unwrap();
    source.set_linescore(745001, fixtures::linescore(5, 2, 8, "Bottom"));
    feed.run_cycle().await.unwrap();

    assert_eq!(ctx.store.game_count(), 1);
    let game = ctx.store.game(745001).unwrap();
    assert_eq!(game.home_score, Some(5));
    assert_eq!(game.inning, Some(8));
    assert_eq!(game.inning_state, "Bottom");
}

#[tokio::test]
async fn test_empty_schedule_writes_nothing() {
    let ctx = TestContext::new();
    let feed = ctx.games_feed(MockScheduleSource::new());

    let report = feed.run_cycle().await.unwrap();

    assert_eq!(report, CycleReport::default());
    assert_eq!(ctx.store.write_attempts(), 0);
    assert_eq!(ctx.connector.closes(), 1);
}

#[tokio::test]
async fn test_schedule_failure_aborts_cycle() {
    let ctx = TestContext::new();
    let source = MockScheduleSource::new().with_game(
        fixtures::game_summary(1, "A", "B"),
        Some(fixtures::linescore(0, 0, 1, "Top")),
    );
    source.set_schedule_fails(true);
    let feed = ctx.games_feed(source.clone());

    let err = feed.run_cycle().await.unwrap_err();

    assert!(matches!(err, Error::Upstream(_)));
    assert!(!err.is_terminal());
    assert_eq!(source.requests(), 1);
    assert_eq!(ctx.store.game_count(), 0);
    // The connection is still released when the cycle aborts
    assert_eq!(ctx.connector.closes(), 1);
}

/// A write failure for one game does not stop the batch.
#[tokio::test]
async fn test_write_failure_is_skipped() {
    let ctx = TestContext::new();
    ctx.store.fail_key("1");
    let source = MockScheduleSource::new()
        .with_game(
            fixtures::game_summary(1, "A", "B"),
            Some(fixtures::linescore(0, 0, 1, "Top")),
        )
        .with_game(
            fixtures::game_summary(2, "C", "D"),
            Some(fixtures::linescore(2, 1, 3, "Middle")),
        );
    let feed = ctx.games_feed(source);

    let report = feed.run_cycle().await.unwrap();

    assert_eq!(report.written, 1);
    assert_eq!(report.failed, 1);
    assert!(ctx.store.game(2).is_some());
    assert_eq!(ctx.store.write_attempts(), 2);
}

/// The database is unreachable: no provider calls are spent.
#[tokio::test]
async fn test_exhausted_connection_makes_no_requests() {
    let ctx = TestContext::new();
    ctx.connector.fail_always();
    let source = MockScheduleSource::new().with_game(
        fixtures::game_summary(1, "A", "B"),
        Some(fixtures::linescore(0, 0, 1, "Top")),
    );
    let feed = ctx.games_feed(source.clone());

    let err = feed.run_cycle().await.unwrap_err();

    assert!(err.is_terminal());
    assert_eq!(ctx.connector.attempts(), 5);
    assert_eq!(source.requests(), 0);
    assert!(!ctx.counter_path("mlb").exists());
    assert_eq!(ctx.connector.closes(), 0);
}

#[tokio::test]
async fn test_connection_recovers_within_attempts() {
    let ctx = TestContext::new();
    ctx.connector.fail_next(2);
    let source = MockScheduleSource::new().with_game(
        fixtures::game_summary(1, "A", "B"),
        Some(fixtures::linescore(0, 0, 1, "Top")),
    );
    let feed = ctx.games_feed(source);

    let report = feed.run_cycle().await.unwrap();

    assert_eq!(ctx.connector.attempts(), 3);
    assert_eq!(report.written, 1);
}

/// Once the daily quota is spent, remaining games are skipped.
#[tokio::test]
async fn test_quota_limit_skips_remaining_games() {
    let ctx = TestContext::new();
    let source = MockScheduleSource::new()
        .with_game(
            fixtures::game_summary(1, "A", "B"),
            Some(fixtures::linescore(0, 0, 1, "Top")),
        )
        .with_game(
            fixtures::game_summary(2, "C", "D"),
            Some(fixtures::linescore(2, 1, 3, "Middle")),
        )
        .with_game(
            fixtures::game_summary(3, "E", "F"),
            Some(fixtures::linescore(1, 1, 4, "End")),
        );
    let feed = ctx.games_feed_with_limits(
        source.clone(),
        QuotaLimits {
            daily: Some(2),
            monthly: None,
        },
    );

    let report = feed.run_cycle().await.unwrap();

    assert_eq!(report.processed, 3);
    assert_eq!(report.written, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(source.requests(), 2);

    // Nothing left for the schedule request either
    let err = feed.run_cycle().await.unwrap_err();
    assert!(matches!(err, Error::QuotaExhausted(_)));
}
