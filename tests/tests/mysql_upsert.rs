//! Upsert behavior against a real MariaDB.
//!
//! Requires Docker (or `POLLER_TEST_DB_HOST` pointing at a server). Run with
//! `cargo test -p integration-tests --test mysql_upsert -- --ignored`.

use integration_tests::{containers::TestDatabase, fixtures, mocks::MockScheduleSource};
use poller_core::CallCounterStore;
use store::{upsert_all, MySqlConnector, RecordWriter, RetryConnector};
use tempfile::TempDir;
use worker::{Feed, GamesFeed};

/// Writing the same game twice leaves one row holding the latest values.
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_game_upsert_is_idempotent() {
    let db = TestDatabase::start().await;
    let mut store = db.connect().await;

    let mut game = fixtures::game_record(990001, "In Progress");
    store.upsert(&game).await.unwrap();
    game.home_score = Some(4);
    game.inning = Some(9);
    game.status = "Final".to_string();
    store.upsert(&game).await.unwrap();

    let row = store.fetch_game(990001).await.unwrap().unwrap();
    assert_eq!(row, game);

    let count: i64 = store.count_games().await.unwrap();
    assert!(count >= 1);
    store.close().await;
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_quote_upsert_refreshes_price() {
    let db = TestDatabase::start().await;
    let mut store = db.connect().await;

    let report = upsert_all(
        &mut store,
        &[fixtures::quote("ZZTEST", 10.0), fixtures::quote("ZZTEST", 12.5)],
    )
    .await;

    assert_eq!(report.written, 2);
    assert_eq!(store.fetch_quote_price("ZZTEST").await.unwrap(), Some(12.5));
    assert!(store.count_quotes().await.unwrap() >= 1);
    store.close().await;
}

/// NULL provider columns are accepted by the schema.
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_sparse_quote_is_stored() {
    let db = TestDatabase::start().await;
    let mut store = db.connect().await;

    let fund = fixtures::sparse_quote("ZZFUND", 41.2);
    store.upsert(&fund).await.unwrap();

    assert_eq!(store.fetch_quote_price("ZZFUND").await.unwrap(), Some(41.2));
    store.close().await;
}

/// Full games cycle through the real connector and schema bootstrap.
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_games_cycle_against_mariadb() {
    let db = TestDatabase::start().await;
    // Let the container finish initializing before the feed's own retries
    db.connect().await.close().await;

    let dir = TempDir::new().unwrap();
    let source = MockScheduleSource::new()
        .with_game(
            fixtures::game_summary(990101, "Boston Red Sox", "New York Yankees"),
            Some(fixtures::linescore(3, 2, 7, "Top")),
        )
        .with_game(
            fixtures::game_summary(990102, "Los Angeles Angels", "Seattle Mariners"),
            None,
        );
    let feed = GamesFeed::new(
        source,
        RetryConnector::with_policy(
            MySqlConnector::new(db.config.clone()),
            5,
            std::time::Duration::from_secs(1),
        ),
        CallCounterStore::new(dir.path().join("mlb.json")),
    )
    .with_date(fixtures::game_day());

    let report = feed.run_cycle().await.unwrap();
    assert_eq!(report.processed, 2);
    assert_eq!(report.written, 1);

    let mut store = db.connect().await;
    let row = store.fetch_game(990101).await.unwrap().unwrap();
    assert_eq!(row.home_score, Some(3));
    assert_eq!(row.inning_state, "Top");
    assert!(store.fetch_game(990102).await.unwrap().is_none());
    store.close().await;
}
