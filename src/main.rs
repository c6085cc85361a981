//! Feed Poller
//!
//! Periodically pulls data from public APIs into MySQL:
//! - MLB Stats API schedule and linescores → `MLB`
//! - Financial Modeling Prep quotes (market hours only) → `nuStockTracker`
//!
//! Both feeds run in sequence every pass, followed by a fixed sleep.

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use feeds::{FmpClient, MlbClient};
use poller_core::{CallCounterStore, MarketHours};
use store::{MySqlConnector, RetryConnector};
use telemetry::init_tracing_from_env;
use worker::{GamesFeed, GamesFeedConfig, QuotesFeed, QuotesFeedConfig, Scheduler, SchedulerConfig};

/// Application configuration.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default)]
    scheduler: SchedulerConfig,

    #[serde(default)]
    mlb: GamesFeedConfig,

    #[serde(default)]
    fmp: QuotesFeedConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting Feed Poller v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;

    let cancel = CancellationToken::new();
    let scheduler = build_scheduler(&config, cancel.clone())?;

    if scheduler.feed_names().is_empty() {
        warn!("No feeds enabled, nothing to do");
        return Ok(());
    }

    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Finishing current cycle before shutdown");
        cancel.cancel();
    });

    scheduler
        .run()
        .await
        .context("Scheduler stopped on a fatal error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Builds the scheduler with every enabled feed, in a fixed order.
fn build_scheduler(config: &Config, cancel: CancellationToken) -> Result<Scheduler> {
    let max_concurrent = config.scheduler.max_concurrent_requests;
    let mut scheduler = Scheduler::new(config.scheduler.clone(), cancel);

    if config.mlb.enabled {
        let mlb = &config.mlb;
        let source = MlbClient::new(mlb.api.clone()).context("Failed to create MLB client")?;
        let connector = RetryConnector::new(MySqlConnector::new(mlb.database.clone()), &mlb.retry);
        let counter = CallCounterStore::new(&mlb.counter_file).with_limits(mlb.limits);

        info!(
            db = %mlb.database.display_target(),
            counter_file = %mlb.counter_file.display(),
            "MLB feed enabled"
        );
        scheduler.push_feed(Box::new(
            GamesFeed::new(source, connector, counter).with_max_concurrent(max_concurrent),
        ));
    }

    if config.fmp.enabled {
        let fmp = &config.fmp;
        if fmp.api.api_key.is_empty() {
            warn!("FMP API key is not set, quote requests will be rejected");
        }

        let source = FmpClient::new(fmp.api.clone()).context("Failed to create FMP client")?;
        let connector = RetryConnector::new(MySqlConnector::new(fmp.database.clone()), &fmp.retry);
        let counter = CallCounterStore::new(&fmp.counter_file).with_limits(fmp.limits);
        let gate = MarketHours::from_config(&fmp.market_hours)
            .context("Invalid market hours configuration")?;

        info!(
            db = %fmp.database.display_target(),
            counter_file = %fmp.counter_file.display(),
            symbols = ?fmp.symbols,
            "FMP feed enabled"
        );
        scheduler.push_feed(Box::new(
            QuotesFeed::new(source, connector, counter, fmp.symbols.clone())
                .with_gate(gate)
                .with_max_concurrent(max_concurrent),
        ));
    }

    Ok(scheduler)
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("POLLER")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Secrets are commonly provided as flat variables
    if let Ok(key) = std::env::var("FMP_API_KEY") {
        config.fmp.api.api_key = key;
    }
    if let Ok(password) = std::env::var("POLLER_MLB_DATABASE_PASSWORD") {
        config.mlb.database.password = password;
    }
    if let Ok(password) = std::env::var("POLLER_FMP_DATABASE_PASSWORD") {
        config.fmp.database.password = password;
    }
    if let Ok(symbols) = std::env::var("POLLER_FMP_SYMBOLS") {
        config.fmp.symbols = symbols.split(',').map(|s| s.trim().to_string()).collect();
    }

    Ok(config)
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
