//! Fixed-interval polling loop.

use std::time::{Duration, Instant};

use chrono::Utc;
use poller_core::Result;
use telemetry::{log_metrics, metrics};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::SchedulerConfig;
use crate::feed::{CycleReport, Feed};

/// What happened to one feed in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    /// The gate was closed; nothing ran.
    Gated,
    Completed(CycleReport),
    /// The cycle was aborted; the message is the logged cause.
    Failed(String),
}

/// Runs every feed in order, then sleeps, until cancelled.
pub struct Scheduler {
    feeds: Vec<Box<dyn Feed>>,
    config: SchedulerConfig,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig, cancel: CancellationToken) -> Self {
        Self {
            feeds: Vec::new(),
            config,
            cancel,
        }
    }

    pub fn with_feed(mut self, feed: impl Feed + 'static) -> Self {
        self.feeds.push(Box::new(feed));
        self
    }

    pub fn push_feed(&mut self, feed: Box<dyn Feed>) {
        self.feeds.push(feed);
    }

    pub fn feed_names(&self) -> Vec<&str> {
        self.feeds.iter().map(|f| f.name()).collect()
    }

    /// Loops until the token is cancelled.
    ///
    /// A cycle in flight always runs to completion; cancellation is observed
    /// between passes and during the sleep. With `fail_fast_on_connect`, a
    /// feed that exhausts its connection attempts ends the loop with that
    /// error.
    pub async fn run(&self) -> Result<()> {
        info!(
            feeds = ?self.feed_names(),
            interval_secs = self.config.interval_secs,
            fail_fast_on_connect = self.config.fail_fast_on_connect,
            "Scheduler starting"
        );

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            self.run_pass().await?;
            log_metrics(&metrics().snapshot());

            info!(
                interval_secs = self.config.interval_secs,
                "Sleeping until next pass"
            );
            if !sleep_or_cancel(self.config.interval(), &self.cancel).await {
                break;
            }
        }

        info!("Scheduler stopped");
        Ok(())
    }

    /// Runs each feed once, in order.
    pub async fn run_pass(&self) -> Result<Vec<FeedOutcome>> {
        let mut outcomes = Vec::with_capacity(self.feeds.len());
        for feed in &self.feeds {
            outcomes.push(self.run_feed(feed.as_ref()).await?);
        }
        Ok(outcomes)
    }

    async fn run_feed(&self, feed: &dyn Feed) -> Result<FeedOutcome> {
        let name = feed.name();

        if let Some(gate) = feed.gate() {
            let status = gate.evaluate(Utc::now());
            info!(feed = name, "{}", status.message);
            if !status.open {
                metrics().cycles_gated.inc();
                return Ok(FeedOutcome::Gated);
            }
        }

        info!(feed = name, "Starting feed cycle");
        let start = Instant::now();
        let result = feed.run_cycle().await;
        let elapsed = start.elapsed();
        metrics().cycles_run.inc();
        metrics()
            .cycle_latency_ms
            .observe(elapsed.as_millis() as u64);

        match result {
            Ok(report) => {
                info!(
                    feed = name,
                    processed = report.processed,
                    written = report.written,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Feed cycle complete"
                );
                Ok(FeedOutcome::Completed(report))
            }
            Err(e) if e.is_terminal() && self.config.fail_fast_on_connect => {
                metrics().cycles_failed.inc();
                error!(feed = name, error = %e, "Exiting after exhausting connection attempts");
                Err(e)
            }
            Err(e) => {
                metrics().cycles_failed.inc();
                if e.is_terminal() {
                    error!(feed = name, error = %e, "Skipping feed until next pass");
                } else {
                    warn!(feed = name, error = %e, "Feed cycle failed");
                }
                Ok(FeedOutcome::Failed(e.to_string()))
            }
        }
    }
}

/// Sleeps `duration` unless `cancel` fires first. Returns false if cancelled.
pub async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
