//! Connection establishment with bounded, fixed-delay retries.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use poller_core::{Error, Result};
use telemetry::metrics;
use tracing::{debug, error, info};

use crate::config::RetryConfig;

/// Something that can open a connection to a destination.
#[async_trait]
pub trait Connect: Send + Sync {
    type Connection: Send;

    /// Makes a single connection attempt.
    async fn connect(&self) -> Result<Self::Connection>;

    /// Destination label for logs.
    fn target(&self) -> String;

    /// Releases a connection at the end of a cycle. The default just drops it.
    async fn close(&self, conn: Self::Connection) {
        drop(conn);
    }
}

/// Wraps a [`Connect`] with a fixed number of attempts and a constant delay.
///
/// Exhausting the attempts yields [`Error::ConnectionExhausted`]; what that
/// means for the process is the caller's decision.
pub struct RetryConnector<C> {
    inner: C,
    max_attempts: u32,
    delay: Duration,
}

impl<C: Connect> RetryConnector<C> {
    pub fn new(inner: C, config: &RetryConfig) -> Self {
        Self::with_policy(inner, config.max_attempts, config.delay())
    }

    pub fn with_policy(inner: C, max_attempts: u32, delay: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub async fn close(&self, conn: C::Connection) {
        self.inner.close(conn).await;
        debug!(db = %self.inner.target(), "Closed database connection");
    }

    pub async fn connect(&self) -> Result<C::Connection> {
        let target = self.inner.target();
        let mut attempt = 0;

        loop {
            attempt += 1;
            info!(
                db = %target,
                attempt = attempt,
                max_attempts = self.max_attempts,
                "Attempting to connect to the database"
            );

            let start = Instant::now();
            match self.inner.connect().await {
                Ok(conn) => {
                    metrics()
                        .connect_latency_ms
                        .observe(start.elapsed().as_millis() as u64);
                    info!(db = %target, attempt = attempt, "Connected to the database");
                    return Ok(conn);
                }
                Err(e) => {
                    metrics().connect_failures.inc();
                    error!(
                        db = %target,
                        attempt = attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Failed to connect to the database"
                    );

                    if attempt >= self.max_attempts {
                        error!(
                            db = %target,
                            attempts = attempt,
                            "Maximum connection attempts reached"
                        );
                        return Err(Error::exhausted(attempt, e));
                    }

                    info!(
                        db = %target,
                        delay_secs = self.delay.as_secs(),
                        "Retrying connection"
                    );
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }
}
