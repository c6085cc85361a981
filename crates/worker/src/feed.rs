//! The unit of work the scheduler drives.

use async_trait::async_trait;
use poller_core::{CallCounterStore, Error, Gate, Result};
use telemetry::metrics;
use tracing::warn;

/// Summary of one feed cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Items listed for this cycle (games on the schedule, symbols polled)
    pub processed: usize,
    /// Records obtained from the provider
    pub fetched: usize,
    /// Items dropped before writing
    pub skipped: usize,
    pub written: usize,
    pub failed: usize,
}

/// One data pipeline: connect, fetch, write.
#[async_trait]
pub trait Feed: Send + Sync {
    fn name(&self) -> &str;

    /// Gate consulted before each cycle. `None` means always run.
    fn gate(&self) -> Option<&dyn Gate> {
        None
    }

    /// Runs one full cycle.
    ///
    /// Errors abort this cycle only; per-item failures are absorbed and
    /// show up in the report.
    async fn run_cycle(&self) -> Result<CycleReport>;
}

/// Records an outbound request against the feed's counters.
///
/// A reached quota is returned so the caller can skip the request. Failing
/// to persist the counts is logged and the request goes ahead.
pub(crate) fn account_call(feed: &str, counter: &CallCounterStore) -> Result<()> {
    match counter.try_record_call() {
        Ok(_) => {
            metrics().api_calls.inc();
            Ok(())
        }
        Err(e @ Error::QuotaExhausted(_)) => {
            warn!(feed = feed, error = %e, "API call quota reached, skipping request");
            Err(e)
        }
        Err(e) => {
            metrics().api_calls.inc();
            warn!(
                feed = feed,
                path = %counter.path().display(),
                error = %e,
                "Failed to persist API call count"
            );
            Ok(())
        }
    }
}
