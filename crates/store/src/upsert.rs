//! Idempotent batch writes.
//!
//! Every feed goes through [`upsert_all`], so the failure policy is the same
//! everywhere: a record that fails to write is logged with its key and the
//! batch moves on to the next record.

use std::time::Instant;

use async_trait::async_trait;
use poller_core::{Record, Result};
use telemetry::metrics;
use tracing::{debug, error};

/// Insert-or-update keyed by the record's natural key.
#[async_trait]
pub trait RecordWriter<R: Record>: Send {
    async fn upsert(&mut self, record: &R) -> Result<()>;
}

/// Outcome of writing one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertReport {
    pub written: usize,
    pub failed: usize,
}

/// Writes every record, continuing past individual failures.
pub async fn upsert_all<R, W>(writer: &mut W, records: &[R]) -> UpsertReport
where
    R: Record,
    W: RecordWriter<R> + ?Sized,
{
    let mut report = UpsertReport::default();
    let start = Instant::now();

    for record in records {
        match writer.upsert(record).await {
            Ok(()) => report.written += 1,
            Err(e) => {
                report.failed += 1;
                metrics().write_errors.inc();
                error!(
                    kind = R::KIND,
                    key = %record.natural_key(),
                    error = %e,
                    "Failed to upsert record"
                );
            }
        }
    }

    metrics().records_written.inc_by(report.written as u64);
    metrics()
        .write_latency_ms
        .observe(start.elapsed().as_millis() as u64);

    debug!(
        kind = R::KIND,
        written = report.written,
        failed = report.failed,
        "Upserted batch"
    );

    report
}
