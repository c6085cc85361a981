//! Internal metrics collection.
//!
//! Counters are process-wide and monotonic; the scheduler logs a snapshot
//! after each pass so operators can follow throughput and error rates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 10ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s, 30s, 60s
    buckets: [AtomicU64; 10],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 10] = [10, 50, 100, 250, 500, 1000, 5000, 10000, 30000, 60000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        for (i, &bound) in Self::BUCKET_BOUNDS.iter().enumerate() {
            if ms <= bound {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        // Value exceeds all buckets, add to last
        self.buckets[9].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the poller.
#[derive(Debug, Default)]
pub struct Metrics {
    // Scheduler
    pub cycles_run: Counter,
    pub cycles_gated: Counter,
    pub cycles_failed: Counter,

    // Upstream providers
    pub api_calls: Counter,
    pub fetch_errors: Counter,
    pub records_fetched: Counter,
    pub items_skipped: Counter,

    // Store
    pub connect_failures: Counter,
    pub records_written: Counter,
    pub write_errors: Counter,

    // Latency histograms
    pub cycle_latency_ms: Histogram,
    pub connect_latency_ms: Histogram,
    pub write_latency_ms: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub cycles_run: u64,
    pub cycles_gated: u64,
    pub cycles_failed: u64,
    pub api_calls: u64,
    pub fetch_errors: u64,
    pub records_fetched: u64,
    pub items_skipped: u64,
    pub connect_failures: u64,
    pub records_written: u64,
    pub write_errors: u64,
    pub cycle_latency_mean_ms: f64,
    pub connect_latency_mean_ms: f64,
    pub write_latency_mean_ms: f64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            cycles_run: self.cycles_run.get(),
            cycles_gated: self.cycles_gated.get(),
            cycles_failed: self.cycles_failed.get(),
            api_calls: self.api_calls.get(),
            fetch_errors: self.fetch_errors.get(),
            records_fetched: self.records_fetched.get(),
            items_skipped: self.items_skipped.get(),
            connect_failures: self.connect_failures.get(),
            records_written: self.records_written.get(),
            write_errors: self.write_errors.get(),
            cycle_latency_mean_ms: self.cycle_latency_ms.mean(),
            connect_latency_mean_ms: self.connect_latency_ms.mean(),
            write_latency_mean_ms: self.write_latency_ms.mean(),
        }
    }
}

/// Logs a snapshot as one structured line.
pub fn log_metrics(snapshot: &MetricsSnapshot) {
    info!(
        cycles_run = snapshot.cycles_run,
        cycles_gated = snapshot.cycles_gated,
        cycles_failed = snapshot.cycles_failed,
        api_calls = snapshot.api_calls,
        fetch_errors = snapshot.fetch_errors,
        records_fetched = snapshot.records_fetched,
        items_skipped = snapshot.items_skipped,
        connect_failures = snapshot.connect_failures,
        records_written = snapshot.records_written,
        write_errors = snapshot.write_errors,
        cycle_latency_mean_ms = snapshot.cycle_latency_mean_ms,
        "Poller metrics"
    );
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
