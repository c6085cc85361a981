//! Durable accounting of outbound provider calls.
//!
//! Each feed owns one counter file holding a daily and a monthly tally:
//!
//! ```json
//! { "daily": { "date": "2024-06-03", "count": 12 },
//!   "monthly": { "month": "2024-06", "count": 340 } }
//! ```
//!
//! Periods are reckoned in the process's local calendar. Only the current
//! period is retained; a rollover restarts the tally at the triggering call.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

const DAY_FORMAT: &str = "%Y-%m-%d";
const MONTH_FORMAT: &str = "%Y-%m";

/// Tally for the current calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: String,
    pub count: u64,
}

/// Tally for the current calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub month: String,
    pub count: u64,
}

/// Persisted counter state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallCounts {
    pub daily: DailyCount,
    pub monthly: MonthlyCount,
}

impl CallCounts {
    /// Zeroed counts labelled for `today`.
    pub fn fresh(today: NaiveDate) -> Self {
        Self {
            daily: DailyCount {
                date: today.format(DAY_FORMAT).to_string(),
                count: 0,
            },
            monthly: MonthlyCount {
                month: today.format(MONTH_FORMAT).to_string(),
                count: 0,
            },
        }
    }

    /// Counts as they stand on `today`, zeroing any scope whose period ended.
    pub fn rolled(&self, today: NaiveDate) -> Self {
        let fresh = Self::fresh(today);
        Self {
            daily: if self.daily.date == fresh.daily.date {
                self.daily.clone()
            } else {
                fresh.daily
            },
            monthly: if self.monthly.month == fresh.monthly.month {
                self.monthly.clone()
            } else {
                fresh.monthly
            },
        }
    }

    /// Counts after one more call made on `today`.
    pub fn increment(&self, today: NaiveDate) -> Self {
        let mut next = self.rolled(today);
        next.daily.count += 1;
        next.monthly.count += 1;
        next
    }

    /// True once either tally has reached its limit.
    pub fn exceeds(&self, limits: &QuotaLimits) -> bool {
        let daily = limits.daily.is_some_and(|limit| self.daily.count >= limit);
        let monthly = limits
            .monthly
            .is_some_and(|limit| self.monthly.count >= limit);
        daily || monthly
    }
}

/// Provider-imposed call limits. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaLimits {
    pub daily: Option<u64>,
    pub monthly: Option<u64>,
}

/// File-backed call counters.
///
/// Read-modify-write is serialized through an internal mutex so concurrent
/// requests never lose an increment. Only one process may use a given file.
/// All I/O is blocking `std::fs`; the file is a few dozen bytes.
#[derive(Debug)]
pub struct CallCounterStore {
    path: PathBuf,
    limits: QuotaLimits,
    lock: Mutex<()>,
}

impl CallCounterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            limits: QuotaLimits::default(),
            lock: Mutex::new(()),
        }
    }

    pub fn with_limits(mut self, limits: QuotaLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records one outbound call made now.
    pub fn record_call(&self) -> Result<CallCounts> {
        self.record_call_on(Local::now().date_naive())
    }

    /// Records one outbound call made on `today` and persists before returning.
    pub fn record_call_on(&self, today: NaiveDate) -> Result<CallCounts> {
        let _guard = self.lock.lock();
        let previous = self.load(today);
        self.commit(&previous, today)
    }

    /// Records one call now unless a configured limit has been reached.
    ///
    /// Synchronous: the file is read and rewritten under the lock before
    /// returning. Callers on an async runtime block their worker for one
    /// small file write per request.
    pub fn try_record_call(&self) -> Result<CallCounts> {
        self.try_record_call_on(Local::now().date_naive())
    }

    /// Checks the limits and records under the same lock, so concurrent
    /// callers cannot overshoot the quota.
    pub fn try_record_call_on(&self, today: NaiveDate) -> Result<CallCounts> {
        let _guard = self.lock.lock();
        let previous = self.load(today);

        let current = previous.rolled(today);
        if current.exceeds(&self.limits) {
            return Err(Error::quota_exhausted(format!(
                "{} daily / {} monthly calls recorded in {}",
                current.daily.count,
                current.monthly.count,
                self.path.display()
            )));
        }

        self.commit(&previous, today)
    }

    fn commit(&self, previous: &CallCounts, today: NaiveDate) -> Result<CallCounts> {
        let next = previous.increment(today);

        if next.daily.date != previous.daily.date {
            info!(
                path = %self.path.display(),
                date = %next.daily.date,
                "Reset daily API call count for a new day"
            );
        }
        if next.monthly.month != previous.monthly.month {
            info!(
                path = %self.path.display(),
                month = %next.monthly.month,
                "Reset monthly API call count for a new month"
            );
        }

        self.persist(&next)?;

        debug!(
            path = %self.path.display(),
            daily = next.daily.count,
            monthly = next.monthly.count,
            "Updated API call count"
        );

        Ok(next)
    }

    /// Current counts without recording a call.
    pub fn current(&self) -> CallCounts {
        self.current_on(Local::now().date_naive())
    }

    pub fn current_on(&self, today: NaiveDate) -> CallCounts {
        let _guard = self.lock.lock();
        self.load(today).rolled(today)
    }

    fn load(&self, today: NaiveDate) -> CallCounts {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No API call count file, starting fresh");
                return CallCounts::fresh(today);
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Unreadable API call count file, starting fresh"
                );
                return CallCounts::fresh(today);
            }
        };

        match serde_json::from_str(&raw) {
            Ok(counts) => counts,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Corrupt API call count file, starting fresh"
                );
                CallCounts::fresh(today)
            }
        }
    }

    fn persist(&self, counts: &CallCounts) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(counts)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
