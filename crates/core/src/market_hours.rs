//! Trading-window gate.
//!
//! Decides whether a polling cycle is worth running. The window is expressed
//! in one canonical timezone so the answer does not depend on where the
//! process runs.

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateStatus {
    pub open: bool,
    /// Human-readable status line. Not used for control flow.
    pub message: String,
}

/// A predicate suppressing work outside an active window.
pub trait Gate: Send + Sync {
    fn evaluate(&self, now: DateTime<Utc>) -> GateStatus;
}

/// Market hours configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketHoursConfig {
    /// IANA zone the window is defined in
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// IANA zone used for the leading timestamp in status messages
    #[serde(default = "default_observer_timezone")]
    pub observer_timezone: String,
    /// Opening time, `HH:MM` or `HH:MM:SS`
    #[serde(default = "default_open")]
    pub open: String,
    /// Closing time, inclusive
    #[serde(default = "default_close")]
    pub close: String,
    /// Name for the window zone in status messages. Defaults to "Eastern
    /// Time" for New York and to the IANA name otherwise.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_observer_timezone() -> String {
    "America/Los_Angeles".to_string()
}

fn default_open() -> String {
    "09:30".to_string()
}

fn default_close() -> String {
    "16:00".to_string()
}

impl Default for MarketHoursConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            observer_timezone: default_observer_timezone(),
            open: default_open(),
            close: default_close(),
            label: None,
        }
    }
}

/// Weekday trading window, inclusive at both ends.
#[derive(Debug, Clone)]
pub struct MarketHours {
    timezone: Tz,
    observer: Tz,
    open: NaiveTime,
    close: NaiveTime,
    label: String,
}

impl MarketHours {
    pub fn new(timezone: Tz, observer: Tz, open: NaiveTime, close: NaiveTime) -> Self {
        Self {
            timezone,
            observer,
            open,
            close,
            label: zone_label(timezone),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Regular US equity session: 09:30-16:00 New York, observed from Los Angeles.
    pub fn us_equities() -> Self {
        Self::new(
            chrono_tz::America::New_York,
            chrono_tz::America::Los_Angeles,
            NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default(),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
        )
    }

    pub fn from_config(config: &MarketHoursConfig) -> Result<Self> {
        let timezone = parse_tz(&config.timezone)?;
        let observer = parse_tz(&config.observer_timezone)?;
        let open = parse_time(&config.open)?;
        let close = parse_time(&config.close)?;

        if open > close {
            return Err(Error::config(format!(
                "market open {} is after close {}",
                config.open, config.close
            )));
        }

        let hours = Self::new(timezone, observer, open, close);
        Ok(match &config.label {
            Some(label) => hours.with_label(label.clone()),
            None => hours,
        })
    }

    /// Whether `now` falls inside the window.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.timezone);
        let weekend = matches!(local.weekday(), Weekday::Sat | Weekday::Sun);
        let time = local.time();

        !weekend && time >= self.open && time <= self.close
    }
}

impl Gate for MarketHours {
    fn evaluate(&self, now: DateTime<Utc>) -> GateStatus {
        let open = self.is_open_at(now);
        let canonical = now.with_timezone(&self.timezone);
        let observed = now.with_timezone(&self.observer);

        let message = format!(
            "[{}] Stock Market is {} ({}: {})",
            observed.format(TIME_FORMAT),
            if open { "OPEN" } else { "CLOSED" },
            self.label,
            canonical.format(TIME_FORMAT),
        );

        GateStatus { open, message }
    }
}

fn zone_label(zone: Tz) -> String {
    if zone == chrono_tz::America::New_York {
        "Eastern Time".to_string()
    } else {
        zone.name().to_string()
    }
}

fn parse_tz(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| Error::config(format!("unknown timezone {name}: {e}")))
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|e| Error::config(format!("invalid time {raw}: {e}")))
}
