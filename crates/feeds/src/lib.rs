//! Upstream data providers.
//!
//! Each provider sits behind a small trait so the worker can be exercised
//! against in-memory sources.

pub mod config;
pub mod fmp;
pub mod http;
pub mod mlb;

pub use config::*;
pub use fmp::{FmpClient, QuoteSource};
pub use mlb::{GameSummary, Linescore, MlbClient, ScheduleSource};
