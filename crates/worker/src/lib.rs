//! Feed cycles and the polling scheduler.
//!
//! - Games (MLB schedule + linescores → `MLB` table)
//! - Quotes (FMP quotes → `nuStockTracker` table, market-hours gated)
//! - Scheduler (fixed-interval loop over all enabled feeds)

pub mod config;
pub mod feed;
pub mod games;
pub mod quotes;
pub mod scheduler;

pub use config::*;
pub use feed::{CycleReport, Feed};
pub use games::GamesFeed;
pub use quotes::QuotesFeed;
pub use scheduler::*;
