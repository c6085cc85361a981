//! Core types, gating, and call accounting for the feed poller.

pub mod error;
pub mod market_hours;
pub mod quota;
pub mod records;

pub use error::{Error, Result};
pub use market_hours::*;
pub use quota::*;
pub use records::*;
