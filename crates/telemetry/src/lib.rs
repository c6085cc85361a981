//! Internal telemetry for the feed poller.
//!
//! Structured logs go to stdout; counters live in-process and are logged
//! by the scheduler after every pass.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::*;
pub use tracing_setup::*;
