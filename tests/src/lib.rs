//! Shared harness for the feed poller integration tests.

pub mod fixtures;
