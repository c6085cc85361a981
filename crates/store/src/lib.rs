//! Relational persistence for the feed poller.

pub mod config;
pub mod connector;
pub mod mysql;
pub mod schema;
pub mod upsert;

pub use config::*;
pub use connector::{Connect, RetryConnector};
pub use mysql::{MySqlConnector, MySqlStore};
pub use upsert::{upsert_all, RecordWriter, UpsertReport};
