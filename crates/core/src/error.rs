//! Unified error types for the feed poller.
//!
//! Errors fall into a small taxonomy:
//! - Connection / ConnectionExhausted: store unreachable (transient vs terminal)
//! - Upstream: an HTTP call to a data provider failed or returned garbage
//! - Database: a single write failed
//! - QuotaExhausted: the provider call budget for the period is used up

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the feed poller.
#[derive(Debug, Error)]
pub enum Error {
    /// A single connection attempt failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// Every connection attempt failed; no further local retry.
    #[error("connection failed after {attempts} attempts: {source}")]
    ConnectionExhausted {
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("call quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Wrap the last attempt's failure into a terminal error.
    pub fn exhausted(attempts: u32, last: Error) -> Self {
        Self::ConnectionExhausted {
            attempts,
            source: Box::new(last),
        }
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn quota_exhausted(msg: impl Into<String>) -> Self {
        Self::QuotaExhausted(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True when no further local retry will be attempted for this error.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ConnectionExhausted { .. })
    }
}
