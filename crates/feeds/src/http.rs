//! Shared HTTP plumbing.

use std::time::Duration;

use poller_core::{Error, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// Builds a client whose every request is bounded by `timeout`.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("feed-poller/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))
}

/// Sends a GET and decodes a JSON body, treating non-2xx as an error.
///
/// URLs are stripped from error messages since they may carry an API key.
pub async fn get_json<T: DeserializeOwned>(request: RequestBuilder, what: &str) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| Error::upstream(format!("{what}: {}", e.without_url())))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::upstream(format!("{what}: status {status}")));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| Error::upstream(format!("{what}: invalid body: {}", e.without_url())))
}
