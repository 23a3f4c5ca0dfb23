//! Pre-flight reachability probe against the server's `/health` endpoint.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("health probe failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("health probe returned status {0}")]
    HttpStatus(StatusCode),
}

/// GET the health endpoint and require a success status. Any network failure
/// or non-2xx response means the server is treated as unreachable.
pub async fn probe(url: &Url, timeout: Duration) -> Result<(), HealthError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    debug!(%url, "probing server health");
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(HealthError::HttpStatus(status));
    }
    debug!(%url, %status, "health probe succeeded");
    Ok(())
}
