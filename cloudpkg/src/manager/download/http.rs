//! HTTP transport for manifests and file blobs.
//!
//! Wraps a blocking `reqwest` client. Each fetch is a single GET whose body is
//! streamed to the caller; there is no range resume since every transfer
//! restarts from zero into a fresh staging file.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::manager::error::{ManagerError, ManagerResult};
use crate::manager::traits::{FetchResponse, PackageFetcher};

/// Default connect timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP-based package fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    pub(crate) timeout: Duration,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher with default settings.
    pub fn new() -> ManagerResult<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new HTTP fetcher with a custom connect timeout.
    ///
    /// The timeout bounds connection setup only. Bodies of large files may
    /// legitimately stream for much longer.
    pub fn with_timeout(timeout: Duration) -> ManagerResult<Self> {
        Self::build(timeout, None)
    }

    /// Create a new HTTP fetcher with a timeout and user agent.
    pub fn with_user_agent(timeout: Duration, user_agent: &str) -> ManagerResult<Self> {
        Self::build(timeout, Some(user_agent))
    }

    fn build(timeout: Duration, user_agent: Option<&str>) -> ManagerResult<Self> {
        // reqwest's blocking client applies a 30s whole-request timeout by default
        let mut builder = Client::builder()
            .connect_timeout(timeout)
            .timeout(None::<Duration>);
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent.to_string());
        }

        let client = builder
            .build()
            .map_err(|e| ManagerError::HttpError(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }
}

impl PackageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> ManagerResult<FetchResponse> {
        debug!(url, "GET");

        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                ManagerError::Timeout {
                    url: url.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                }
            } else {
                ManagerError::DownloadFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ManagerError::DownloadFailed {
                url: url.to_string(),
                reason: format!("GET request failed with status {}", status),
            });
        }

        Ok(FetchResponse::new(response.content_length(), response))
    }
}
