//! Source retrieval for canonical URLs.
//!
//! Remote modules are fetched over HTTP, local modules are read from disk.
//! A single failed fetch surfaces as an error sentinel in the dependency
//! tree; this layer never retries (retry policy belongs to the registry
//! client, not the resolver).

use std::time::Duration;

use roost_core::error::{RoostError, RoostResult};
use url::Url;

use crate::url::is_remote;

/// Fetches module source text from `http(s)://` and `file://` URLs.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    client: reqwest::Client,
}

impl SourceFetcher {
    /// Create a fetcher with a pooled HTTP client
    pub fn new() -> RoostResult<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .gzip(true)
            .user_agent(concat!("roost/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RoostError::http("failed to create HTTP client".to_string(), e))?;

        Ok(Self { client })
    }

    /// Retrieve the source text behind a canonical URL
    pub async fn fetch(&self, url: &str) -> RoostResult<String> {
        if is_remote(url) {
            self.fetch_remote(url).await
        } else {
            self.fetch_local(url).await
        }
    }

    async fn fetch_remote(&self, url: &str) -> RoostResult<String> {
        let response = self.client.get(url).send().await.map_err(|e| RoostError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RoostError::Fetch {
                url: url.to_string(),
                reason: format!("unexpected status {status}"),
            });
        }

        response.text().await.map_err(|e| RoostError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn fetch_local(&self, url: &str) -> RoostResult<String> {
        let parsed = Url::parse(url).map_err(|e| RoostError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let path = parsed.to_file_path().map_err(|_| RoostError::Fetch {
            url: url.to_string(),
            reason: "not a file URL".to_string(),
        })?;

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| RoostError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}
