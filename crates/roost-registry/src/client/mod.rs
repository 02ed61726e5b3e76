//! HTTP client for the registry API, with connection pooling and bounded
//! retry for transient failures.

use std::time::Duration;

use indexmap::IndexMap;
use reqwest::{header, Client, ClientBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use roost_core::env::registry_endpoint;
use roost_core::error::{RoostError, RoostResult};

use crate::api::{Module, PiecesRequest, PiecesResponse, PublishRequest, PublishResponse};

/// Configuration for exponential backoff retry logic
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// Client for the Roost registry REST API
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Retry configuration
    retry: RetryConfig,
    /// Base registry URL
    endpoint: String,
}

impl RegistryClient {
    /// Create a client against the configured registry endpoint
    pub fn new() -> RoostResult<Self> {
        Self::with_config(registry_endpoint(), RetryConfig::default())
    }

    /// Create a client against a specific endpoint
    pub fn with_endpoint(endpoint: impl Into<String>) -> RoostResult<Self> {
        Self::with_config(endpoint.into(), RetryConfig::default())
    }

    fn with_config(endpoint: String, retry: RetryConfig) -> RoostResult<Self> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .gzip(true)
            .user_agent(concat!("roost/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RoostError::http("failed to create HTTP client".to_string(), e))?;

        Ok(Self {
            client,
            retry,
            endpoint,
        })
    }

    /// Registry base URL this client talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch module metadata; `Ok(None)` when the module does not exist
    pub async fn fetch_module(&self, name: &str) -> RoostResult<Option<Module>> {
        let url = format!("{}/api/package/{}", self.endpoint, name);
        debug!(%url, "fetching module metadata");

        self.with_retry(|| async {
            let response = self.client.get(&url).send().await.map_err(|e| {
                RoostError::http(format!("failed to fetch module '{name}'"), e)
            })?;

            match response.status() {
                StatusCode::NOT_FOUND => Ok(None),
                status if status.is_success() => {
                    let module = response.json::<Module>().await.map_err(|e| {
                        RoostError::http(format!("failed to decode module '{name}'"), e)
                    })?;
                    Ok(Some(module))
                },
                status => Err(RoostError::RegistryStatus {
                    status: status.as_u16(),
                    action: format!("fetching module '{name}'"),
                }),
            }
        })
        .await
    }

    /// Publish a module manifest, returning the upload authorization
    pub async fn publish(
        &self,
        api_key: &str,
        request: &PublishRequest,
    ) -> RoostResult<PublishResponse> {
        let url = format!("{}/api/publish", self.endpoint);
        debug!(%url, name = %request.name, version = %request.version, "publishing module");

        self.with_retry(|| async {
            let response = self
                .client
                .post(&url)
                .header(header::AUTHORIZATION, api_key)
                .json(request)
                .send()
                .await
                .map_err(|e| RoostError::http("failed to reach the registry".to_string(), e))?;

            decode(response, "publishing the module").await
        })
        .await
    }

    /// Upload the module's file pieces under a publish token
    pub async fn upload_pieces(
        &self,
        token: &str,
        pieces: &IndexMap<String, String>,
    ) -> RoostResult<PiecesResponse> {
        let url = format!("{}/api/piece", self.endpoint);
        let body = PiecesRequest {
            pieces: pieces.clone(),
            end: true,
        };
        debug!(%url, pieces = pieces.len(), "uploading pieces");

        self.with_retry(|| async {
            let response = self
                .client
                .post(&url)
                .header("X-UploadToken", token)
                .json(&body)
                .send()
                .await
                .map_err(|e| RoostError::http("failed to reach the registry".to_string(), e))?;

            decode(response, "uploading pieces").await
        })
        .await
    }

    /// Execute a request with exponential backoff on transient failures
    async fn with_retry<F, Fut, T>(&self, operation: F) -> RoostResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = RoostResult<T>>,
    {
        let mut delay = self.retry.initial_delay;
        let mut last_error = None;

        for attempt in 0..=self.retry.max_retries {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    let terminal = !is_transient(&error);
                    last_error = Some(error);

                    if terminal || attempt == self.retry.max_retries {
                        break;
                    }

                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay.mul_f64(self.retry.multiplier), self.retry.max_delay);
                },
            }
        }

        Err(last_error.unwrap_or_else(|| RoostError::Http {
            message: "retry loop ended without an error".to_string(),
            source: None,
        }))
    }
}

/// Decode a response body, mapping non-success statuses to errors
async fn decode<T: DeserializeOwned>(response: reqwest::Response, action: &str) -> RoostResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(RoostError::RegistryStatus {
            status: status.as_u16(),
            action: action.to_string(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| RoostError::http(format!("failed to decode response while {action}"), e))
}

/// Transport failures and server errors are worth retrying; everything
/// else is terminal.
fn is_transient(error: &RoostError) -> bool {
    match error {
        RoostError::Http { .. } => true,
        RoostError::RegistryStatus { status, .. } => *status >= 500,
        _ => false,
    }
}
