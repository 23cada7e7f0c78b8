//! Transport collaborator contract and the default HTTP implementation

use crate::codec::PhysicalRequest;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default User-Agent
const USER_AGENT: &str = concat!("radiobar/", env!("CARGO_PKG_VERSION"));

/// Transport collaborator: submits one physical request and returns the raw
/// response body.
///
/// Failures carry their message in the error value; the executor treats every
/// transport error as retryable.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn submit(&self, request: &PhysicalRequest) -> Result<String>;
}

/// HTTP transport: POST with a JSON body, the method as a query parameter
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport for the given API base URL
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(&self, request: &PhysicalRequest) -> Result<String> {
        let url = format!("{}?method={}", self.base_url, request.method);
        debug!(method = %request.method, "POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request.body)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // protocol errors ride the JSON envelope with HTTP 200; anything
            // else is a connectivity/service problem and retryable
            return Err(Error::Transport(format!("HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }
}
