//! `reqwest`-backed transport
//!
//! One request in, one response out:
//! - waits on the optional rate limiter before sending
//! - applies the configured timeout and user agent
//! - classifies timeouts separately from other transport failures

use super::rate_limit::RateLimiter;
use super::transport::{RawResponse, Transport};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::request::HttpRequest;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Transport built on a shared `reqwest::Client`
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
    rate_limiter: Option<RateLimiter>,
}

impl ReqwestTransport {
    /// Build a transport from the client configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .build()?;

        Ok(Self::with_client(client, config))
    }

    /// Reuse an existing `reqwest::Client`
    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            timeout: config.timeout(),
            rate_limiter: config.rate_limit().map(RateLimiter::new),
        }
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    fn classify(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            Error::Http(err)
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        debug!("Sending {} {}", request.method, request.url);

        let mut req = self
            .client
            .request(request.method.into(), request.url)
            .headers(request.headers);

        if !request.query.is_empty() {
            req = req.query(request.query.as_pairs());
        }

        if let Some(ref body) = request.body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        debug!(status, bytes = body.len(), "Received response");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("timeout", &self.timeout)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}
