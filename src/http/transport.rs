//! The transport seam
//!
//! Everything above this trait is transport-agnostic. A transport performs
//! exactly one round trip per call and never retries.

use crate::error::Result;
use crate::request::HttpRequest;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use std::sync::Arc;

/// A raw HTTP response as received from the wire
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Undecoded response body
    pub body: Bytes,
}

impl RawResponse {
    /// Create a response with no headers
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one built request and returns the raw response.
///
/// Implement this to plug in another HTTP stack or a scripted transport in
/// tests:
///
/// ```ignore
/// use async_trait::async_trait;
/// use canvas_client::http::{RawResponse, Transport};
/// use canvas_client::request::HttpRequest;
/// use canvas_client::Result;
///
/// struct Canned;
///
/// #[async_trait]
/// impl Transport for Canned {
///     async fn send(&self, _request: HttpRequest) -> Result<RawResponse> {
///         Ok(RawResponse::new(200, "[]"))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform exactly one round trip
    async fn send(&self, request: HttpRequest) -> Result<RawResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse> {
        (**self).send(request).await
    }
}
