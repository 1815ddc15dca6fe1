//! Turns a `Request` into a fully resolved `HttpRequest`

use super::Request;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::types::{JsonValue, Method, QueryParams};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use tracing::debug;
use url::Url;

/// A request ready for the transport
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL, without the query parameters below
    pub url: Url,
    /// Flat query parameters
    pub query: QueryParams,
    /// Authorization and content negotiation headers
    pub headers: HeaderMap,
    /// JSON body, only for methods that carry one
    pub body: Option<JsonValue>,
}

impl HttpRequest {
    /// Build a request against the configured host, API version, and token
    pub fn build(config: &ClientConfig, method: Method, request: Request) -> Result<Self> {
        request.validate()?;
        let (endpoint, query, body) = request.into_parts();

        let url = resolve_endpoint(config, &endpoint)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if !config.token().is_empty() {
            let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token()))
                .map_err(|_| {
                    Error::invalid_value("token", "contains characters not allowed in a header")
                })?;
            auth.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth);
        }

        let body = match body {
            Some(_) if !method.has_body() => {
                debug!("Dropping request body for {} {}", method, url);
                None
            }
            body => body,
        };

        Ok(Self {
            method,
            url,
            query,
            headers,
            body,
        })
    }

    /// Header value as a string, if present and visible ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Resolve `endpoint` to `<host>/api/<version>/<endpoint>`.
///
/// The API root is joined as an absolute path, so any path on the
/// configured host is replaced rather than extended.
pub(crate) fn resolve_endpoint(config: &ClientConfig, endpoint: &str) -> Result<Url> {
    let endpoint = endpoint.trim();
    let path = if endpoint.starts_with('/') {
        format!("{}{endpoint}", config.api_root())
    } else {
        format!("{}/{endpoint}", config.api_root())
    };
    Ok(config.host().join(&path)?)
}
