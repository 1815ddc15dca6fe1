//! Decoded API responses
//!
//! Every call resolves to a `ResponseMeta` (status, headers, URL) and a
//! decoded JSON body.

use crate::error::{Error, Result};
use crate::http::RawResponse;
use crate::pagination::LinkRelations;
use crate::types::JsonValue;
use reqwest::header::HeaderMap;
use url::Url;

/// Response metadata without the body
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// URL the request was sent to (query excluded)
    pub url: Url,
}

impl ResponseMeta {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parsed `Link` header relations
    pub fn links(&self) -> LinkRelations {
        LinkRelations::from_headers(&self.headers)
    }

    /// Header value as a string, if present and visible ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A response with its JSON body decoded
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub meta: ResponseMeta,
    /// Decoded body; `Null` when the body was empty
    pub body: JsonValue,
}

impl ApiResponse {
    /// Decode a raw transport response
    pub fn from_raw(raw: RawResponse, url: Url) -> Result<Self> {
        let body = decode_body(&raw.body)?;
        Ok(Self {
            meta: ResponseMeta {
                status: raw.status,
                headers: raw.headers,
                url,
            },
            body,
        })
    }

    pub fn status(&self) -> u16 {
        self.meta.status
    }

    /// Whether the decoded body reports an error condition
    pub fn has_errors(&self) -> bool {
        self.body
            .get("errors")
            .is_some_and(|errors| !errors.is_null())
    }

    /// Turn a failed status or an error body into `Error::Api`
    pub fn error_for_status(self) -> Result<Self> {
        if !self.meta.is_success() || self.has_errors() {
            return Err(Error::api(self.meta.status, self.body));
        }
        Ok(self)
    }

    /// Deserialize the body into a typed value
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

fn decode_body(bytes: &[u8]) -> Result<JsonValue> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(JsonValue::Null);
    }
    serde_json::from_slice(bytes)
        .map_err(|e| Error::decode(format!("response body is not valid JSON: {e}")))
}
