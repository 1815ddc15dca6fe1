//! Request descriptors
//!
//! A call names an endpoint and optionally query parameters and a JSON
//! body. `Request` is the canonical form every call is normalized into:
//!
//! ```rust,ignore
//! // endpoint only
//! client.get("courses").await?;
//!
//! // endpoint + query
//! client.get(("courses", QueryParams::from([("per_page", "50")]))).await?;
//!
//! // named fields
//! let req = Request::new("courses/1/assignments")
//!     .query("per_page", "50")
//!     .query_many("include[]", ["submission", "overrides"]);
//! client.get(req).await?;
//! ```

mod builder;

pub use builder::HttpRequest;

use crate::error::{Error, Result};
use crate::types::{JsonValue, QueryParams};

/// Canonical request descriptor: endpoint, query, optional body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    endpoint: String,
    query: QueryParams,
    body: Option<JsonValue>,
}

impl Request {
    /// Create a request for an endpoint relative to the API root
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push(key, value);
        self
    }

    /// Add a repeated query parameter (`include[]=a&include[]=b`)
    #[must_use]
    pub fn query_many<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let key = key.into();
        for value in values {
            self.query.push(key.clone(), value);
        }
        self
    }

    /// Replace all query parameters
    #[must_use]
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Set the JSON body (sent with POST and PUT only)
    #[must_use]
    pub fn body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn params(&self) -> &QueryParams {
        &self.query
    }

    pub fn payload(&self) -> Option<&JsonValue> {
        self.body.as_ref()
    }

    /// Check the descriptor before anything is sent
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(Error::config("Request endpoint must not be empty"));
        }
        if endpoint.contains("://") {
            return Err(Error::config(format!(
                "Request endpoint must be a path relative to the API root, found '{endpoint}'"
            )));
        }
        if endpoint.contains(['?', '#']) {
            return Err(Error::config(format!(
                "Request endpoint must not carry a query or fragment, found '{endpoint}'; \
                 pass query parameters separately"
            )));
        }
        if endpoint.split(['/', '\\']).any(is_parent_segment) {
            return Err(Error::config(format!(
                "Request endpoint must stay below the API root, found '{endpoint}'"
            )));
        }
        Ok(())
    }

    pub(crate) fn into_parts(self) -> (String, QueryParams, Option<JsonValue>) {
        (self.endpoint, self.query, self.body)
    }
}

/// Whether `segment` is `..`, including its percent-encoded spellings
fn is_parent_segment(segment: &str) -> bool {
    let segment = segment.to_ascii_lowercase();
    matches!(segment.as_str(), ".." | ".%2e" | "%2e." | "%2e%2e")
}

impl From<&str> for Request {
    fn from(endpoint: &str) -> Self {
        Self::new(endpoint)
    }
}

impl From<String> for Request {
    fn from(endpoint: String) -> Self {
        Self::new(endpoint)
    }
}

impl<E: Into<String>> From<(E, QueryParams)> for Request {
    fn from((endpoint, query): (E, QueryParams)) -> Self {
        Self::new(endpoint).with_query(query)
    }
}

impl<E: Into<String>> From<(E, QueryParams, JsonValue)> for Request {
    fn from((endpoint, query, body): (E, QueryParams, JsonValue)) -> Self {
        Self::new(endpoint).with_query(query).body(body)
    }
}

impl<E: Into<String>> From<(E, JsonValue)> for Request {
    fn from((endpoint, body): (E, JsonValue)) -> Self {
        Self::new(endpoint).body(body)
    }
}
