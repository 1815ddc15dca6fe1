//! Error types for the Canvas client
//!
//! Every public API returns `Result<T, Error>` where Error is defined here.
//! Configuration problems surface before any request is sent; transport and
//! application failures surface from the call that hit them.

use serde_json::Value;
use thiserror::Error;

/// The main error type for the Canvas client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    // ============================================================================
    // Application Errors
    // ============================================================================
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        body: Value,
    },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    #[error("Pagination stopped after {pages} page(s): {source}")]
    Pagination {
        pages: usize,
        items: Vec<Value>,
        #[source]
        source: Box<Error>,
    },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Page limit of {max_pages} reached before the last page")]
    PageLimit { max_pages: usize },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an application error from a status and decoded body
    pub fn api(status: u16, body: Value) -> Self {
        Self::Api {
            status,
            message: api_message(&body),
            body,
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Wrap an error that ended a multi-page fetch, keeping what was collected
    pub fn pagination(pages: usize, items: Vec<Value>, source: Error) -> Self {
        Self::Pagination {
            pages,
            items,
            source: Box::new(source),
        }
    }

    /// Items collected before a pagination failure, if any
    pub fn partial_items(&self) -> Option<&[Value]> {
        match self {
            Self::Pagination { items, .. } => Some(items),
            _ => None,
        }
    }

    /// The underlying error, looking through pagination wrappers
    pub fn root(&self) -> &Error {
        match self {
            Self::Pagination { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this is a configuration error raised before any I/O
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::MissingConfigField { .. }
                | Error::InvalidConfigValue { .. }
                | Error::YamlParse(_)
                | Error::InvalidUrl(_)
        )
    }

    /// Check if this error is worth retrying by the caller
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::Timeout { .. } => true,
            Error::Api { status, .. } => is_retryable_status(*status),
            Error::Pagination { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Pull a human-readable message out of a Canvas error body.
///
/// Canvas reports errors as `{"errors": [{"message": "..."}]}`, sometimes as
/// `{"errors": {"field": [...]}}` or `{"message": "..."}`.
fn api_message(body: &Value) -> String {
    if let Some(first) = body
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
    {
        if let Some(message) = first.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
        if let Some(message) = first.as_str() {
            return message.to_string();
        }
    }
    if let Some(message) = body.get("message").and_then(Value::as_str) {
        return message.to_string();
    }
    match body {
        Value::Null => "empty response body".to_string(),
        other => other.to_string(),
    }
}

/// Result type alias for the Canvas client
pub type Result<T> = std::result::Result<T, Error>;
