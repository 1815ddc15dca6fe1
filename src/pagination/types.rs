//! Pagination types
//!
//! Options that bound a multi-page fetch, and the values it produces.

use crate::error::{Error, Result};
use crate::response::ResponseMeta;
use crate::types::JsonValue;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Limits applied to one multi-page fetch.
///
/// The default has no limits: pages are followed until the server stops
/// sending a `next` link.
#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    /// Abort the walk when this token is cancelled
    pub cancel: Option<CancellationToken>,
    /// Overall time budget for every page combined
    pub deadline: Option<Duration>,
    /// Stop with an error instead of fetching more than this many pages
    pub max_pages: Option<usize>,
}

impl PageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort when `token` is cancelled
    #[must_use]
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Fail with a timeout once `deadline` has elapsed since the first request
    #[must_use]
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Cap the number of pages
    #[must_use]
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }
}

/// One fetched page
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based position in the walk
    pub number: usize,
    pub meta: ResponseMeta,
    /// Items in server order
    pub items: Vec<JsonValue>,
}

/// Every item across every page of one fetch
#[derive(Debug, Clone)]
pub struct Paginated {
    /// Metadata of the last page
    pub meta: ResponseMeta,
    /// Items in fetch order
    pub items: Vec<JsonValue>,
    /// Number of pages fetched
    pub pages: usize,
}

impl Paginated {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<JsonValue> {
        self.items
    }

    /// Deserialize every item into `T`
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.items
            .iter()
            .map(|item| serde_json::from_value(item.clone()).map_err(Error::from))
            .collect()
    }
}
