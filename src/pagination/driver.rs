//! Sequential page walker
//!
//! Fetches one page, reads its `Link` header, and only then decides whether
//! to fetch the next. The endpoint stays fixed; the query string of the
//! `next` link replaces the query for the following request.

use super::types::{Page, PageOptions, Paginated};
use crate::client::CanvasClient;
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::request::Request;
use crate::response::{ApiResponse, ResponseMeta};
use crate::types::{JsonValue, Method, QueryParams};
use futures::Stream;
use std::future::Future;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Walks the pages of one listable endpoint
pub(crate) struct PageWalker<T> {
    client: CanvasClient<T>,
    /// Request for the next page; `None` once the last page was seen
    pending: Option<Request>,
    pages: usize,
    options: PageOptions,
    deadline_at: Option<Instant>,
}

impl<T: Transport> PageWalker<T> {
    pub(crate) fn new(client: CanvasClient<T>, request: Request, options: PageOptions) -> Self {
        // A deadline too far out to represent is no deadline at all
        let deadline_at = options
            .deadline
            .and_then(|d| Instant::now().checked_add(d));
        Self {
            client,
            pending: Some(request),
            pages: 0,
            options,
            deadline_at,
        }
    }

    /// Number of pages fetched successfully so far
    pub(crate) fn pages(&self) -> usize {
        self.pages
    }

    /// Fetch the next page, or `None` after the last one
    pub(crate) async fn next_page(&mut self) -> Option<Result<Page>> {
        let request = self.pending.take()?;
        Some(self.fetch(request).await)
    }

    async fn fetch(&mut self, request: Request) -> Result<Page> {
        if let Some(max_pages) = self.options.max_pages {
            if self.pages >= max_pages {
                return Err(Error::PageLimit { max_pages });
            }
        }
        if self
            .options
            .cancel
            .as_ref()
            .is_some_and(tokio_util::sync::CancellationToken::is_cancelled)
        {
            return Err(Error::Cancelled);
        }
        if let (Some(at), Some(budget)) = (self.deadline_at, self.options.deadline) {
            if Instant::now() >= at {
                return Err(Error::Timeout {
                    timeout_ms: budget.as_millis() as u64,
                });
            }
        }

        let response = self
            .bounded(self.client.send(Method::GET, request.clone()))
            .await?
            .error_for_status()?;

        let ApiResponse { meta, body } = response;
        let items = page_items(body)?;
        self.pages += 1;

        debug!(
            page = self.pages,
            items = items.len(),
            url = %meta.url,
            "Fetched page"
        );

        if let Some(query) = next_query(&meta) {
            self.pending = Some(request.with_query(query));
        }

        Ok(Page {
            number: self.pages,
            meta,
            items,
        })
    }

    /// Race one round trip against the cancel token and the deadline
    async fn bounded<F>(&self, fetch: F) -> Result<ApiResponse>
    where
        F: Future<Output = Result<ApiResponse>>,
    {
        let timed = async {
            match (self.deadline_at, self.options.deadline) {
                (Some(at), Some(budget)) => match tokio::time::timeout_at(at, fetch).await {
                    Ok(result) => result,
                    Err(_) => Err(Error::Timeout {
                        timeout_ms: budget.as_millis() as u64,
                    }),
                },
                _ => fetch.await,
            }
        };

        match &self.options.cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => Err(Error::Cancelled),
                result = timed => result,
            },
            None => timed.await,
        }
    }
}

/// A page body must be a JSON array; its items are appended in order
fn page_items(body: JsonValue) -> Result<Vec<JsonValue>> {
    match body {
        JsonValue::Array(items) => Ok(items),
        JsonValue::Null => Ok(Vec::new()),
        other => Err(Error::decode(format!(
            "expected a JSON array page, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Query of the `next` relation, resolved against the page URL.
///
/// A `next` link that cannot be resolved ends the walk like a missing one.
fn next_query(meta: &ResponseMeta) -> Option<QueryParams> {
    let links = meta.links();
    let next = links.next()?;
    match meta.url.join(next) {
        Ok(url) => Some(QueryParams::from_query_string(url.query().unwrap_or(""))),
        Err(e) => {
            warn!(link = next, error = %e, "Ignoring unparseable next link");
            None
        }
    }
}

/// Drive a walker to the end, appending every page.
///
/// Any failure returns `Error::Pagination` carrying the items collected
/// from earlier pages.
pub(crate) async fn collect_pages<T: Transport>(mut walker: PageWalker<T>) -> Result<Paginated> {
    let mut items = Vec::new();
    let mut last_meta = None;

    while let Some(page) = walker.next_page().await {
        match page {
            Ok(page) => {
                items.extend(page.items);
                last_meta = Some(page.meta);
            }
            Err(e) => {
                warn!(pages = walker.pages(), error = %e, "Pagination stopped");
                return Err(Error::pagination(walker.pages(), items, e));
            }
        }
    }

    let meta = last_meta.ok_or_else(|| Error::Other("no page was fetched".to_string()))?;
    Ok(Paginated {
        meta,
        items,
        pages: walker.pages(),
    })
}

/// Yield pages one at a time; the stream ends after the last page or the
/// first error.
pub(crate) fn page_stream<T>(walker: PageWalker<T>) -> impl Stream<Item = Result<Page>> + Send
where
    T: Transport + 'static,
{
    futures::stream::unfold(Some(walker), |state| async move {
        let mut walker = state?;
        match walker.next_page().await? {
            Ok(page) => Some((Ok(page), Some(walker))),
            Err(e) => Some((Err(e), None)),
        }
    })
}
