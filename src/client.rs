//! The Canvas API client
//!
//! `CanvasClient` is cheap to clone; clones share the configuration and the
//! transport. Every call owns its own request and, when paginating, its own
//! accumulator, so concurrent calls never share mutable state.

use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{ReqwestTransport, Transport};
use crate::pagination::{collect_pages, page_stream, Page, PageOptions, PageWalker, Paginated};
use crate::request::{HttpRequest, Request};
use crate::response::ApiResponse;
use crate::types::Method;
use futures::Stream;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

struct ClientInner<T> {
    config: ClientConfig,
    transport: T,
}

/// Client for one Canvas host
pub struct CanvasClient<T = ReqwestTransport> {
    inner: Arc<ClientInner<T>>,
}

impl<T> Clone for CanvasClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl CanvasClient<ReqwestTransport> {
    /// Create a client that talks to Canvas over `reqwest`
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> CanvasClient<T> {
    /// Create a client over any transport
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            inner: Arc::new(ClientInner { config, transport }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Send one request and decode the response.
    ///
    /// Non-2xx responses are returned as-is; use
    /// [`ApiResponse::error_for_status`] to turn them into errors.
    pub async fn send(&self, method: Method, request: impl Into<Request>) -> Result<ApiResponse> {
        let request = HttpRequest::build(&self.inner.config, method, request.into())?;
        let url = request.url.clone();

        debug!(client = self.inner.config.name(), "{} {}", method, url);

        let raw = self.inner.transport.send(request).await?;
        ApiResponse::from_raw(raw, url)
    }

    /// `GET` one page
    pub async fn get(&self, request: impl Into<Request>) -> Result<ApiResponse> {
        self.send(Method::GET, request).await
    }

    /// `POST` with an optional JSON body
    pub async fn post(&self, request: impl Into<Request>) -> Result<ApiResponse> {
        self.send(Method::POST, request).await
    }

    /// `PUT` with an optional JSON body
    pub async fn put(&self, request: impl Into<Request>) -> Result<ApiResponse> {
        self.send(Method::PUT, request).await
    }

    /// `DELETE`
    pub async fn delete(&self, request: impl Into<Request>) -> Result<ApiResponse> {
        self.send(Method::DELETE, request).await
    }

    /// Fetch every page of a list endpoint
    pub async fn all_pages(&self, request: impl Into<Request>) -> Result<Paginated> {
        self.all_pages_with(request, PageOptions::default()).await
    }

    /// Fetch every page of a list endpoint with cancellation, a deadline,
    /// or a page cap.
    ///
    /// An invalid request fails before anything is sent. A failure while
    /// walking returns `Error::Pagination` with the items already collected.
    pub async fn all_pages_with(
        &self,
        request: impl Into<Request>,
        options: PageOptions,
    ) -> Result<Paginated> {
        let request = request.into();
        request.validate()?;
        collect_pages(PageWalker::new(self.clone(), request, options)).await
    }

    /// Stream the pages of a list endpoint as they arrive
    pub fn pages(
        &self,
        request: impl Into<Request>,
        options: PageOptions,
    ) -> impl Stream<Item = Result<Page>> + Send + 'static
    where
        T: 'static,
    {
        page_stream(PageWalker::new(self.clone(), request.into(), options))
    }

    /// Send on the runtime and hand the outcome to `on_complete`.
    ///
    /// Returns immediately; an invalid request is rejected here instead of
    /// reaching the handler.
    pub fn spawn_send<F>(
        &self,
        method: Method,
        request: impl Into<Request>,
        on_complete: F,
    ) -> Result<JoinHandle<()>>
    where
        T: 'static,
        F: FnOnce(Result<ApiResponse>) + Send + 'static,
    {
        let request = request.into();
        request.validate()?;
        let client = self.clone();
        Ok(tokio::spawn(async move {
            on_complete(client.send(method, request).await);
        }))
    }

    /// Fetch every page on the runtime and hand the outcome to `on_complete`
    pub fn spawn_all_pages<F>(
        &self,
        request: impl Into<Request>,
        options: PageOptions,
        on_complete: F,
    ) -> Result<JoinHandle<()>>
    where
        T: 'static,
        F: FnOnce(Result<Paginated>) + Send + 'static,
    {
        let request = request.into();
        request.validate()?;
        let walker = PageWalker::new(self.clone(), request, options);
        Ok(tokio::spawn(async move {
            on_complete(collect_pages(walker).await);
        }))
    }
}

impl<T> std::fmt::Debug for CanvasClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
