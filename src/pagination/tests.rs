//! Tests for pagination module

use super::*;
use crate::client::CanvasClient;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{RawResponse, Transport};
use crate::request::{HttpRequest, Request};
use async_trait::async_trait;
use futures::StreamExt;
use pretty_assertions::assert_eq;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use test_case::test_case;
use tokio_util::sync::CancellationToken;

const BASE: &str = "https://canvas.example.com/api/v1/courses";

// ============================================================================
// Link Header Parser Tests
// ============================================================================

#[test]
fn test_parse_next_and_prev() {
    let links = parse_link_header(Some(r#"<https://x/a>; rel="next",<https://x/b>; rel="prev""#));
    assert_eq!(links.len(), 2);
    assert_eq!(links.next(), Some("https://x/a"));
    assert_eq!(links.prev(), Some("https://x/b"));
}

#[test_case(None ; "absent")]
#[test_case(Some("") ; "empty")]
#[test_case(Some("garbage") ; "no entries")]
#[test_case(Some("https://x/a; rel=\"next\"") ; "url without brackets")]
#[test_case(Some("<https://x/a>") ; "entry without rel")]
#[test_case(Some("<https://x/a>; rel=\"next") ; "unterminated quote")]
#[test_case(Some("<>; rel=\"next\"") ; "empty url")]
fn test_parse_yields_empty(header: Option<&str>) {
    assert!(parse_link_header(header).is_empty());
}

#[test]
fn test_parse_duplicate_rel_last_wins() {
    let links = parse_link_header(Some(
        r#"<https://x/1>; rel="next", <https://x/2>; rel="next""#,
    ));
    assert_eq!(links.len(), 1);
    assert_eq!(links.next(), Some("https://x/2"));
}

#[test]
fn test_parse_whitespace_and_case_tolerant() {
    let links = parse_link_header(Some(
        "  <https://x/a>  ;  REL = \"next\" ,\n\t<https://x/z>;Rel=last",
    ));
    assert_eq!(links.next(), Some("https://x/a"));
    assert_eq!(links.last(), Some("https://x/z"));
}

#[test]
fn test_parse_full_canvas_header() {
    let header = concat!(
        "<https://canvas.example.com/api/v1/courses?page=2&per_page=10>; rel=\"current\",",
        "<https://canvas.example.com/api/v1/courses?page=3&per_page=10>; rel=\"next\",",
        "<https://canvas.example.com/api/v1/courses?page=1&per_page=10>; rel=\"prev\",",
        "<https://canvas.example.com/api/v1/courses?page=1&per_page=10>; rel=\"first\",",
        "<https://canvas.example.com/api/v1/courses?page=5&per_page=10>; rel=\"last\""
    );
    let links = parse_link_header(Some(header));

    assert_eq!(
        links.iter().map(|(rel, _)| rel).collect::<Vec<_>>(),
        vec!["current", "next", "prev", "first", "last"]
    );
    assert_eq!(
        links.current(),
        Some("https://canvas.example.com/api/v1/courses?page=2&per_page=10")
    );
    assert_eq!(
        links.first(),
        Some("https://canvas.example.com/api/v1/courses?page=1&per_page=10")
    );
}

#[test]
fn test_parse_extra_params_and_multiple_rels() {
    let links = parse_link_header(Some(
        r#"<https://x/5>; page="5"; rel="next last"; type="application/json""#,
    ));
    assert_eq!(links.next(), Some("https://x/5"));
    assert_eq!(links.last(), Some("https://x/5"));
}

#[test]
fn test_parse_url_with_comma() {
    let links = parse_link_header(Some(r#"<https://x/a?ids=1,2>; rel="next""#));
    assert_eq!(links.next(), Some("https://x/a?ids=1,2"));
}

#[test]
fn test_from_headers_reads_all_link_values() {
    let mut headers = HeaderMap::new();
    headers.append("link", HeaderValue::from_static(r#"<https://x/1>; rel="next""#));
    headers.append("link", HeaderValue::from_static(r#"<https://x/9>; rel="last""#));

    let links = LinkRelations::from_headers(&headers);
    assert_eq!(links.next(), Some("https://x/1"));
    assert_eq!(links.last(), Some("https://x/9"));
    assert_eq!(links.get("NEXT"), Some("https://x/1"));

    assert!(LinkRelations::from_headers(&HeaderMap::new()).is_empty());
}

// ============================================================================
// Scripted transport
// ============================================================================

#[derive(Default)]
struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    fn new(responses: Vec<Result<RawResponse>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            ..Default::default()
        })
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, index: usize) -> HttpRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);

        tokio::task::yield_now().await;

        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other("script exhausted".to_string())));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}

/// Never answers; for cancellation and deadline tests
struct HangingTransport;

#[async_trait]
impl Transport for HangingTransport {
    async fn send(&self, _request: HttpRequest) -> Result<RawResponse> {
        std::future::pending().await
    }
}

fn page(body: Value, next: Option<&str>) -> Result<RawResponse> {
    let mut raw = RawResponse::new(200, body.to_string());
    if let Some(next) = next {
        let header = format!(r#"<{next}>; rel="next", <{BASE}?page=1>; rel="first""#);
        raw.headers
            .insert("link", HeaderValue::from_str(&header).unwrap());
    }
    Ok(raw)
}

fn client<T: Transport>(transport: T) -> CanvasClient<T> {
    let config = ClientConfig::new("https://canvas.example.com", "token").unwrap();
    CanvasClient::with_transport(config, transport)
}

fn three_pages() -> Vec<Result<RawResponse>> {
    vec![
        page(json!([1, 2]), Some(&format!("{BASE}?page=2&per_page=2"))),
        page(json!([3, 4]), Some(&format!("{BASE}?page=3&per_page=2"))),
        page(json!([5]), None),
    ]
}

// ============================================================================
// Driver Tests
// ============================================================================

#[tokio::test]
async fn test_all_pages_follows_next_until_exhausted() {
    let transport = ScriptedTransport::new(three_pages());
    let client = client(Arc::clone(&transport));

    let result = client
        .all_pages(Request::new("courses").query("per_page", "2"))
        .await
        .unwrap();

    assert_eq!(transport.calls(), 3);
    assert_eq!(result.pages, 3);
    assert_eq!(result.items, vec![json!(1), json!(2), json!(3), json!(4), json!(5)]);
    assert!(result.meta.links().next().is_none());
}

#[tokio::test]
async fn test_all_pages_single_page() {
    let transport = ScriptedTransport::new(vec![page(json!([{"id": 1}, {"id": 2}]), None)]);
    let client = client(Arc::clone(&transport));

    let result = client.all_pages("courses").await.unwrap();

    assert_eq!(transport.calls(), 1);
    assert_eq!(result.pages, 1);
    assert_eq!(result.items, vec![json!({"id": 1}), json!({"id": 2})]);
}

#[tokio::test]
async fn test_next_query_replaces_query_on_same_endpoint() {
    let transport = ScriptedTransport::new(three_pages());
    let client = client(Arc::clone(&transport));

    client
        .all_pages(Request::new("courses").query("per_page", "2").query("state[]", "available"))
        .await
        .unwrap();

    let first = transport.request(0);
    assert_eq!(first.url.as_str(), BASE);
    assert_eq!(first.query.get("state[]"), Some("available"));
    assert_eq!(first.query.get("page"), None);

    let second = transport.request(1);
    assert_eq!(second.url.as_str(), BASE);
    assert_eq!(second.query.get("page"), Some("2"));
    assert_eq!(second.query.get("per_page"), Some("2"));
    assert_eq!(second.query.get("state[]"), None);
    assert_eq!(second.header("authorization"), Some("Bearer token"));

    assert_eq!(transport.request(2).query.get("page"), Some("3"));
}

#[tokio::test]
async fn test_pages_never_overlap() {
    let transport = ScriptedTransport::new(three_pages());
    let client = client(Arc::clone(&transport));

    client.all_pages("courses").await.unwrap();

    assert_eq!(transport.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_relative_next_link_resolves_against_page_url() {
    let transport = ScriptedTransport::new(vec![
        page(json!(["a"]), Some("/api/v1/courses?page=2")),
        page(json!(["b"]), None),
    ]);
    let client = client(Arc::clone(&transport));

    let result = client.all_pages("courses").await.unwrap();
    assert_eq!(result.items, vec![json!("a"), json!("b")]);
    assert_eq!(transport.request(1).query.get("page"), Some("2"));
}

#[tokio::test]
async fn test_transport_error_keeps_partial_items() {
    let transport = ScriptedTransport::new(vec![
        page(json!([1, 2]), Some(&format!("{BASE}?page=2"))),
        Err(Error::Timeout { timeout_ms: 30_000 }),
    ]);
    let client = client(Arc::clone(&transport));

    let err = client.all_pages("courses").await.unwrap_err();

    assert_eq!(transport.calls(), 2);
    match err {
        Error::Pagination {
            pages,
            ref items,
            ref source,
        } => {
            assert_eq!(pages, 1);
            assert_eq!(items, &vec![json!(1), json!(2)]);
            assert!(matches!(**source, Error::Timeout { timeout_ms: 30_000 }));
        }
        other => panic!("expected pagination error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_body_stops_pagination() {
    let transport = ScriptedTransport::new(vec![
        page(json!([1]), Some(&format!("{BASE}?page=2"))),
        Ok(RawResponse::new(
            200,
            r#"{"errors": [{"message": "user not authorized to perform that action"}]}"#,
        )),
        page(json!([3]), None),
    ]);
    let client = client(Arc::clone(&transport));

    let err = client.all_pages("courses").await.unwrap_err();

    assert_eq!(transport.calls(), 2);
    assert_eq!(err.partial_items(), Some(&[json!(1)][..]));
    assert!(matches!(
        err.root(),
        Error::Api { status: 200, message, .. } if message.contains("not authorized")
    ));
}

#[tokio::test]
async fn test_error_status_on_first_page() {
    let transport = ScriptedTransport::new(vec![Ok(RawResponse::new(
        401,
        r#"{"errors": [{"message": "Invalid access token."}]}"#,
    ))]);
    let client = client(Arc::clone(&transport));

    let err = client.all_pages("courses").await.unwrap_err();
    assert_eq!(err.partial_items(), Some(&[][..]));
    assert!(matches!(err.root(), Error::Api { status: 401, .. }));
}

#[tokio::test]
async fn test_non_array_page_is_decode_error() {
    let transport = ScriptedTransport::new(vec![page(json!({"id": 1}), None)]);
    let client = client(Arc::clone(&transport));

    let err = client.all_pages("courses/1").await.unwrap_err();
    assert!(matches!(err.root(), Error::Decode { message } if message.contains("an object")));
}

#[tokio::test]
async fn test_invalid_request_fails_before_any_call() {
    let transport = ScriptedTransport::new(three_pages());
    let client = client(Arc::clone(&transport));

    let err = client.all_pages("").await.unwrap_err();
    assert!(err.is_config());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_endpoint_with_query_is_rejected_before_walking() {
    let transport = ScriptedTransport::new(three_pages());
    let client = client(Arc::clone(&transport));

    let err = client.all_pages("courses?page=1").await.unwrap_err();
    assert!(err.is_config());
    assert_eq!(transport.calls(), 0);

    client
        .all_pages(Request::new("courses").query("page", "1"))
        .await
        .unwrap();
    for index in 0..3 {
        let sent = transport.request(index);
        assert_eq!(sent.url.query(), None);
        assert_eq!(sent.query.get_all("page").count(), 1);
    }
}

#[tokio::test]
async fn test_pre_cancelled_token_sends_nothing() {
    let transport = ScriptedTransport::new(three_pages());
    let client = client(Arc::clone(&transport));
    let token = CancellationToken::new();
    token.cancel();

    let err = client
        .all_pages_with("courses", PageOptions::new().cancel_token(token))
        .await
        .unwrap_err();

    assert!(matches!(err.root(), Error::Cancelled));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_cancel_during_request() {
    let client = client(HangingTransport);
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let err = client
        .all_pages_with("courses", PageOptions::new().cancel_token(token))
        .await
        .unwrap_err();

    assert!(matches!(err.root(), Error::Cancelled));
}

#[tokio::test]
async fn test_deadline_expires() {
    let client = client(HangingTransport);

    let err = client
        .all_pages_with("courses", PageOptions::new().deadline(Duration::from_millis(20)))
        .await
        .unwrap_err();

    assert!(matches!(err.root(), Error::Timeout { timeout_ms: 20 }));
    assert_eq!(err.partial_items(), Some(&[][..]));
}

#[tokio::test]
async fn test_unrepresentable_deadline_means_no_deadline() {
    let transport = ScriptedTransport::new(three_pages());
    let client = client(Arc::clone(&transport));

    let result = client
        .all_pages_with("courses", PageOptions::new().deadline(Duration::MAX))
        .await
        .unwrap();

    assert_eq!(transport.calls(), 3);
    assert_eq!(result.items.len(), 5);
}

#[tokio::test]
async fn test_max_pages_caps_the_walk() {
    let transport = ScriptedTransport::new(three_pages());
    let client = client(Arc::clone(&transport));

    let err = client
        .all_pages_with("courses", PageOptions::new().max_pages(2))
        .await
        .unwrap_err();

    assert_eq!(transport.calls(), 2);
    assert!(matches!(err.root(), Error::PageLimit { max_pages: 2 }));
    assert_eq!(err.partial_items().map(<[Value]>::len), Some(4));
}

#[tokio::test]
async fn test_max_pages_exactly_enough() {
    let transport = ScriptedTransport::new(three_pages());
    let client = client(Arc::clone(&transport));

    let result = client
        .all_pages_with("courses", PageOptions::new().max_pages(3))
        .await
        .unwrap();
    assert_eq!(result.len(), 5);
}

#[tokio::test]
async fn test_concurrent_walks_do_not_share_items() {
    let transport = ScriptedTransport::new(vec![
        page(json!(["a"]), None),
        page(json!(["b"]), None),
    ]);
    let client = client(Arc::clone(&transport));

    let (first, second) = tokio::join!(client.all_pages("courses"), client.all_pages("users"));
    let mut items: Vec<Value> = first.unwrap().items;
    let second = second.unwrap().items;
    assert_eq!(items.len(), 1);
    assert_eq!(second.len(), 1);
    items.extend(second);
    items.sort_by_key(ToString::to_string);
    assert_eq!(items, vec![json!("a"), json!("b")]);
}

// ============================================================================
// Stream and callback surfaces
// ============================================================================

#[tokio::test]
async fn test_pages_stream_yields_in_order() {
    let transport = ScriptedTransport::new(three_pages());
    let client = client(Arc::clone(&transport));

    let pages: Vec<Page> = client
        .pages("courses", PageOptions::default())
        .map(|page| page.unwrap())
        .collect()
        .await;

    assert_eq!(pages.len(), 3);
    assert_eq!(
        pages.iter().map(|p| p.number).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(pages[2].items, vec![json!(5)]);
}

#[tokio::test]
async fn test_pages_stream_ends_after_error() {
    let transport = ScriptedTransport::new(vec![
        page(json!([1]), Some(&format!("{BASE}?page=2"))),
        Err(Error::Other("boom".to_string())),
        page(json!([3]), None),
    ]);
    let client = client(Arc::clone(&transport));

    let results: Vec<Result<Page>> = client.pages("courses", PageOptions::default()).collect().await;

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_spawn_all_pages_delivers_once() {
    let transport = ScriptedTransport::new(three_pages());
    let client = client(Arc::clone(&transport));
    let (tx, rx) = tokio::sync::oneshot::channel();

    let handle = client
        .spawn_all_pages("courses", PageOptions::default(), move |result| {
            let _ = tx.send(result.map(Paginated::into_items));
        })
        .unwrap();

    handle.await.unwrap();
    let items = rx.await.unwrap().unwrap();
    assert_eq!(items.len(), 5);
}

#[tokio::test]
async fn test_spawn_rejects_invalid_request_synchronously() {
    let transport = ScriptedTransport::new(three_pages());
    let client = client(Arc::clone(&transport));

    let result = client.spawn_all_pages("", PageOptions::default(), |_| {
        panic!("handler must not run");
    });
    assert!(result.unwrap_err().is_config());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_paginated_deserialize() {
    #[derive(serde::Deserialize)]
    struct Course {
        id: u64,
    }

    let transport = ScriptedTransport::new(vec![page(json!([{"id": 1}, {"id": 2}]), None)]);
    let client = client(Arc::clone(&transport));

    let courses: Vec<Course> = client.all_pages("courses").await.unwrap().deserialize().unwrap();
    assert_eq!(courses.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2]);
}
