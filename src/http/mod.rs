//! HTTP transport module
//!
//! The `Transport` trait is the single seam between the client and the
//! network. `ReqwestTransport` is the default implementation.
//!
//! # Features
//!
//! - **One round trip per call**: no retries at this layer
//! - **Rate Limiting**: optional token bucket using governor
//! - **Pluggable**: any `Transport` (including `Arc<T>`) can drive the client

mod client;
mod rate_limit;
mod transport;

pub use client::ReqwestTransport;
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use transport::{RawResponse, Transport};
