//! # Canvas Client
//!
//! An async client for the Canvas LMS REST API.
//!
//! The client is endpoint-agnostic: it authenticates, resolves endpoints
//! against `https://<host>/api/<version>/`, and follows `Link` header
//! pagination so list endpoints can be read as one result.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use canvas_client::{CanvasClient, ClientConfig, Request, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::new("https://canvas.example.edu", "1~token")?;
//!     let client = CanvasClient::new(config)?;
//!
//!     // One request
//!     let me = client.get("users/self").await?.error_for_status()?;
//!     println!("{}", me.body["name"]);
//!
//!     // Every page of a list endpoint
//!     let courses = client
//!         .all_pages(Request::new("courses").query("per_page", "100"))
//!         .await?;
//!     println!("{} courses over {} pages", courses.len(), courses.pages);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         CanvasClient                         │
//! │   get / post / put / delete        all_pages / pages         │
//! └──────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴─────┬──────────────┬──────────┐
//! │   Request    │    HttpRequest      │  Transport   │  Paging  │
//! ├──────────────┼─────────────────────┼──────────────┼──────────┤
//! │ endpoint     │ /api/<ver>/<path>   │ reqwest      │ Link hdr │
//! │ query        │ Bearer auth         │ rate limit   │ cancel   │
//! │ body         │ JSON                │ one trip     │ deadline │
//! └──────────────┴─────────────────────┴──────────────┴──────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration
pub mod config;

/// Transport trait and reqwest implementation
pub mod http;

/// Request descriptors and building
pub mod request;

/// Decoded responses
pub mod response;

/// Link header parsing and page walking
pub mod pagination;

/// The client facade
pub mod client;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::CanvasClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, Result};
pub use pagination::{parse_link_header, LinkRelations, Page, PageOptions, Paginated};
pub use request::{HttpRequest, Request};
pub use response::{ApiResponse, ResponseMeta};
pub use types::{JsonValue, Method, QueryParams};

/// Re-exported so callers can build `PageOptions` without a direct dependency
pub use tokio_util::sync::CancellationToken;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
