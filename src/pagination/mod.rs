//! Pagination module
//!
//! Canvas paginates list endpoints with `Link` headers. This module parses
//! those headers and walks `next` links until the last page.
//!
//! # Overview
//!
//! - [`parse_link_header`] / [`LinkRelations`] - header → relation map
//! - [`PageOptions`] - cancellation, deadline, and page cap for one walk
//! - [`Paginated`] - every item of every page, in fetch order
//! - [`Page`] - a single page, as yielded by the page stream

mod driver;
mod link_header;
mod types;

pub(crate) use driver::{collect_pages, page_stream, PageWalker};
pub use link_header::{parse_link_header, LinkRelations};
pub use types::{Page, PageOptions, Paginated};

#[cfg(test)]
mod tests;
