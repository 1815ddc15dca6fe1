//! `Link` header parsing
//!
//! Canvas paginates with RFC 8288 style headers:
//!
//! ```text
//! Link: <https://canvas.example.edu/api/v1/courses?page=2&per_page=10>; rel="next",
//!       <https://canvas.example.edu/api/v1/courses?page=1&per_page=10>; rel="first",
//!       <https://canvas.example.edu/api/v1/courses?page=5&per_page=10>; rel="last"
//! ```
//!
//! Parsing is lenient: anything that does not look like `<url>; rel=name`
//! is skipped, and a missing header is an empty map.

use regex::Regex;
use reqwest::header::{HeaderMap, LINK};
use std::sync::LazyLock;

/// One `<url>` followed by its parameters, up to the next `<`
static LINK_ENTRY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<([^>]*)>([^<]*)").unwrap());

/// The `rel` parameter inside an entry; keyword is case-insensitive, quotes optional
static REL_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i);\s*rel\s*=\s*(?:"([^"]*)"|([^\s;,"]+))"#).unwrap()
});

/// Relation name → URL, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRelations {
    links: Vec<(String, String)>,
}

impl LinkRelations {
    /// Parse every `link` header in a header map
    ///
    /// Multiple `link` headers are read in order, as if comma-joined.
    /// Values that are not valid visible ASCII are skipped.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut relations = Self::default();
        for value in headers.get_all(LINK) {
            if let Ok(value) = value.to_str() {
                relations.extend_from(value);
            }
        }
        relations
    }

    /// URL for a relation name (case-insensitive)
    pub fn get(&self, rel: &str) -> Option<&str> {
        self.links
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(rel))
            .map(|(_, url)| url.as_str())
    }

    pub fn next(&self) -> Option<&str> {
        self.get("next")
    }

    pub fn prev(&self) -> Option<&str> {
        self.get("prev")
    }

    pub fn first(&self) -> Option<&str> {
        self.get("first")
    }

    pub fn last(&self) -> Option<&str> {
        self.get("last")
    }

    pub fn current(&self) -> Option<&str> {
        self.get("current")
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Iterate `(relation, url)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.links.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn insert(&mut self, rel: &str, url: &str) {
        let rel = rel.to_ascii_lowercase();
        match self.links.iter_mut().find(|(name, _)| *name == rel) {
            Some(existing) => existing.1 = url.to_string(),
            None => self.links.push((rel, url.to_string())),
        }
    }

    fn extend_from(&mut self, header: &str) {
        for entry in LINK_ENTRY.captures_iter(header) {
            let url = entry[1].trim();
            if url.is_empty() {
                continue;
            }
            let Some(rel) = REL_PARAM.captures(&entry[2]) else {
                continue;
            };
            let names = rel.get(1).or_else(|| rel.get(2)).map_or("", |m| m.as_str());
            for name in names.split_whitespace() {
                self.insert(name, url);
            }
        }
    }
}

/// Parse a `Link` header value into relation → URL.
///
/// Later entries with the same relation overwrite earlier ones.
pub fn parse_link_header(header: Option<&str>) -> LinkRelations {
    let mut relations = LinkRelations::default();
    if let Some(header) = header {
        relations.extend_from(header);
    }
    relations
}
