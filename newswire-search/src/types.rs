//! Core types: the normalised result record and the aggregate response.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single normalised result produced by a source adapter.
///
/// `title` and `url` are always non-empty for results that leave an adapter.
/// `published_date` is UTC-assumed and timezone-naive; it is `None` when the
/// source timestamp could not be parsed, never defaulted to "now".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Entity-decoded, ASCII-only title.
    pub title: String,
    /// Absolute URL of the result (redirect wrappers already resolved).
    pub url: String,
    /// Publication timestamp, if the source provided a parseable one.
    pub published_date: Option<NaiveDateTime>,
    /// Display name of the adapter that produced this result.
    pub source: String,
    /// Cleaned snippet, at most 200 characters plus an ellipsis marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl SearchResult {
    /// Build a result with no snippet.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        published_date: Option<NaiveDateTime>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            published_date,
            source: source.into(),
            snippet: None,
        }
    }

    /// Attach a snippet, dropping it when empty.
    pub fn with_snippet(mut self, snippet: Option<String>) -> Self {
        self.snippet = snippet.filter(|s| !s.is_empty());
        self
    }
}

/// Descending-recency comparison: newer first, undated results last.
///
/// `None` compares as older than every present date.
pub fn by_recency(a: &SearchResult, b: &SearchResult) -> Ordering {
    match (a.published_date, b.published_date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The result of one aggregate search.
///
/// Results are ordered by `published_date` descending with undated results
/// last. Immutable once returned; cached responses are shared snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResponse {
    /// The query exactly as the caller supplied it.
    pub query: String,
    /// Merged, sorted results from every source.
    pub results: Vec<SearchResult>,
}

impl AggregateResponse {
    /// A well-formed response with no results.
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            results: Vec::new(),
        }
    }
}

/// Extracted readable content from a fetched web page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    /// The URL that was fetched.
    pub url: String,
    /// The page title extracted from HTML.
    pub title: String,
    /// Readable text with boilerplate stripped and whitespace collapsed.
    pub content: String,
    /// Number of characters in `content`.
    pub content_length: usize,
}
