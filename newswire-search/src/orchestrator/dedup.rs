//! Result deduplication by canonical URL.
//!
//! Runs after the recency sort, so keeping the first occurrence keeps the
//! most recent copy of a story (and, among equal dates, the copy from the
//! earlier-configured source).

use std::collections::HashSet;

use crate::types::SearchResult;

use super::url_normalize::canonical_url;

/// Drop every result whose canonical URL was already seen.
///
/// Order is preserved. The surviving entry is returned unmodified; only the
/// comparison uses the canonical form.
pub fn deduplicate(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen: HashSet<String> = HashSet::with_capacity(results.len());
    let before = results.len();
    let kept: Vec<SearchResult> = results
        .into_iter()
        .filter(|result| seen.insert(canonical_url(&result.url)))
        .collect();
    if kept.len() < before {
        tracing::debug!(removed = before - kept.len(), "duplicate URLs dropped");
    }
    kept
}
