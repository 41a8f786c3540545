//! MediaWiki full-text search API.
//!
//! The API answers `{"query":{"search":[{title, pageid, timestamp, snippet}]}}`.
//! Page URLs are built from the page id so results are stable across renames.

use serde::Deserialize;

use crate::config::{ResponseShape, SourceConfig};
use crate::engine::SourceAdapter;
use crate::error::SearchError;
use crate::http::HttpPool;
use crate::normalize::{clean_snippet, clean_text, parse_iso_timestamp};
use crate::types::SearchResult;

#[derive(Debug, Default, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    query: ApiQuery,
}

#[derive(Debug, Default, Deserialize)]
struct ApiQuery {
    #[serde(default)]
    search: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ApiHit {
    #[serde(default)]
    title: String,
    pageid: Option<u64>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

/// Adapter for a MediaWiki-style JSON search API.
#[derive(Debug, Clone)]
pub struct WikipediaAdapter {
    config: SourceConfig,
    page_url_template: String,
}

impl WikipediaAdapter {
    /// Build from a source configuration.
    ///
    /// A non-API shape falls back to the English Wikipedia page template.
    pub fn new(config: SourceConfig) -> Self {
        let page_url_template = match &config.shape {
            ResponseShape::SearchApi { page_url_template } => page_url_template.clone(),
            ResponseShape::Feed { .. } => "https://en.wikipedia.org/?curid={pageid}".to_owned(),
        };
        Self {
            config,
            page_url_template,
        }
    }
}

impl SourceAdapter for WikipediaAdapter {
    async fn fetch(
        &self,
        query: &str,
        max_results: usize,
        http: &HttpPool,
    ) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(source = %self.config.name, query, "search API request");
        let body = http.get_text(&self.config.endpoint(query, max_results)).await?;
        parse_search_response(&body, max_results, &self.config.name, &self.page_url_template)
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}

/// Parse a search API body into results.
///
/// Hits that do not fit the expected shape, lack a page id or have an empty
/// title are skipped one by one. An absent or unparseable timestamp leaves
/// `published_date` unset.
fn parse_search_response(
    body: &str,
    max_results: usize,
    source: &str,
    page_url_template: &str,
) -> Result<Vec<SearchResult>, SearchError> {
    let response: ApiResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("{source} response: {e}")))?;

    let results = response
        .query
        .search
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<ApiHit>(raw) {
            Ok(hit) => Some(hit),
            Err(e) => {
                tracing::trace!(source, error = %e, "skipping malformed search hit");
                None
            }
        })
        .filter_map(|hit| {
            let pageid = hit.pageid?;
            let title = clean_text(&hit.title);
            if title.is_empty() {
                return None;
            }
            let url = page_url_template.replace("{pageid}", &pageid.to_string());
            let published = hit.timestamp.as_deref().and_then(parse_iso_timestamp);
            let snippet = hit.snippet.as_deref().map(clean_snippet);
            Some(SearchResult::new(title, url, published, source).with_snippet(snippet))
        })
        .take(max_results)
        .collect();
    Ok(results)
}
