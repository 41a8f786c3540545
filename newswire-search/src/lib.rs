//! # newswire-search
//!
//! Concurrent news search aggregation.
//!
//! A query fans out to several public sources at once (news RSS feeds, a
//! redirect-wrapping aggregator feed, the Wikipedia search API). Every
//! source's response is normalised into one [`SearchResult`] shape, merged,
//! sorted newest first, deduplicated by URL and returned as an
//! [`AggregateResponse`].
//!
//! ## Design
//!
//! - Sources implement [`SourceAdapter`]; the compiled-in ones are chosen by
//!   [`ResponseShape`] in each [`SourceConfig`]
//! - Adapters start staggered and each runs under its own timeout; the whole
//!   call has an overall deadline after which partial results are returned
//! - Aggregator links (`news.google.com/rss/articles/...`) are unwrapped to
//!   the publisher URL, offline when possible
//! - Responses are cached per normalised query for `cache_ttl_seconds`
//! - At most `max_concurrent_searches` aggregations run at once
//! - Graceful degradation: a failing source only shrinks the result list
//!
//! ## Security
//!
//! - No API keys or secrets
//! - No network listeners; this is a library, not a server
//! - Search queries are logged only at trace level
//! - Titles and snippets are stripped of markup before returning

pub mod cache;
pub mod config;
pub mod content;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod normalize;
pub mod orchestrator;
pub mod resolve;
pub mod service;
pub mod types;

pub use config::{ResponseShape, SearchConfig, SourceConfig};
pub use engine::SourceAdapter;
pub use engines::Source;
pub use error::{Result, SearchError};
pub use orchestrator::Orchestrator;
pub use resolve::RedirectResolver;
pub use service::SearchService;
pub use types::{AggregateResponse, PageContent, SearchResult};

/// Run one uncached aggregate search with the given configuration.
///
/// Builds a throwaway [`SearchService`]; long-lived callers should keep a
/// service so the cache and concurrency gate are shared.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid or `max_results`
/// is zero. Source failures are never errors.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> newswire_search::Result<()> {
/// let config = newswire_search::SearchConfig::default();
/// let response = newswire_search::aggregate_search("apple earnings", 5, &config).await?;
/// for result in &response.results {
///     println!("[{}] {}: {}", result.source, result.title, result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn aggregate_search(
    query: &str,
    max_results: usize,
    config: &SearchConfig,
) -> Result<AggregateResponse> {
    SearchService::new(config.clone())?
        .search(query, max_results)
        .await
}

/// Fetch a web page and extract its readable text.
///
/// Downloads the page at `url`, strips boilerplate (navigation, scripts,
/// footers, sidebars) and returns the main content with whitespace collapsed.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the page cannot be fetched, or
/// [`SearchError::Parse`] if no readable content is found.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> newswire_search::Result<()> {
/// let config = newswire_search::SearchConfig::default();
/// let page = newswire_search::fetch_page_content("https://example.com", &config).await?;
/// println!("{} ({} chars)", page.title, page.content_length);
/// # Ok(())
/// # }
/// ```
pub async fn fetch_page_content(url: &str, config: &SearchConfig) -> Result<PageContent> {
    let http = http::HttpPool::new(config)?;
    let html = http.get_text(url).await?;
    content::extract_content(&html, url)
}
