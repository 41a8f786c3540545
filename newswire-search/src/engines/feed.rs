//! RSS feed sources, optionally behind a redirect-wrapping aggregator.
//!
//! A plain feed (Bing News) returns publisher links directly. An aggregator
//! feed (Google News) wraps every link; those are unwrapped by a
//! [`RedirectResolver`] before results leave the adapter.

use futures::future::join_all;

use crate::config::{ResponseShape, SourceConfig};
use crate::engine::SourceAdapter;
use crate::error::SearchError;
use crate::http::HttpPool;
use crate::normalize::parse_feed_items;
use crate::resolve::RedirectResolver;
use crate::types::SearchResult;

/// Adapter for any RSS/Atom search feed.
#[derive(Debug, Clone)]
pub struct FeedAdapter {
    config: SourceConfig,
    resolver: Option<RedirectResolver>,
}

impl FeedAdapter {
    /// Build from a source configuration.
    ///
    /// A `redirect_host` on a feed shape enables redirect unwrapping.
    pub fn new(config: SourceConfig) -> Self {
        let resolver = match &config.shape {
            ResponseShape::Feed {
                redirect_host: Some(host),
            } => Some(RedirectResolver::new(host.clone())),
            _ => None,
        };
        Self { config, resolver }
    }

    /// Whether links from this feed are unwrapped.
    pub fn resolves_redirects(&self) -> bool {
        self.resolver.is_some()
    }
}

impl SourceAdapter for FeedAdapter {
    async fn fetch(
        &self,
        query: &str,
        max_results: usize,
        http: &HttpPool,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let source = self.config.name.as_str();
        tracing::trace!(source, query, "feed search");

        let xml = http.get_text(&self.config.endpoint(query, max_results)).await?;
        tracing::trace!(source, bytes = xml.len(), "feed response received");

        let results = parse_feed_items(&xml, max_results, source)?;
        let Some(resolver) = &self.resolver else {
            return Ok(results);
        };

        // Resolve every link of the batch concurrently.
        let resolved = join_all(results.into_iter().map(|mut result| async move {
            result.url = resolver.resolve(http, &result.url).await;
            result
        }))
        .await;
        Ok(resolved)
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}
