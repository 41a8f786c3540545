//! Page-content extraction collaborators.
//!
//! [`ContentExtractor`] is the seam between summarization and whatever
//! turns a URL into readable text. [`HttpExtractor`] is the default and uses
//! the search engine's own page fetcher; [`BlockingExtractor`] adapts a
//! synchronous extraction function by running it on the blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use newswire_search::{PageContent, SearchConfig};

use crate::error::{NewswireError, Result};

/// Turns a URL into readable page text.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Fetch `url` and extract its main content.
    ///
    /// # Errors
    ///
    /// Returns [`NewswireError::Extraction`] if the page cannot be fetched or
    /// has no readable content.
    async fn extract(&self, url: &str) -> Result<PageContent>;
}

/// Fetches pages over HTTP and strips boilerplate.
#[derive(Debug, Clone)]
pub struct HttpExtractor {
    config: SearchConfig,
}

impl HttpExtractor {
    /// Extractor using the timeouts and User-Agent policy of `config`.
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ContentExtractor for HttpExtractor {
    async fn extract(&self, url: &str) -> Result<PageContent> {
        newswire_search::fetch_page_content(url, &self.config)
            .await
            .map_err(|e| NewswireError::Extraction(format!("{url}: {e}")))
    }
}

/// Runs a synchronous extractor without stalling the async runtime.
pub struct BlockingExtractor<F> {
    extract: Arc<F>,
}

impl<F> BlockingExtractor<F>
where
    F: Fn(&str) -> Result<PageContent> + Send + Sync + 'static,
{
    /// Wrap a synchronous extraction function.
    pub fn new(extract: F) -> Self {
        Self {
            extract: Arc::new(extract),
        }
    }
}

#[async_trait]
impl<F> ContentExtractor for BlockingExtractor<F>
where
    F: Fn(&str) -> Result<PageContent> + Send + Sync + 'static,
{
    async fn extract(&self, url: &str) -> Result<PageContent> {
        let extract = Arc::clone(&self.extract);
        let url = url.to_owned();
        tokio::task::spawn_blocking(move || extract(&url))
            .await
            .map_err(|e| NewswireError::Extraction(format!("extraction task failed: {e}")))?
    }
}
