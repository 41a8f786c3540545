//! Source adapter implementations.
//!
//! Each module provides a struct implementing [`crate::engine::SourceAdapter`]
//! for one response shape. [`Source`] dispatches statically between them.

pub mod feed;
pub mod wikipedia;

pub use feed::FeedAdapter;
pub use wikipedia::WikipediaAdapter;

use crate::config::{ResponseShape, SourceConfig};
use crate::engine::SourceAdapter;
use crate::error::SearchError;
use crate::http::HttpPool;
use crate::types::SearchResult;

/// One configured source, dispatching to the concrete adapter.
#[derive(Debug, Clone)]
pub enum Source {
    /// RSS/Atom feed, with or without redirect unwrapping.
    Feed(FeedAdapter),
    /// JSON search API.
    Wikipedia(WikipediaAdapter),
}

impl Source {
    /// Pick the adapter for a source by its response shape.
    pub fn from_config(config: SourceConfig) -> Self {
        match config.shape {
            ResponseShape::Feed { .. } => Self::Feed(FeedAdapter::new(config)),
            ResponseShape::SearchApi { .. } => Self::Wikipedia(WikipediaAdapter::new(config)),
        }
    }
}

impl SourceAdapter for Source {
    async fn fetch(
        &self,
        query: &str,
        max_results: usize,
        http: &HttpPool,
    ) -> Result<Vec<SearchResult>, SearchError> {
        match self {
            Self::Feed(adapter) => adapter.fetch(query, max_results, http).await,
            Self::Wikipedia(adapter) => adapter.fetch(query, max_results, http).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Feed(adapter) => adapter.name(),
            Self::Wikipedia(adapter) => adapter.name(),
        }
    }
}
