//! Cached, concurrency-bounded entry point for aggregate searches.
//!
//! [`SearchService`] owns one [`Orchestrator`], one [`QueryCache`] and one
//! counting semaphore. Cache hits are answered without touching the
//! semaphore; misses wait for a slot, so at most `max_concurrent_searches`
//! aggregations run at once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::cache::{CacheKey, QueryCache};
use crate::config::SearchConfig;
use crate::engine::SourceAdapter;
use crate::engines::Source;
use crate::error::{Result, SearchError};
use crate::orchestrator::Orchestrator;
use crate::types::AggregateResponse;

/// The public search surface.
#[derive(Debug)]
pub struct SearchService<A: SourceAdapter = Source> {
    orchestrator: Orchestrator<A>,
    cache: QueryCache,
    gate: Arc<Semaphore>,
}

impl SearchService<Source> {
    /// Build a service over the sources named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configuration is invalid.
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(Orchestrator::new(config.clone()), &config))
    }
}

impl<A: SourceAdapter> SearchService<A> {
    /// Build a service over custom adapters, in merge order.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configuration is invalid.
    pub fn with_adapters(adapters: Vec<A>, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(
            Orchestrator::with_adapters(adapters, config.clone()),
            &config,
        ))
    }

    fn assemble(orchestrator: Orchestrator<A>, config: &SearchConfig) -> Self {
        Self {
            orchestrator,
            cache: QueryCache::new(Duration::from_secs(config.cache_ttl_seconds)),
            gate: Arc::new(Semaphore::new(config.max_concurrent_searches)),
        }
    }

    /// The configuration this service runs with.
    pub fn config(&self) -> &SearchConfig {
        self.orchestrator.config()
    }

    /// Search every source for `query`, returning at most `max_results`
    /// results per source.
    ///
    /// Source failures never surface here; they only shrink the result list.
    /// Two concurrent misses for the same key both run.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for a zero `max_results` or if the
    /// concurrency gate has been closed.
    pub async fn search(&self, query: &str, max_results: usize) -> Result<AggregateResponse> {
        if max_results == 0 {
            return Err(SearchError::Config("max_results must be at least 1".into()));
        }

        let key = CacheKey::new(query, max_results);
        if let Some(hit) = self.cache.get(&key).await {
            tracing::debug!("search cache hit");
            return Ok(AggregateResponse {
                query: query.to_owned(),
                results: hit.results.clone(),
            });
        }

        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| SearchError::Config("search gate closed".into()))?;
        tracing::trace!(query, max_results, "aggregate search");

        let response = self.orchestrator.aggregate(query, max_results).await;
        self.cache.insert(key, Arc::new(response.clone())).await;
        Ok(response)
    }

    /// Search with `max_results_per_source` from the configuration.
    ///
    /// # Errors
    ///
    /// Same as [`SearchService::search`].
    pub async fn search_default(&self, query: &str) -> Result<AggregateResponse> {
        self.search(query, self.config().max_results_per_source).await
    }

    /// Number of aggregations that could start right now without waiting.
    pub fn available_slots(&self) -> usize {
        self.gate.available_permits()
    }

    /// Drop all cached responses.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
