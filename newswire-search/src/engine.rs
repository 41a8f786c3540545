//! Trait definition for pluggable source adapters.
//!
//! Each news source (an RSS feed, a redirect-wrapping aggregator feed, a
//! search API) implements [`SourceAdapter`] so the orchestrator can query
//! them uniformly.

use crate::error::SearchError;
use crate::http::HttpPool;
use crate::types::SearchResult;

/// A pluggable source backend.
///
/// Implementors fetch one source's response and extract normalised
/// [`SearchResult`] values. Each adapter handles its own:
///
/// - Endpoint construction with query encoding
/// - Response parsing (feed XML or JSON)
/// - Any per-source URL post-processing such as redirect unwrapping
///
/// All implementations must be `Send + Sync` for concurrent fan-out.
pub trait SourceAdapter: Send + Sync {
    /// Query the source and return parsed results.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails or the response cannot
    /// be parsed.
    fn fetch(
        &self,
        query: &str,
        max_results: usize,
        http: &HttpPool,
    ) -> impl std::future::Future<Output = Result<Vec<SearchResult>, SearchError>> + Send;

    /// Display name stamped on every result from this source.
    fn name(&self) -> &str;

    /// Query the source, treating any failure as "no results".
    ///
    /// Errors are logged at warn level and never propagate; at most
    /// `max_results` results are returned.
    fn get_results(
        &self,
        query: &str,
        max_results: usize,
        http: &HttpPool,
    ) -> impl std::future::Future<Output = Vec<SearchResult>> + Send {
        async move {
            match self.fetch(query, max_results, http).await {
                Ok(mut results) => {
                    results.truncate(max_results);
                    tracing::debug!(
                        source = self.name(),
                        count = results.len(),
                        "source returned results"
                    );
                    results
                }
                Err(err) => {
                    tracing::warn!(source = self.name(), error = %err, "source query failed");
                    Vec::new()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;

    /// A mock adapter for testing trait bounds and the failure policy.
    struct MockAdapter {
        results: Vec<SearchResult>,
    }

    impl MockAdapter {
        fn new(results: Vec<SearchResult>) -> Self {
            Self { results }
        }

        fn failing() -> Self {
            Self { results: vec![] }
        }
    }

    impl SourceAdapter for MockAdapter {
        async fn fetch(
            &self,
            _query: &str,
            _max_results: usize,
            _http: &HttpPool,
        ) -> Result<Vec<SearchResult>, SearchError> {
            if self.results.is_empty() {
                return Err(SearchError::Parse("mock source failure".into()));
            }
            Ok(self.results.clone())
        }

        fn name(&self) -> &str {
            "Mock"
        }
    }

    fn result(n: usize) -> SearchResult {
        SearchResult::new(format!("T{n}"), format!("https://m.example/{n}"), None, "Mock")
    }

    #[test]
    fn mock_adapter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockAdapter>();
    }

    #[tokio::test]
    async fn fetch_propagates_errors() {
        let http = HttpPool::new(&SearchConfig::default()).expect("pool");
        let err = MockAdapter::failing()
            .fetch("q", 5, &http)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("mock source failure"));
    }

    #[tokio::test]
    async fn get_results_swallows_errors() {
        let http = HttpPool::new(&SearchConfig::default()).expect("pool");
        assert!(MockAdapter::failing().get_results("q", 5, &http).await.is_empty());
    }

    #[tokio::test]
    async fn get_results_caps_at_max_results() {
        let http = HttpPool::new(&SearchConfig::default()).expect("pool");
        let adapter = MockAdapter::new((0..8).map(result).collect());
        let results = adapter.get_results("q", 3, &http).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "T0");
    }
}
