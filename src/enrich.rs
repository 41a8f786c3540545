//! Summary enrichment for search results.
//!
//! [`SummarizationService`] extracts the page behind each of the first
//! `max_summaries` results and asks a [`Summarizer`] for a summary, all
//! concurrently. Every step has its own timeout and a batch deadline bounds
//! the whole call. Failures leave the result exactly as it was.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use newswire_search::SearchResult;
use serde::{Deserialize, Serialize};

use crate::config::SummaryConfig;
use crate::extract::ContentExtractor;
use crate::summarizer::Summarizer;

/// A search result with an optional generated summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedResult {
    /// The underlying search result.
    #[serde(flatten)]
    pub result: SearchResult,
    /// Generated summary, when one was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Characters of page content the summary was based on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_length: Option<usize>,
}

impl From<SearchResult> for EnrichedResult {
    fn from(result: SearchResult) -> Self {
        Self {
            result,
            summary: None,
            content_length: None,
        }
    }
}

/// Extract-then-summarize pipeline over search results.
#[derive(Clone)]
pub struct SummarizationService {
    extractor: Arc<dyn ContentExtractor>,
    summarizer: Arc<dyn Summarizer>,
    config: SummaryConfig,
}

impl std::fmt::Debug for SummarizationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizationService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SummarizationService {
    /// Combine an extractor and a summarizer under `config`'s timeouts.
    pub fn new(
        extractor: Arc<dyn ContentExtractor>,
        summarizer: Arc<dyn Summarizer>,
        config: SummaryConfig,
    ) -> Self {
        Self {
            extractor,
            summarizer,
            config,
        }
    }

    /// The configuration this service runs with.
    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    /// Summarize the first `max_summaries` results concurrently.
    ///
    /// Order and length are preserved. Results past the cap, results whose
    /// extraction or summary failed, and results still pending when the
    /// batch deadline fires are returned without a summary.
    pub async fn summarize_results(
        &self,
        results: Vec<SearchResult>,
        max_summaries: usize,
    ) -> Vec<EnrichedResult> {
        let mut enriched: Vec<EnrichedResult> =
            results.into_iter().map(EnrichedResult::from).collect();
        let cap = max_summaries.min(enriched.len());
        if cap == 0 {
            return enriched;
        }

        let mut pending: FuturesUnordered<_> = enriched[..cap]
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let url = item.result.url.clone();
                let title = item.result.title.clone();
                async move { (index, self.enrich_one(&url, &title).await) }
            })
            .collect();

        let deadline = tokio::time::sleep(Duration::from_secs(self.config.overall_timeout_seconds));
        tokio::pin!(deadline);
        let mut completed = Vec::with_capacity(cap);

        loop {
            tokio::select! {
                next = pending.next() => match next {
                    Some(done) => completed.push(done),
                    None => break,
                },
                () = &mut deadline => {
                    tracing::warn!(
                        pending = pending.len(),
                        "summarization timed out, keeping completed summaries"
                    );
                    break;
                }
            }
        }
        drop(pending);

        let mut summarized = 0usize;
        for (index, outcome) in completed {
            if let Some((summary, content_length)) = outcome {
                enriched[index].summary = Some(summary);
                enriched[index].content_length = Some(content_length);
                summarized += 1;
            }
        }
        tracing::info!(summarized, requested = cap, "summarization complete");
        enriched
    }

    /// Extract and summarize one URL.
    ///
    /// Returns `None` if extraction or summarization fails or times out.
    pub async fn summarize_single_url(&self, url: &str, title: Option<&str>) -> Option<String> {
        self.enrich(url, title).await.map(|(summary, _)| summary)
    }

    async fn enrich_one(&self, url: &str, title: &str) -> Option<(String, usize)> {
        self.enrich(url, Some(title)).await
    }

    async fn enrich(&self, url: &str, title: Option<&str>) -> Option<(String, usize)> {
        let extraction = Duration::from_secs(self.config.extraction_timeout_seconds);
        let page = match tokio::time::timeout(extraction, self.extractor.extract(url)).await {
            Ok(Ok(page)) => page,
            Ok(Err(err)) => {
                tracing::warn!(url, error = %err, "content extraction failed");
                return None;
            }
            Err(_) => {
                tracing::warn!(url, "content extraction timed out");
                return None;
            }
        };
        if page.content.trim().is_empty() {
            tracing::warn!(url, "no content extracted");
            return None;
        }

        let budget = Duration::from_secs(self.config.summary_timeout_seconds);
        let summary = self.summarizer.summarize(&page.content, title, Some(url));
        match tokio::time::timeout(budget, summary).await {
            Ok(Some(summary)) => Some((summary, page.content_length)),
            Ok(None) => None,
            Err(_) => {
                tracing::warn!(url, "summarization timed out");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NewswireError, Result};
    use async_trait::async_trait;
    use newswire_search::PageContent;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves fixed content per URL; URLs containing "broken" fail and
    /// URLs containing "slow" hang.
    struct FakeExtractor;

    #[async_trait]
    impl ContentExtractor for FakeExtractor {
        async fn extract(&self, url: &str) -> Result<PageContent> {
            if url.contains("broken") {
                return Err(NewswireError::Extraction("404".into()));
            }
            if url.contains("slow") {
                tokio::time::sleep(Duration::from_secs(1_000)).await;
            }
            let content = format!("Body of {url}");
            Ok(PageContent {
                url: url.into(),
                title: String::new(),
                content_length: content.chars().count(),
                content,
            })
        }
    }

    #[derive(Default)]
    struct EchoSummarizer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Summarizer for EchoSummarizer {
        async fn summarize(
            &self,
            content: &str,
            title: Option<&str>,
            _url: Option<&str>,
        ) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Some(format!("{}: {content}", title.unwrap_or("untitled")))
        }
    }

    fn result(path: &str) -> SearchResult {
        SearchResult::new(
            format!("T {path}"),
            format!("https://n.example/{path}"),
            None,
            "Bing News",
        )
    }

    fn service(summarizer: Arc<EchoSummarizer>) -> SummarizationService {
        SummarizationService::new(Arc::new(FakeExtractor), summarizer, SummaryConfig::default())
    }

    #[tokio::test]
    async fn first_results_are_summarized_in_order() {
        let echo = Arc::new(EchoSummarizer::default());
        let svc = service(Arc::clone(&echo));

        let out = svc
            .summarize_results(vec![result("a"), result("b"), result("c")], 2)
            .await;

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].summary.as_deref(), Some("T a: Body of https://n.example/a"));
        assert_eq!(out[0].content_length, Some("Body of https://n.example/a".len()));
        assert!(out[1].summary.is_some());
        assert!(out[2].summary.is_none());
        assert_eq!(out[2].result.url, "https://n.example/c");
        assert_eq!(echo.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_extraction_leaves_result_unchanged() {
        let svc = service(Arc::new(EchoSummarizer::default()));
        let out = svc
            .summarize_results(vec![result("broken"), result("ok")], 5)
            .await;
        assert!(out[0].summary.is_none());
        assert!(out[0].content_length.is_none());
        assert!(out[1].summary.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_extraction_times_out_individually() {
        let svc = service(Arc::new(EchoSummarizer::default()));
        let out = svc
            .summarize_results(vec![result("slow"), result("ok")], 5)
            .await;
        assert!(out[0].summary.is_none());
        assert!(out[1].summary.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn overall_deadline_keeps_completed_summaries() {
        let config = SummaryConfig {
            extraction_timeout_seconds: 10_000,
            overall_timeout_seconds: 5,
            ..Default::default()
        };
        let svc = SummarizationService::new(
            Arc::new(FakeExtractor),
            Arc::new(EchoSummarizer::default()),
            config,
        );
        let out = svc
            .summarize_results(vec![result("ok"), result("slow")], 5)
            .await;
        assert!(out[0].summary.is_some());
        assert!(out[1].summary.is_none());
    }

    #[tokio::test]
    async fn zero_cap_skips_everything() {
        let echo = Arc::new(EchoSummarizer::default());
        let out = service(Arc::clone(&echo))
            .summarize_results(vec![result("a")], 0)
            .await;
        assert!(out[0].summary.is_none());
        assert_eq!(echo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn single_url_summary() {
        let svc = service(Arc::new(EchoSummarizer::default()));
        assert_eq!(
            svc.summarize_single_url("https://n.example/x", Some("X")).await.as_deref(),
            Some("X: Body of https://n.example/x")
        );
        assert!(svc.summarize_single_url("https://n.example/broken", None).await.is_none());
    }

    #[test]
    fn enriched_result_serializes_flat() {
        let enriched = EnrichedResult {
            summary: Some("S".into()),
            content_length: Some(10),
            ..EnrichedResult::from(result("a"))
        };
        let json = serde_json::to_value(&enriched).expect("json");
        assert_eq!(json["title"], "T a");
        assert_eq!(json["summary"], "S");
        assert_eq!(json["content_length"], 10);

        let plain = serde_json::to_value(EnrichedResult::from(result("b"))).expect("json");
        assert!(plain.get("summary").is_none());
    }
}
