//! One-call search with optional summaries.

use std::sync::Arc;

use newswire_search::SearchService;
use serde::{Deserialize, Serialize};

use crate::config::NewswireConfig;
use crate::enrich::{EnrichedResult, SummarizationService};
use crate::error::Result;
use crate::extract::HttpExtractor;
use crate::summarizer::OpenAiSummarizer;

/// Search results for one query, possibly with summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// The query as given by the caller.
    pub query: String,
    /// Merged results, newest first.
    pub results: Vec<EnrichedResult>,
}

impl Report {
    /// Number of results that carry a summary.
    pub fn summarized(&self) -> usize {
        self.results.iter().filter(|r| r.summary.is_some()).count()
    }
}

/// Search aggregation plus optional summary enrichment.
#[derive(Debug)]
pub struct Newswire {
    search: SearchService,
    summaries: Option<SummarizationService>,
    config: NewswireConfig,
}

impl Newswire {
    /// Build a search-only instance.
    ///
    /// # Errors
    ///
    /// Returns a config error if the search section is invalid.
    pub fn new(config: NewswireConfig) -> Result<Self> {
        let search = SearchService::new(config.search.clone())?;
        Ok(Self {
            search,
            summaries: None,
            config,
        })
    }

    /// Attach a summarization service.
    #[must_use]
    pub fn with_summaries(mut self, summaries: SummarizationService) -> Self {
        self.summaries = Some(summaries);
        self
    }

    /// Attach the HTTP extractor and the OpenAI-compatible summarizer
    /// described by the configuration.
    ///
    /// # Errors
    ///
    /// Returns a config error if the summary section is invalid or its
    /// provider needs a key that cannot be found.
    pub fn with_default_summaries(self) -> Result<Self> {
        let summarizer = OpenAiSummarizer::new(self.config.summary.clone())?;
        let extractor = HttpExtractor::new(self.config.search.clone());
        let service = SummarizationService::new(
            Arc::new(extractor),
            Arc::new(summarizer),
            self.config.summary.clone(),
        );
        Ok(self.with_summaries(service))
    }

    /// The underlying search service.
    pub fn search_service(&self) -> &SearchService {
        &self.search
    }

    /// The attached summarization service, if any.
    pub fn summaries(&self) -> Option<&SummarizationService> {
        self.summaries.as_ref()
    }

    /// The configuration this instance was built from.
    pub fn config(&self) -> &NewswireConfig {
        &self.config
    }

    /// Search for `query` and optionally summarize the top results.
    ///
    /// Uses `max_results_per_source` from the search configuration. With
    /// `include_summaries` and no summarization service attached, plain
    /// results are returned.
    ///
    /// # Errors
    ///
    /// Only search configuration errors surface; source and summary
    /// failures shrink or thin out the report instead.
    pub async fn search(
        &self,
        query: &str,
        include_summaries: bool,
        max_summaries: usize,
    ) -> Result<Report> {
        let response = self.search.search_default(query).await?;
        tracing::info!(results = response.results.len(), "search complete");

        let results = match (&self.summaries, include_summaries) {
            (Some(service), true) => {
                service
                    .summarize_results(response.results, max_summaries)
                    .await
            }
            (None, true) => {
                tracing::warn!("summaries requested but no summarizer is configured");
                plain(response.results)
            }
            (_, false) => plain(response.results),
        };

        Ok(Report {
            query: response.query,
            results,
        })
    }
}

fn plain(results: Vec<newswire_search::SearchResult>) -> Vec<EnrichedResult> {
    results.into_iter().map(EnrichedResult::from).collect()
}
