//! Core orchestrator: staggered fan-out, per-source isolation, merge.
//!
//! Every adapter runs concurrently. Adapter `i` starts `i * stagger_ms`
//! after the call begins. A source that errors, panics or exceeds
//! `source_timeout_seconds` contributes nothing; the others are unaffected.
//! When `search_timeout_seconds` elapses first, whatever has arrived is
//! returned and the stragglers are cancelled.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;

use crate::config::SearchConfig;
use crate::engine::SourceAdapter;
use crate::engines::Source;
use crate::http::HttpPool;
use crate::types::{by_recency, AggregateResponse, SearchResult};

use super::dedup::deduplicate;

/// Fans one query out to a fixed, ordered list of adapters.
#[derive(Debug)]
pub struct Orchestrator<A: SourceAdapter = Source> {
    adapters: Vec<A>,
    config: SearchConfig,
}

impl Orchestrator<Source> {
    /// Build the adapters named in `config.sources`, in order.
    pub fn new(config: SearchConfig) -> Self {
        let adapters = config
            .sources
            .iter()
            .cloned()
            .map(Source::from_config)
            .collect();
        Self { adapters, config }
    }
}

impl<A: SourceAdapter> Orchestrator<A> {
    /// Orchestrate custom adapters. Their order is the merge order.
    pub fn with_adapters(adapters: Vec<A>, config: SearchConfig) -> Self {
        Self { adapters, config }
    }

    /// The adapters in merge order.
    pub fn adapters(&self) -> &[A] {
        &self.adapters
    }

    /// The configuration this orchestrator runs with.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Query every adapter and merge the results.
    ///
    /// # Pipeline
    ///
    /// 1. Build one [`HttpPool`] for this call
    /// 2. Start adapter `i` after `i * stagger_ms`, each under the per-source timeout
    /// 3. Collect contributions until all finish or the overall deadline fires
    /// 4. Concatenate contributions in adapter order
    /// 5. Stable-sort by recency (newest first, undated last)
    /// 6. Drop duplicate URLs if configured, keeping the first occurrence
    /// 7. Truncate to `max_total_results` if configured
    ///
    /// Never fails: a total outage yields an empty result list.
    pub async fn aggregate(&self, query: &str, max_per_source: usize) -> AggregateResponse {
        let http = match HttpPool::new(&self.config) {
            Ok(pool) => pool,
            Err(err) => {
                tracing::error!(error = %err, "failed to build HTTP pool");
                return AggregateResponse::empty(query);
            }
        };

        let contributions = self.collect(&http, query, max_per_source).await;
        let results = merge_contributions(
            contributions,
            self.config.dedup_urls,
            self.config.max_total_results,
        );
        tracing::debug!(count = results.len(), "aggregate complete");

        AggregateResponse {
            query: query.to_owned(),
            results,
        }
    }

    /// Run every adapter and return `(adapter index, results)` pairs for
    /// those that finished before the overall deadline.
    async fn collect(
        &self,
        http: &HttpPool,
        query: &str,
        max_per_source: usize,
    ) -> Vec<(usize, Vec<SearchResult>)> {
        let source_timeout = Duration::from_secs(self.config.source_timeout_seconds);
        let stagger = Duration::from_millis(self.config.stagger_ms);

        let mut pending: FuturesUnordered<_> = self
            .adapters
            .iter()
            .enumerate()
            .map(|(index, adapter)| async move {
                let delay = stagger.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }

                let run = tokio::time::timeout(
                    source_timeout,
                    adapter.get_results(query, max_per_source, http),
                );
                let results = match AssertUnwindSafe(run).catch_unwind().await {
                    Ok(Ok(results)) => results,
                    Ok(Err(_)) => {
                        tracing::warn!(source = adapter.name(), "source timed out");
                        Vec::new()
                    }
                    Err(_) => {
                        tracing::error!(source = adapter.name(), "source panicked");
                        Vec::new()
                    }
                };
                (index, results)
            })
            .collect();

        let mut contributions = Vec::with_capacity(self.adapters.len());
        let deadline = tokio::time::sleep(Duration::from_secs(self.config.search_timeout_seconds));
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                next = pending.next() => match next {
                    Some(contribution) => contributions.push(contribution),
                    None => break,
                },
                () = &mut deadline => {
                    tracing::warn!(
                        pending = pending.len(),
                        "search deadline reached, returning partial results"
                    );
                    break;
                }
            }
        }

        contributions
    }
}

/// Merge per-adapter contributions into the final result list.
///
/// Contributions are concatenated by adapter index, so among results with
/// equal dates the earlier adapter (and, within one adapter, the earlier
/// item) comes first.
pub fn merge_contributions(
    mut contributions: Vec<(usize, Vec<SearchResult>)>,
    dedup_urls: bool,
    max_total: Option<usize>,
) -> Vec<SearchResult> {
    contributions.sort_by_key(|(index, _)| *index);
    let mut merged: Vec<SearchResult> = contributions
        .into_iter()
        .flat_map(|(_, results)| results)
        .collect();

    // `sort_by` is stable.
    merged.sort_by(by_recency);

    if dedup_urls {
        merged = deduplicate(merged);
    }
    if let Some(max) = max_total {
        merged.truncate(max);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    type Started = Arc<Mutex<Vec<(&'static str, Instant)>>>;

    fn day(d: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 10, d).and_then(|x| x.and_hms_opt(12, 0, 0))
    }

    fn make_result(url: &str, source: &str, date: Option<NaiveDateTime>) -> SearchResult {
        SearchResult::new(format!("Title {url}"), url, date, source)
    }

    enum Behaviour {
        Results(Vec<SearchResult>),
        Fail,
        Slow(Duration, Vec<SearchResult>),
        Panic,
    }

    struct MockSource {
        name: &'static str,
        behaviour: Behaviour,
        started: Started,
    }

    impl SourceAdapter for MockSource {
        async fn fetch(
            &self,
            _query: &str,
            _max_results: usize,
            _http: &HttpPool,
        ) -> Result<Vec<SearchResult>, SearchError> {
            if let Ok(mut started) = self.started.lock() {
                started.push((self.name, Instant::now()));
            }
            match &self.behaviour {
                Behaviour::Results(results) => Ok(results.clone()),
                Behaviour::Fail => Err(SearchError::Http("HTTP 500".into())),
                Behaviour::Slow(delay, results) => {
                    tokio::time::sleep(*delay).await;
                    Ok(results.clone())
                }
                Behaviour::Panic => panic!("mock source exploded"),
            }
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    struct Harness {
        started: Started,
        adapters: Vec<MockSource>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                started: Arc::new(Mutex::new(Vec::new())),
                adapters: Vec::new(),
            }
        }

        fn with(mut self, name: &'static str, behaviour: Behaviour) -> Self {
            self.adapters.push(MockSource {
                name,
                behaviour,
                started: Arc::clone(&self.started),
            });
            self
        }

        fn orchestrator(self, config: SearchConfig) -> (Orchestrator<MockSource>, Started) {
            (Orchestrator::with_adapters(self.adapters, config), self.started)
        }
    }

    fn config() -> SearchConfig {
        SearchConfig {
            stagger_ms: 0,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn results_sorted_newest_first_with_undated_last() {
        let (orch, _) = Harness::new()
            .with(
                "A",
                Behaviour::Results(vec![
                    make_result("https://a.example/old", "A", day(1)),
                    make_result("https://a.example/undated", "A", None),
                ]),
            )
            .with(
                "B",
                Behaviour::Results(vec![make_result("https://b.example/new", "B", day(9))]),
            )
            .orchestrator(config());

        let response = orch.aggregate("apple", 5).await;
        let urls: Vec<&str> = response.results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "https://b.example/new",
                "https://a.example/old",
                "https://a.example/undated"
            ]
        );
        assert_eq!(response.query, "apple");
    }

    #[tokio::test(start_paused = true)]
    async fn equal_dates_keep_adapter_order() {
        let (orch, _) = Harness::new()
            .with("A", Behaviour::Results(vec![make_result("https://a.example/1", "A", day(3))]))
            .with("B", Behaviour::Results(vec![make_result("https://b.example/1", "B", day(3))]))
            .orchestrator(config());

        let response = orch.aggregate("q", 5).await;
        assert_eq!(response.results[0].source, "A");
        assert_eq!(response.results[1].source, "B");
    }

    #[tokio::test(start_paused = true)]
    async fn failing_source_does_not_affect_others() {
        let (orch, _) = Harness::new()
            .with("Broken", Behaviour::Fail)
            .with("Ok", Behaviour::Results(vec![make_result("https://ok.example/", "Ok", day(2))]))
            .orchestrator(config());

        let response = orch.aggregate("q", 5).await;
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].source, "Ok");
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_source_contributes_nothing() {
        let (orch, _) = Harness::new()
            .with("Panics", Behaviour::Panic)
            .with("Ok", Behaviour::Results(vec![make_result("https://ok.example/", "Ok", None)]))
            .orchestrator(config());

        let response = orch.aggregate("q", 5).await;
        assert_eq!(response.results.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_source_is_cut_at_source_timeout() {
        let cfg = SearchConfig {
            source_timeout_seconds: 2,
            ..config()
        };
        let (orch, _) = Harness::new()
            .with(
                "Slow",
                Behaviour::Slow(
                    Duration::from_secs(10),
                    vec![make_result("https://slow.example/", "Slow", day(5))],
                ),
            )
            .with(
                "Fast",
                Behaviour::Results(vec![make_result("https://fast.example/", "Fast", day(1))]),
            )
            .orchestrator(cfg);

        let started = Instant::now();
        let response = orch.aggregate("q", 5).await;
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].source, "Fast");
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn overall_deadline_returns_partial_results() {
        let cfg = SearchConfig {
            source_timeout_seconds: 100,
            search_timeout_seconds: 5,
            ..config()
        };
        let (orch, _) = Harness::new()
            .with(
                "Fast",
                Behaviour::Results(vec![make_result("https://fast.example/", "Fast", None)]),
            )
            .with(
                "Hung",
                Behaviour::Slow(
                    Duration::from_secs(60),
                    vec![make_result("https://hung.example/", "Hung", None)],
                ),
            )
            .orchestrator(cfg);

        let started = Instant::now();
        let response = orch.aggregate("q", 5).await;
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].source, "Fast");
        assert!(started.elapsed() <= Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn adapters_start_staggered() {
        let cfg = SearchConfig {
            stagger_ms: 500,
            ..Default::default()
        };
        let (orch, started) = Harness::new()
            .with("A", Behaviour::Results(vec![]))
            .with("B", Behaviour::Results(vec![]))
            .with("C", Behaviour::Results(vec![]))
            .orchestrator(cfg);

        let t0 = Instant::now();
        orch.aggregate("q", 5).await;

        let started = started.lock().expect("lock").clone();
        let offset = |name: &str| {
            started
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, at)| at.duration_since(t0))
                .expect("adapter started")
        };
        assert!(offset("A") < Duration::from_millis(100));
        assert!(offset("B") >= Duration::from_millis(500));
        assert!(offset("B") < Duration::from_millis(600));
        assert!(offset("C") >= Duration::from_millis(1000));
        assert!(offset("C") < Duration::from_millis(1100));
    }

    #[tokio::test(start_paused = true)]
    async fn all_sources_failing_yields_empty() {
        let (orch, _) = Harness::new()
            .with("A", Behaviour::Fail)
            .with("B", Behaviour::Fail)
            .orchestrator(config());

        let response = orch.aggregate("q", 5).await;
        assert_eq!(response, AggregateResponse::empty("q"));
    }

    #[tokio::test(start_paused = true)]
    async fn per_source_cap_is_enforced() {
        let many = (0..10)
            .map(|i| make_result(&format!("https://a.example/{i}"), "A", None))
            .collect();
        let (orch, _) = Harness::new()
            .with("A", Behaviour::Results(many))
            .orchestrator(config());

        assert_eq!(orch.aggregate("q", 3).await.results.len(), 3);
    }

    #[test]
    fn merge_dedups_keeping_most_recent_copy() {
        let merged = merge_contributions(
            vec![
                (0, vec![make_result("https://x.example/story", "A", day(1))]),
                (1, vec![make_result("https://x.example/story/", "B", day(4))]),
            ],
            true,
            None,
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, "B");
    }

    #[test]
    fn merge_without_dedup_keeps_duplicates() {
        let merged = merge_contributions(
            vec![
                (0, vec![make_result("https://x.example/", "A", None)]),
                (1, vec![make_result("https://x.example/", "B", None)]),
            ],
            false,
            None,
        );
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merge_orders_contributions_by_index() {
        let merged = merge_contributions(
            vec![
                (1, vec![make_result("https://b.example/", "B", None)]),
                (0, vec![make_result("https://a.example/", "A", None)]),
            ],
            true,
            None,
        );
        assert_eq!(merged[0].source, "A");
    }

    #[test]
    fn merge_applies_total_cap() {
        let results = (0..6)
            .map(|i| make_result(&format!("https://a.example/{i}"), "A", day(i + 1)))
            .collect();
        let merged = merge_contributions(vec![(0, results)], true, Some(4));
        assert_eq!(merged.len(), 4);
        assert_eq!(merged[0].published_date, day(6));
    }

    #[test]
    fn default_orchestrator_builds_configured_sources() {
        let orch = Orchestrator::new(SearchConfig::default());
        let names: Vec<&str> = orch.adapters().iter().map(|a| a.name()).collect();
        assert_eq!(names, ["Bing News", "Google News", "Wikipedia"]);
    }
}
