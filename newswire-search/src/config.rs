//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls which sources are queried, timeouts, caching,
//! concurrency bounds and request behaviour. [`SourceConfig`] describes one
//! compiled-in adapter: its endpoint template, response shape and display name.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// How a source's response is shaped, and therefore which adapter handles it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponseShape {
    /// An RSS/Atom feed. When `redirect_host` is set, item links on that host
    /// are redirect wrappers and are resolved before results are returned.
    Feed {
        #[serde(default)]
        redirect_host: Option<String>,
    },
    /// A JSON search API. Result URLs are built from `page_url_template`,
    /// which must contain a `{pageid}` placeholder.
    SearchApi { page_url_template: String },
}

/// Immutable per-source configuration, built once when the orchestrator starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Display name, stamped on every result as `SearchResult::source`.
    pub name: String,
    /// Endpoint URL with a `{query}` placeholder and an optional `{limit}`.
    pub url_template: String,
    /// Response shape.
    pub shape: ResponseShape,
}

impl SourceConfig {
    /// Bing News RSS search. Links point directly at publishers.
    pub fn bing_news() -> Self {
        Self {
            name: "Bing News".into(),
            url_template: "https://www.bing.com/news/search?q={query}&format=RSS".into(),
            shape: ResponseShape::Feed {
                redirect_host: None,
            },
        }
    }

    /// Google News RSS search. Links are `news.google.com` redirect wrappers.
    pub fn google_news() -> Self {
        Self {
            name: "Google News".into(),
            url_template: "https://news.google.com/rss/search?q={query}&hl=en-US&gl=US&ceid=US:en"
                .into(),
            shape: ResponseShape::Feed {
                redirect_host: Some("news.google.com".into()),
            },
        }
    }

    /// English Wikipedia full-text search via the MediaWiki API.
    pub fn wikipedia() -> Self {
        Self {
            name: "Wikipedia".into(),
            url_template: "https://en.wikipedia.org/w/api.php?action=query&list=search&srsearch={query}&utf8=&format=json&srlimit={limit}".into(),
            shape: ResponseShape::SearchApi {
                page_url_template: "https://en.wikipedia.org/?curid={pageid}".into(),
            },
        }
    }

    /// Expand the endpoint template for one call.
    ///
    /// The query is percent-encoded; `{limit}` becomes `max_results`.
    pub fn endpoint(&self, query: &str, max_results: usize) -> String {
        self.url_template
            .replace("{query}", &urlencoding::encode(query))
            .replace("{limit}", &max_results.to_string())
    }

    fn validate(&self) -> Result<(), SearchError> {
        if self.name.trim().is_empty() {
            return Err(SearchError::Config("source name must not be empty".into()));
        }
        if !self.url_template.contains("{query}") {
            return Err(SearchError::Config(format!(
                "source {} url_template must contain {{query}}",
                self.name
            )));
        }
        if let ResponseShape::SearchApi { page_url_template } = &self.shape {
            if !page_url_template.contains("{pageid}") {
                return Err(SearchError::Config(format!(
                    "source {} page_url_template must contain {{pageid}}",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for the aggregation engine.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Sources to query. Queried concurrently in this order; the order is the
    /// secondary sort key for results with equal or missing dates.
    pub sources: Vec<SourceConfig>,
    /// Default per-source result cap used by callers that do not pass one.
    pub max_results_per_source: usize,
    /// Overall cap on the merged list. `None` returns everything.
    pub max_total_results: Option<usize>,
    /// Total HTTP request timeout in seconds.
    pub timeout_seconds: u64,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_seconds: u64,
    /// Budget for one adapter call (including redirect resolution).
    pub source_timeout_seconds: u64,
    /// Budget for the whole fan-out. Sources still running at the deadline
    /// are cancelled and the response is built from what completed.
    pub search_timeout_seconds: u64,
    /// Start delay between consecutive adapters, in milliseconds.
    pub stagger_ms: u64,
    /// How long an aggregate response stays cached, in seconds.
    pub cache_ttl_seconds: u64,
    /// Maximum number of aggregate searches running at once.
    pub max_concurrent_searches: usize,
    /// Maximum simultaneous outbound HTTP requests per aggregate call.
    pub max_connections: usize,
    /// Maximum simultaneous outbound HTTP requests to one host.
    pub max_connections_per_host: usize,
    /// Drop later results whose normalised URL was already seen.
    pub dedup_urls: bool,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                SourceConfig::bing_news(),
                SourceConfig::google_news(),
                SourceConfig::wikipedia(),
            ],
            max_results_per_source: 5,
            max_total_results: None,
            timeout_seconds: 30,
            connect_timeout_seconds: 10,
            source_timeout_seconds: 45,
            search_timeout_seconds: 90,
            stagger_ms: 500,
            cache_ttl_seconds: 900,
            max_concurrent_searches: 10,
            max_connections: 50,
            max_connections_per_host: 10,
            dedup_urls: true,
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - every timeout is greater than 0
    /// - concurrency and connection bounds are greater than 0
    /// - `sources` is not empty and every source is well-formed
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.connect_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "connect_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.source_timeout_seconds == 0 || self.search_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "source and search timeouts must be greater than 0".into(),
            ));
        }
        if self.max_concurrent_searches == 0 {
            return Err(SearchError::Config(
                "max_concurrent_searches must be greater than 0".into(),
            ));
        }
        if self.max_connections == 0 || self.max_connections_per_host == 0 {
            return Err(SearchError::Config(
                "connection limits must be greater than 0".into(),
            ));
        }
        if self.sources.is_empty() {
            return Err(SearchError::Config(
                "at least one source must be configured".into(),
            ));
        }
        self.sources.iter().try_for_each(SourceConfig::validate)
    }
}
