//! Shared pooled HTTP client for source requests.
//!
//! [`HttpPool`] wraps one [`reqwest::Client`] with browser-like headers and a
//! rotating User-Agent, and bounds outbound concurrency with a total
//! semaphore plus one semaphore per host. A pool is built for one aggregate
//! call and shared read-only by every adapter; dropping it releases all
//! connections, on every exit path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::SearchConfig;
use crate::error::SearchError;

/// Realistic browser User-Agent strings, rotated per pool.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
];

/// A pooled HTTP client with bounded total and per-host concurrency.
#[derive(Debug)]
pub struct HttpPool {
    client: reqwest::Client,
    total: Arc<Semaphore>,
    per_host: Mutex<HashMap<String, Arc<Semaphore>>>,
    per_host_limit: usize,
}

/// Permits held for the lifetime of one request.
struct Permits {
    _total: OwnedSemaphorePermit,
    _host: OwnedSemaphorePermit,
}

impl HttpPool {
    /// Build a pool configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the client cannot be constructed.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = build_client(config)?;
        Ok(Self {
            client,
            total: Arc::new(Semaphore::new(config.max_connections)),
            per_host: Mutex::new(HashMap::new()),
            per_host_limit: config.max_connections_per_host,
        })
    }

    /// GET `url` and return the body as text.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] on transport failure or a non-2xx status.
    pub async fn get_text(&self, url: &str) -> Result<String, SearchError> {
        let _permits = self.acquire(url).await?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("bad status: {e}")))?;

        response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("response read failed: {e}")))
    }

    /// POST a form-encoded body to `url` and return the response text.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] on transport failure or a non-2xx status.
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<String, SearchError> {
        let _permits = self.acquire(url).await?;
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("bad status: {e}")))?;

        response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("response read failed: {e}")))
    }

    async fn acquire(&self, url: &str) -> Result<Permits, SearchError> {
        let host = host_key(url);
        let host_sem = {
            let mut map = self
                .per_host
                .lock()
                .map_err(|_| SearchError::Http("host limiter poisoned".into()))?;
            Arc::clone(
                map.entry(host)
                    .or_insert_with(|| Arc::new(Semaphore::new(self.per_host_limit))),
            )
        };

        let total = Arc::clone(&self.total)
            .acquire_owned()
            .await
            .map_err(|_| SearchError::Http("connection pool closed".into()))?;
        let host = host_sem
            .acquire_owned()
            .await
            .map_err(|_| SearchError::Http("host limiter closed".into()))?;

        Ok(Permits {
            _total: total,
            _host: host,
        })
    }

    /// Number of request slots currently free across all hosts.
    pub fn available_connections(&self) -> usize {
        self.total.available_permits()
    }
}

/// Build a [`reqwest::Client`] configured for feed and API requests.
///
/// The client has:
/// - Cookie store enabled
/// - Total and connect timeouts from config
/// - Random User-Agent from built-in rotation list (or custom if configured)
/// - Browser-like `Accept` / `Accept-Language` headers
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );

    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.timeout_seconds))
        .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .pool_max_idle_per_host(config.max_connections_per_host)
        .user_agent(ua)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// Host (with port) used to key the per-host limiter.
fn host_key(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.host_str()
                .map(|h| match u.port() {
                    Some(port) => format!("{h}:{port}"),
                    None => h.to_owned(),
                })
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_user_agent_returns_valid_ua() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
        assert!(ua.contains("Mozilla/5.0"));
    }

    #[test]
    fn build_client_with_default_config() {
        assert!(build_client(&SearchConfig::default()).is_ok());
    }

    #[test]
    fn build_client_with_custom_ua() {
        let config = SearchConfig {
            user_agent: Some("CustomBot/1.0".into()),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn host_key_includes_port() {
        assert_eq!(host_key("http://127.0.0.1:8080/feed"), "127.0.0.1:8080");
        assert_eq!(host_key("https://news.google.com/rss"), "news.google.com");
        assert_eq!(host_key("not a url"), "");
    }

    #[tokio::test]
    async fn permits_are_released_after_request() {
        let config = SearchConfig {
            max_connections: 2,
            ..Default::default()
        };
        let pool = HttpPool::new(&config).expect("pool");
        assert_eq!(pool.available_connections(), 2);
        {
            let _held = pool.acquire("https://a.example/x").await.expect("permit");
            assert_eq!(pool.available_connections(), 1);
        }
        assert_eq!(pool.available_connections(), 2);
    }
}
