//! Error types for the newswire-search crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. Adapter-level variants never reach callers of
//! [`crate::SearchService`]; they are logged and turned into an empty
//! contribution at the adapter boundary.

/// Errors that can occur while fetching, decoding or aggregating results.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// An HTTP request to a source failed (transport error or non-2xx status).
    #[error("HTTP error: {0}")]
    Http(String),

    /// A source response (feed XML, JSON, redirect page) could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// A source or the whole aggregate exceeded its time budget.
    #[error("search timed out: {0}")]
    Timeout(String),

    /// Invalid search configuration or misuse of the cache/rate limiter.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for newswire-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
