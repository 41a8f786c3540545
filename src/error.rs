//! Error types for the newswire enrichment layer.

/// Top-level error type for search, extraction and summarization.
#[derive(Debug, thiserror::Error)]
pub enum NewswireError {
    /// Configuration error (invalid values, missing credentials).
    #[error("config error: {0}")]
    Config(String),

    /// Error surfaced by the search engine.
    #[error("search error: {0}")]
    Search(#[from] newswire_search::SearchError),

    /// Page content could not be fetched or extracted.
    #[error("extraction error: {0}")]
    Extraction(String),

    /// The summarization provider failed or returned nothing usable.
    #[error("summarization error: {0}")]
    Summarization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed or serialized.
    #[error("config format error: {0}")]
    ConfigFormat(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, NewswireError>;
