//! Newswire: aggregated news search with optional LLM summaries.
//!
//! This crate layers content enrichment on top of `newswire-search`:
//! Query → sources (fan-out) → merged results → page extraction → summary
//!
//! # Architecture
//!
//! - **Search**: [`newswire_search::SearchService`] fans out, merges and caches
//! - **Extraction**: a [`ContentExtractor`] fetches each result's page text
//! - **Summarization**: a [`Summarizer`] condenses it via an OpenAI-compatible API
//! - **Facade**: [`Newswire`] runs the whole pipeline in one call

pub mod config;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod logging;
pub mod report;
pub mod summarizer;

pub use config::{NewswireConfig, SummaryConfig, SummaryLength};
pub use enrich::{EnrichedResult, SummarizationService};
pub use error::{NewswireError, Result};
pub use extract::{BlockingExtractor, ContentExtractor, HttpExtractor};
pub use newswire_search::{AggregateResponse, PageContent, SearchConfig, SearchResult};
pub use report::{Newswire, Report};
pub use summarizer::{OpenAiSummarizer, Summarizer};
