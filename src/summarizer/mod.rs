//! LLM summarization collaborators.
//!
//! [`Summarizer`] turns article text into a summary. Implementations never
//! fail loudly: empty input, provider errors and empty replies all yield
//! `None` and are logged.

pub mod openai;

pub use openai::OpenAiSummarizer;

use std::borrow::Cow;

use async_trait::async_trait;

use crate::config::SummaryLength;

/// Appended to content cut at `max_content_length`.
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated for summarization]";

/// Produces a summary of page content.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `content`. `title` and `url` are optional context.
    ///
    /// Returns `None` for empty content or on any failure.
    async fn summarize(
        &self,
        content: &str,
        title: Option<&str>,
        url: Option<&str>,
    ) -> Option<String>;
}

/// Trim-check and cap content before it is sent to a model.
///
/// Returns `None` when there is nothing to summarize. Content longer than
/// `max_chars` characters is cut and marked with [`TRUNCATION_MARKER`].
pub fn prepare_content(content: &str, max_chars: usize) -> Option<Cow<'_, str>> {
    if content.trim().is_empty() {
        return None;
    }
    match content.char_indices().nth(max_chars) {
        None => Some(Cow::Borrowed(content)),
        Some((cut, _)) => {
            tracing::debug!(
                chars = content.chars().count(),
                max_chars,
                "content too long, truncating for summarization"
            );
            let mut truncated = content[..cut].to_owned();
            truncated.push_str(TRUNCATION_MARKER);
            Some(Cow::Owned(truncated))
        }
    }
}

/// Build the single-turn summarization prompt.
pub fn build_prompt(
    length: SummaryLength,
    content: &str,
    title: Option<&str>,
    url: Option<&str>,
) -> String {
    let mut prompt = format!(
        "Please summarize the following content. {}\n\n\
         Focus on:\n\
         - Key facts and main points\n\
         - Important insights or conclusions\n\
         - Actionable information if present\n\
         - Most relevant details for the reader\n\n\
         Content to summarize:\n",
        length.instruction()
    );
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        prompt.push_str(&format!("Title: {title}\n\n"));
    }
    if let Some(url) = url.filter(|u| !u.is_empty()) {
        prompt.push_str(&format!("Source: {url}\n\n"));
    }
    prompt.push_str(&format!("Content:\n{content}\n\nSummary:"));
    prompt
}
