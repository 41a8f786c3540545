//! Readable-text extraction from fetched HTML pages.
//!
//! Walks the parsed document, skipping boilerplate subtrees (scripts,
//! styles, navigation, chrome), picks the main content area and returns its
//! text with whitespace collapsed. Used by the enrichment layer to feed
//! article text to a summarizer.

use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, SearchError};
use crate::types::PageContent;

/// Default maximum characters to return from extracted content.
pub const DEFAULT_MAX_CHARS: usize = 100_000;

/// Elements whose whole subtree is never content.
const BOILERPLATE: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe",
];

/// Content containers in priority order.
const CONTENT_SELECTORS: &[&str] = &["article", "main", "[role=\"main\"]", "body"];

/// Extract readable text content from raw HTML.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if no extractable content is found.
pub fn extract_content(html: &str, url: &str) -> Result<PageContent> {
    extract_content_with_limit(html, url, DEFAULT_MAX_CHARS)
}

/// Same as [`extract_content`], keeping at most `max_chars` characters.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if no extractable content is found.
pub fn extract_content_with_limit(html: &str, url: &str, max_chars: usize) -> Result<PageContent> {
    let document = Html::parse_document(html);

    let content = main_text(&document);
    if content.is_empty() {
        return Err(SearchError::Parse(format!("no extractable content at {url}")));
    }

    let content: String = content.chars().take(max_chars).collect();
    let content_length = content.chars().count();
    tracing::trace!(url, content_length, "page content extracted");

    Ok(PageContent {
        url: url.to_owned(),
        title: title(&document),
        content,
        content_length,
    })
}

fn title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

/// Text of the first non-empty content container.
fn main_text(document: &Html) -> String {
    for selector in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        for element in document.select(&selector) {
            let mut raw = String::new();
            collect_text(element, &mut raw);
            let text = collapse_whitespace(&raw);
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child) = ElementRef::wrap(child) {
            if !BOILERPLATE.contains(&child.value().name()) {
                collect_text(child, out);
            }
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
