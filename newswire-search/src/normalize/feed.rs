//! Feed-item extraction.
//!
//! Parses RSS/Atom XML with `feed-rs`, routing every raw timestamp through
//! [`parse_feed_date`] so feeds get the same fallback chain as other text.

use chrono::NaiveDateTime;
use feed_rs::parser;

use crate::error::SearchError;
use crate::types::SearchResult;

use super::date::parse_feed_date;
use super::text::{clean_snippet, clean_text};

/// Parse feed XML into at most `max_results` normalised results.
///
/// Up to `2 * max_results` items are considered so that items dropped for a
/// missing title or a non-absolute link do not shrink the batch. A malformed
/// document is an error; a malformed item is skipped.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if the document is not a readable feed.
pub fn parse_feed_items(
    xml: &str,
    max_results: usize,
    source: &str,
) -> Result<Vec<SearchResult>, SearchError> {
    let feed = parser::Builder::new()
        .timestamp_parser(|raw| parse_feed_date(raw).map(|naive| naive.and_utc()))
        .build()
        .parse(xml.as_bytes())
        .map_err(|e| SearchError::Parse(format!("{source} feed: {e}")))?;

    let mut results: Vec<SearchResult> = feed
        .entries
        .into_iter()
        .take(max_results.saturating_mul(2))
        .filter_map(|entry| {
            let title = clean_text(entry.title.as_ref().map(|t| t.content.as_str())?);
            if title.is_empty() {
                return None;
            }

            let link = entry.links.first()?.href.trim().to_owned();
            if url::Url::parse(&link).is_err() {
                tracing::trace!(source, link, "skipping item with non-absolute link");
                return None;
            }

            let published: Option<NaiveDateTime> = entry
                .published
                .or(entry.updated)
                .map(|dt| dt.naive_utc());

            let snippet = entry
                .summary
                .as_ref()
                .map(|s| clean_snippet(&s.content));

            Some(SearchResult::new(title, link, published, source).with_snippet(snippet))
        })
        .collect();

    results.truncate(max_results);
    tracing::debug!(source, count = results.len(), "feed items parsed");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rss(items: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>News</title><link>https://n.example/</link><description>d</description>{items}</channel></rss>"#
        )
    }

    fn item(title: &str, link: &str, date: &str) -> String {
        format!("<item><title>{title}</title><link>{link}</link><pubDate>{date}</pubDate></item>")
    }

    #[test]
    fn single_item_is_normalised() {
        let xml = rss(&item(
            "AAPL &amp; Earnings",
            "https://n.example/x",
            "Wed, 02 Oct 2024 14:30:00 GMT",
        ));
        let results = parse_feed_items(&xml, 5, "Bing News").expect("parse");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "AAPL & Earnings");
        assert_eq!(results[0].url, "https://n.example/x");
        assert_eq!(results[0].source, "Bing News");
        assert_eq!(
            results[0].published_date,
            NaiveDate::from_ymd_opt(2024, 10, 2).and_then(|d| d.and_hms_opt(14, 30, 0))
        );
    }

    #[test]
    fn description_becomes_snippet() {
        let xml = rss(
            "<item><title>T</title><link>https://n.example/a</link>\
             <description>&lt;b&gt;Apple&lt;/b&gt; beats</description></item>",
        );
        let results = parse_feed_items(&xml, 5, "Feed").expect("parse");
        assert_eq!(results[0].snippet.as_deref(), Some("Apple beats"));
    }

    #[test]
    fn unparseable_date_is_absent() {
        let xml = rss(&item("T", "https://n.example/a", "sometime soon"));
        let results = parse_feed_items(&xml, 5, "Feed").expect("parse");
        assert_eq!(results.len(), 1);
        assert!(results[0].published_date.is_none());
    }

    #[test]
    fn items_without_title_or_absolute_link_are_skipped() {
        let items = [
            "<item><link>https://n.example/no-title</link></item>".to_owned(),
            item("Relative", "not-a-url", "Wed, 02 Oct 2024 14:30:00 GMT"),
            item("Good", "https://n.example/good", "Wed, 02 Oct 2024 14:30:00 GMT"),
        ]
        .concat();
        let results = parse_feed_items(&rss(&items), 5, "Feed").expect("parse");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Good");
    }

    #[test]
    fn respects_max_results() {
        let items: String = (0..6)
            .map(|i| item(&format!("T{i}"), &format!("https://n.example/{i}"), ""))
            .collect();
        let results = parse_feed_items(&rss(&items), 2, "Feed").expect("parse");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "T0");
    }

    #[test]
    fn malformed_document_is_error() {
        let err = parse_feed_items("plain text, not a feed", 5, "Feed").unwrap_err();
        assert!(err.to_string().contains("Feed feed"));
    }

    #[test]
    fn empty_channel_is_empty() {
        let results = parse_feed_items(&rss(""), 5, "Feed").expect("parse");
        assert!(results.is_empty());
    }
}
