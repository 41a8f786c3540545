//! Best-effort timestamp parsing as an ordered chain of named strategies.
//!
//! Every strategy is total: it returns `None` on failure and never panics.
//! All timestamps are timezone-naive and UTC-assumed.
//!
//! Feed dates ([`parse_feed_date`]) try, in order:
//! 1. [`DateStrategy::FeedPattern`]: `"Wed, 02 Oct 2024 14:30:00"` after
//!    dropping a trailing `GMT` / `+0000` zone token
//! 2. [`DateStrategy::Rfc2822`]: RFC 2822 with any numeric offset,
//!    shifted to UTC
//! 3. [`parse_generic_date`]: the generic substring heuristics
//!
//! Generic dates ([`parse_generic_date`]) try, in order:
//! 1. [`DateStrategy::IsoDate`]: `YYYY-MM-DD`
//! 2. [`DateStrategy::UsDate`]: `MM/DD/YYYY`
//! 3. [`DateStrategy::LongDate`]: `Month DD, YYYY`

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

/// The fixed feed pattern, applied after the zone token is removed.
const FEED_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// Zone tokens stripped before [`FEED_FORMAT`] is applied.
const FEED_ZONES: &[&str] = &[" GMT", " +0000", " UTC", " Z"];

static ISO_DATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").ok());
static US_DATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\d{1,2}/\d{1,2}/\d{4}").ok());
static LONG_DATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+ \d{1,2}, \d{4}").ok());

/// One named parsing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStrategy {
    /// Fixed RSS pattern with the zone token stripped.
    FeedPattern,
    /// RFC 2822 with an explicit offset, converted to UTC.
    Rfc2822,
    /// First `YYYY-MM-DD` substring.
    IsoDate,
    /// First `MM/DD/YYYY` substring.
    UsDate,
    /// First `Month DD, YYYY` substring (full or abbreviated month).
    LongDate,
}

/// Precedence for feed timestamps.
pub const FEED_CHAIN: &[DateStrategy] = &[
    DateStrategy::FeedPattern,
    DateStrategy::Rfc2822,
    DateStrategy::IsoDate,
    DateStrategy::UsDate,
    DateStrategy::LongDate,
];

/// Precedence for free-form text.
pub const GENERIC_CHAIN: &[DateStrategy] = &[
    DateStrategy::IsoDate,
    DateStrategy::UsDate,
    DateStrategy::LongDate,
];

impl DateStrategy {
    /// Apply this strategy alone.
    pub fn parse(self, raw: &str) -> Option<NaiveDateTime> {
        match self {
            Self::FeedPattern => {
                let mut text = raw.trim();
                for zone in FEED_ZONES {
                    if let Some(stripped) = text.strip_suffix(zone) {
                        text = stripped;
                        break;
                    }
                }
                NaiveDateTime::parse_from_str(text.trim(), FEED_FORMAT).ok()
            }
            Self::Rfc2822 => DateTime::parse_from_rfc2822(raw.trim())
                .ok()
                .map(|dt| dt.naive_utc()),
            Self::IsoDate => first_match(&ISO_DATE, raw, "%Y-%m-%d"),
            Self::UsDate => first_match(&US_DATE, raw, "%m/%d/%Y"),
            Self::LongDate => first_match(&LONG_DATE, raw, "%B %d, %Y"),
        }
    }
}

/// Run `chain` in order and return the first success.
pub fn parse_with(chain: &[DateStrategy], raw: &str) -> Option<NaiveDateTime> {
    if raw.trim().is_empty() {
        return None;
    }
    chain.iter().find_map(|strategy| strategy.parse(raw))
}

/// Parse a feed `pubDate`, falling back to the generic heuristics.
pub fn parse_feed_date(raw: &str) -> Option<NaiveDateTime> {
    parse_with(FEED_CHAIN, raw)
}

/// Scan free-form text for the first recognisable calendar date.
pub fn parse_generic_date(raw: &str) -> Option<NaiveDateTime> {
    parse_with(GENERIC_CHAIN, raw)
}

/// Parse an ISO-8601 timestamp such as `2024-01-01T00:00:00Z`.
///
/// Offsets are converted to UTC; a bare `YYYY-MM-DDTHH:MM:SS` is taken as UTC.
pub fn parse_iso_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

fn first_match(pattern: &Option<Regex>, raw: &str, format: &str) -> Option<NaiveDateTime> {
    let found = pattern.as_ref()?.find(raw)?;
    NaiveDate::parse_from_str(found.as_str(), format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(h, mi, s))
            .expect("valid date")
    }

    #[test]
    fn feed_pattern_with_gmt() {
        assert_eq!(
            parse_feed_date("Wed, 02 Oct 2024 14:30:00 GMT"),
            Some(ymd_hms(2024, 10, 2, 14, 30, 0))
        );
    }

    #[test]
    fn feed_pattern_with_zero_offset() {
        assert_eq!(
            parse_feed_date("Wed, 02 Oct 2024 14:30:00 +0000"),
            Some(ymd_hms(2024, 10, 2, 14, 30, 0))
        );
    }

    #[test]
    fn feed_pattern_without_zone() {
        assert_eq!(
            DateStrategy::FeedPattern.parse("Wed, 02 Oct 2024 14:30:00"),
            Some(ymd_hms(2024, 10, 2, 14, 30, 0))
        );
    }

    #[test]
    fn non_utc_offset_is_shifted_to_utc() {
        assert_eq!(
            parse_feed_date("Wed, 02 Oct 2024 09:30:00 -0500"),
            Some(ymd_hms(2024, 10, 2, 14, 30, 0))
        );
    }

    #[test]
    fn feed_falls_back_to_generic() {
        assert_eq!(
            parse_feed_date("published 2024-03-05 by staff"),
            Some(ymd_hms(2024, 3, 5, 0, 0, 0))
        );
    }

    #[test]
    fn generic_iso_date() {
        assert_eq!(
            parse_generic_date("Updated: 2023-12-31 noon"),
            Some(ymd_hms(2023, 12, 31, 0, 0, 0))
        );
    }

    #[test]
    fn generic_us_date() {
        assert_eq!(
            parse_generic_date("on 7/4/2024"),
            Some(ymd_hms(2024, 7, 4, 0, 0, 0))
        );
    }

    #[test]
    fn generic_long_date() {
        assert_eq!(
            parse_generic_date("Posted October 2, 2024 at dawn"),
            Some(ymd_hms(2024, 10, 2, 0, 0, 0))
        );
        assert_eq!(
            parse_generic_date("Oct 2, 2024"),
            Some(ymd_hms(2024, 10, 2, 0, 0, 0))
        );
    }

    #[test]
    fn iso_takes_precedence_over_later_patterns() {
        assert_eq!(
            parse_generic_date("October 2, 2024 (2021-01-01)"),
            Some(ymd_hms(2021, 1, 1, 0, 0, 0))
        );
    }

    #[test]
    fn matched_but_invalid_falls_through_to_next_strategy() {
        // 2024-13-45 matches the ISO shape but is not a date.
        assert_eq!(
            parse_generic_date("2024-13-45 or 1/2/2020"),
            Some(ymd_hms(2020, 1, 2, 0, 0, 0))
        );
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_feed_date("not a date"), None);
        assert_eq!(parse_generic_date(""), None);
        assert_eq!(parse_generic_date("Foo 99, 2024"), None);
    }

    #[test]
    fn iso_timestamp_with_z_suffix() {
        assert_eq!(
            parse_iso_timestamp("2024-01-01T00:00:00Z"),
            Some(ymd_hms(2024, 1, 1, 0, 0, 0))
        );
    }

    #[test]
    fn iso_timestamp_with_offset_and_naive() {
        assert_eq!(
            parse_iso_timestamp("2024-01-01T02:00:00+02:00"),
            Some(ymd_hms(2024, 1, 1, 0, 0, 0))
        );
        assert_eq!(
            parse_iso_timestamp("2024-01-01T05:06:07"),
            Some(ymd_hms(2024, 1, 1, 5, 6, 7))
        );
        assert_eq!(parse_iso_timestamp("yesterday"), None);
    }
}
