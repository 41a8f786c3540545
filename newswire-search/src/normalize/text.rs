//! Title and snippet cleanup.
//!
//! Strips markup, decodes HTML entities, folds "smart" punctuation to ASCII,
//! drops any other non-ASCII code point and collapses whitespace.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

/// Maximum snippet length in characters, before the ellipsis marker.
pub const SNIPPET_MAX_CHARS: usize = 200;

/// Appended to snippets that were cut at [`SNIPPET_MAX_CHARS`].
pub const ELLIPSIS: &str = "...";

/// A complete `<...>` tag. A `<` with no closing `>` is text.
static TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^<>]+>").ok());

/// Typographic characters and their ASCII stand-ins.
const REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201c}', "\""),
    ('\u{201d}', "\""),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2026}', "..."),
    ('\u{00a0}', " "),
    ('\u{00ae}', "(R)"),
    ('\u{2122}', "(TM)"),
];

/// Clean raw title or description text.
///
/// Total and deterministic. The single cleaning pass is repeated until the
/// text stops shrinking, so decoded entities that themselves look like markup
/// (`&lt;b&gt;`) or entities (`&amp;amp;`) are also removed and
/// `clean_text(clean_text(x)) == clean_text(x)` holds for every input.
pub fn clean_text(raw: &str) -> String {
    let mut current = clean_pass(raw);
    loop {
        let next = clean_pass(&current);
        if next.len() >= current.len() {
            return next;
        }
        current = next;
    }
}

/// Clean an optional value; `None` stays `None`.
pub fn clean_opt(raw: Option<&str>) -> Option<String> {
    raw.map(clean_text)
}

/// [`clean_text`], then cut to [`SNIPPET_MAX_CHARS`] characters with an
/// [`ELLIPSIS`] appended when anything was cut.
pub fn clean_snippet(raw: &str) -> String {
    let cleaned = clean_text(raw);
    if cleaned.chars().count() <= SNIPPET_MAX_CHARS {
        return cleaned;
    }
    let mut truncated: String = cleaned.chars().take(SNIPPET_MAX_CHARS).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

fn clean_pass(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let untagged = match TAG.as_ref() {
        Some(tag) => tag.replace_all(raw, ""),
        None => raw.into(),
    };
    // Whatever `<` survives is literal; escape it so the parser only decodes entities.
    let escaped = untagged.replace('<', "&lt;");
    let fragment = Html::parse_fragment(&escaped);
    let decoded: String = fragment.root_element().text().collect();

    let mut ascii = String::with_capacity(decoded.len());
    for ch in decoded.chars() {
        if let Some((_, rep)) = REPLACEMENTS.iter().find(|(c, _)| *c == ch) {
            ascii.push_str(rep);
        } else if ch.is_ascii() {
            ascii.push(ch);
        }
    }

    ascii.split_whitespace().collect::<Vec<_>>().join(" ")
}
