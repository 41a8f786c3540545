//! URL canonicalisation for cross-source deduplication.
//!
//! Two sources often link the same story with different decorations: a
//! tracking query, a fragment, a trailing slash, a `www.` prefix, an explicit
//! default port.
//! [`canonical_url`] strips those so the links compare equal.

use url::Url;

/// Query parameters that only identify the referrer, never the page.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "ocid",
    "oc",
    "cmpid",
    "smid",
    "ref",
];

/// Canonical comparison key for a result URL.
///
/// Lowercases scheme and host and drops a leading `www.`, the default port
/// and the fragment. Known tracking parameters are removed and the rest
/// sorted; one trailing slash is trimmed from a non-root path. Unparseable
/// input is returned as-is.
///
/// ```
/// use newswire_search::orchestrator::url_normalize::canonical_url;
///
/// assert_eq!(
///     canonical_url("https://News.example.com:443/story/?utm_source=rss&id=7#top"),
///     canonical_url("https://news.example.com/story?id=7"),
/// );
/// ```
pub fn canonical_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw.trim()) else {
        return raw.to_owned();
    };

    url.set_fragment(None);
    // Url::parse already omits a port equal to the scheme default.

    let bare_host = url
        .host_str()
        .and_then(|h| h.strip_prefix("www."))
        .map(str::to_owned);
    if let Some(host) = bare_host {
        if url.set_host(Some(&host)).is_err() {
            return raw.to_owned();
        }
    }

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();
    if params.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&params);
    }

    let trimmed = url
        .path()
        .strip_suffix('/')
        .filter(|p| !p.is_empty())
        .map(str::to_owned);
    if let Some(path) = trimmed {
        url.set_path(&path);
    }

    url.to_string()
}

fn is_tracking(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    TRACKING_PARAMS.contains(&key.as_str())
}
