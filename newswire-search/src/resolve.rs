//! Redirect resolution for aggregator-wrapped article links.
//!
//! News aggregators such as Google News publish links of the form
//! `https://news.google.com/rss/articles/<id>?oc=5`. [`RedirectResolver`]
//! turns those into the publisher URL:
//!
//! 1. Legacy ids are base64url-encoded protobuf-ish blobs that embed the
//!    destination directly after a `08 13 22` prefix and a length varint.
//!    These decode offline.
//! 2. Current ids carry an opaque token. The article page exposes a
//!    signature (`data-n-a-sg`) and timestamp (`data-n-a-ts`); a
//!    `garturlreq` batch request exchanges them for the destination.
//!
//! Resolution never fails: any problem yields the wrapped URL unchanged.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use scraper::{Html, Selector};
use url::Url;

use crate::error::SearchError;
use crate::http::HttpPool;

/// Leading bytes of a legacy article id.
const LEGACY_PREFIX: &[u8] = &[0x08, 0x13, 0x22];

/// Trailing bytes some legacy ids carry after the URL.
const LEGACY_SUFFIX: &[u8] = &[0xd2, 0x01, 0x00];

/// Marker for ids that must be decoded online.
const ONLINE_MARKER: &str = "AU_yqL";

/// Batch endpoint path, relative to the wrapper's origin.
const BATCH_PATH: &str = "/_/DotsSplashUi/data/batchexecute";

/// Resolves redirect-wrapped URLs issued by one aggregator host.
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    host: String,
}

impl RedirectResolver {
    /// Resolver for links on `host` (for example `news.google.com`).
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into().to_lowercase(),
        }
    }

    /// The wrapper host this resolver recognises.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether `url` is a wrapper this resolver knows how to unwrap.
    pub fn is_wrapped(&self, url: &str) -> bool {
        self.article_id(url).is_some()
    }

    /// Resolve `url` to its destination.
    ///
    /// URLs on other hosts are returned unchanged. On any decoding failure
    /// the original URL is returned.
    pub async fn resolve(&self, http: &HttpPool, url: &str) -> String {
        let Some((origin, id)) = self.article_id(url) else {
            return url.to_owned();
        };

        if let Some(decoded) = decode_legacy_id(&id) {
            return decoded;
        }

        match self.resolve_online(http, &origin, &id).await {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::debug!(error = %err, "redirect decoding failed; keeping wrapped URL");
                url.to_owned()
            }
        }
    }

    /// Extract `(origin, article id)` from a wrapped URL.
    fn article_id(&self, url: &str) -> Option<(String, String)> {
        let parsed = Url::parse(url).ok()?;
        if parsed.host_str()?.to_lowercase() != self.host {
            return None;
        }
        let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [.., kind, id] if matches!(*kind, "articles" | "read") => Some((
                parsed.origin().ascii_serialization(),
                (*id).to_owned(),
            )),
            _ => None,
        }
    }

    async fn resolve_online(
        &self,
        http: &HttpPool,
        origin: &str,
        id: &str,
    ) -> Result<String, SearchError> {
        let page = http.get_text(&format!("{origin}/articles/{id}")).await?;
        let (signature, timestamp) = decoding_params(&page)?;

        let request = batch_request(id, &signature, &timestamp);
        let body = http
            .post_form(&format!("{origin}{BATCH_PATH}"), &[("f.req", &request)])
            .await?;
        parse_batch_response(&body)
    }
}

/// Decode a legacy id that embeds the destination URL.
///
/// Returns `None` for ids that need online decoding or are not valid base64.
pub fn decode_legacy_id(id: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(id.trim_end_matches('=')).ok()?;
    let mut rest = bytes.strip_prefix(LEGACY_PREFIX)?;
    if let Some(stripped) = rest.strip_suffix(LEGACY_SUFFIX) {
        rest = stripped;
    }

    // One- or two-byte length varint.
    let (&first, tail) = rest.split_first()?;
    let (len, payload) = if first & 0x80 == 0 {
        (usize::from(first), tail)
    } else {
        let (&second, tail) = tail.split_first()?;
        (usize::from(first & 0x7f) | (usize::from(second) << 7), tail)
    };

    let decoded = std::str::from_utf8(payload.get(..len)?).ok()?;
    if decoded.starts_with(ONLINE_MARKER) || !decoded.starts_with("http") {
        return None;
    }
    Some(decoded.to_owned())
}

/// Read the signature and timestamp attributes from an article page.
fn decoding_params(html: &str) -> Result<(String, String), SearchError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("c-wiz > div[jscontroller]")
        .map_err(|e| SearchError::Parse(format!("invalid selector: {e:?}")))?;
    let div = document
        .select(&selector)
        .next()
        .ok_or_else(|| SearchError::Parse("article page has no decoding params".into()))?;

    let attr = |name: &str| {
        div.value()
            .attr(name)
            .map(str::to_owned)
            .ok_or_else(|| SearchError::Parse(format!("missing {name}")))
    };
    Ok((attr("data-n-a-sg")?, attr("data-n-a-ts")?))
}

/// Build the `f.req` payload for one `garturlreq` call.
fn batch_request(id: &str, signature: &str, timestamp: &str) -> String {
    let inner = format!(
        r#"["garturlreq",[["X","X",["X","X"],null,null,1,1,"US:en",null,1,null,null,null,null,null,0,1],"X","X",1,[1,1,1],1,1,null,0,0,null,0],"{id}",{timestamp},"{signature}"]"#
    );
    serde_json::json!([[["Fbv4je", inner, null, "generic"]]]).to_string()
}

/// Extract the destination URL from a batch response.
///
/// The body is an anti-XSSI prefix, a blank line, then a JSON array whose
/// first entry holds a JSON-encoded `["garturlres", "<url>", ...]` string.
fn parse_batch_response(body: &str) -> Result<String, SearchError> {
    let payload = body
        .split("\n\n")
        .nth(1)
        .ok_or_else(|| SearchError::Parse("batch response has no payload".into()))?;
    let outer: serde_json::Value = serde_json::from_str(payload.trim())
        .map_err(|e| SearchError::Parse(format!("batch response: {e}")))?;
    let inner = outer
        .get(0)
        .and_then(|entry| entry.get(2))
        .and_then(|v| v.as_str())
        .ok_or_else(|| SearchError::Parse("batch response missing result".into()))?;
    let inner: serde_json::Value = serde_json::from_str(inner)
        .map_err(|e| SearchError::Parse(format!("batch result: {e}")))?;

    inner
        .get(1)
        .and_then(|v| v.as_str())
        .filter(|u| Url::parse(u).is_ok())
        .map(str::to_owned)
        .ok_or_else(|| SearchError::Parse("batch result has no URL".into()))
}
