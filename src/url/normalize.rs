use super::CanonicalUrl;
use crate::{UrlError, UrlResult};
use url::Url;

/// Normalizes a raw absolute URL into its canonical crawl key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only `http` and `https`
/// 3. Take the lowercased host plus any explicit non-default port
/// 4. Strip trailing slashes from the path (root `/` becomes empty)
/// 5. Keep a non-empty query string verbatim
/// 6. Drop the fragment
///
/// Empty input falls back to `fallback`, which is the crawl origin. Any other
/// failure is returned as an error and the caller discards the link.
///
/// # Examples
///
/// ```
/// use site_ledger::url::{normalize_url, CanonicalUrl};
///
/// let origin = CanonicalUrl::parse_origin("https://example.com").unwrap();
/// let url = normalize_url("https://example.com/page/#top", &origin).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn normalize_url(raw: &str, fallback: &CanonicalUrl) -> UrlResult<CanonicalUrl> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(fallback.clone());
    }

    let url = Url::parse(raw).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(&url)
}

/// Rebuilds a parsed URL as `scheme://authority/path[?query]`
pub(crate) fn canonicalize(url: &Url) -> UrlResult<CanonicalUrl> {
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            scheme
        )));
    }

    let host = match url.host_str() {
        Some(h) if !h.is_empty() => h.to_lowercase(),
        _ => return Err(UrlError::MissingHost),
    };

    let authority = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    };

    let path = url.path().trim_end_matches('/').to_string();

    let mut text = format!("{}://{}{}", scheme, authority, path);
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        text.push('?');
        text.push_str(query);
    }

    Ok(CanonicalUrl {
        text,
        authority,
        path,
    })
}
