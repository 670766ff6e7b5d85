//! URL handling module for Site-Ledger
//!
//! This module provides URL canonicalization plus the two gates a discovered
//! link must pass before it can enter the frontier: same-origin scope and the
//! skip-extension denylist.

mod normalize;
mod scope;

use crate::{UrlError, UrlResult};
use std::fmt;

// Re-export main functions
pub use normalize::normalize_url;
pub use scope::{is_crawlable_extension, is_in_scope, SKIP_EXTENSIONS};

/// A normalized URL used as the unique dedup key of a crawl
///
/// The textual form is `scheme://authority/path[?query]` with the fragment
/// removed and no trailing slash on the path. The bare origin renders as
/// `scheme://authority`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl {
    text: String,
    authority: String,
    path: String,
}

impl CanonicalUrl {
    /// Builds the canonical form of a crawl origin
    ///
    /// The raw origin must start with `http://` or `https://` and carry a host.
    ///
    /// # Examples
    ///
    /// ```
    /// use site_ledger::url::CanonicalUrl;
    ///
    /// let origin = CanonicalUrl::parse_origin("https://Example.com/").unwrap();
    /// assert_eq!(origin.as_str(), "https://example.com");
    /// assert_eq!(origin.authority(), "example.com");
    /// ```
    pub fn parse_origin(raw: &str) -> UrlResult<Self> {
        let trimmed = raw.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(UrlError::InvalidScheme(format!(
                "origin must start with http:// or https://, got '{}'",
                trimmed
            )));
        }

        let url = ::url::Url::parse(trimmed).map_err(|e| UrlError::Parse(e.to_string()))?;
        normalize::canonicalize(&url)
    }

    /// The full canonical text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Lowercased host plus an explicit non-default port
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Path portion without a trailing slash (empty for the bare origin)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parses the canonical text back into a `url::Url`
    ///
    /// Canonical text is always produced from a parsed URL, so this only fails
    /// if that invariant is broken.
    pub fn to_url(&self) -> UrlResult<::url::Url> {
        ::url::Url::parse(&self.text).map_err(|e| UrlError::Parse(e.to_string()))
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
