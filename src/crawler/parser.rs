//! HTML parser for extracting links and metadata
//!
//! This module handles parsing a fetched page to extract:
//! - Page title
//! - Meta description (with an Open Graph fallback)
//! - Links to offer to the frontier (from <a> tags)
//!
//! Everything here is synchronous; `scraper::Html` is not `Send`, so a parsed
//! document must never be held across an `.await`.

use crate::crawler::fetcher::RenderedPage;
use scraper::{Html, Selector};
use url::Url;

/// Maximum number of characters shown for a title in log lines
const DISPLAY_LIMIT: usize = 50;

/// Title and description of a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    /// Trimmed text of the first <title>, empty if absent
    pub title: String,

    /// Trimmed meta description, empty if absent
    pub description: String,
}

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    pub metadata: PageMetadata,

    /// All links found on the page (absolute URLs, document order)
    pub links: Vec<String>,
}

/// Parses a fetched page and extracts metadata and links from one snapshot
///
/// Relative links resolve against the page's final URL, so a redirect is
/// honored the same way a browser would.
///
/// # Example
///
/// ```
/// use site_ledger::crawler::{parse_page, RenderedPage};
/// use url::Url;
///
/// let page = RenderedPage {
///     final_url: Url::parse("https://example.com/").unwrap(),
///     html: r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#.to_string(),
/// };
/// let parsed = parse_page(&page);
/// assert_eq!(parsed.metadata.title, "Test");
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_page(page: &RenderedPage) -> ParsedPage {
    let document = Html::parse_document(&page.html);

    ParsedPage {
        metadata: extract_metadata(&document),
        links: extract_links(&document, &page.final_url),
    }
}

/// Extracts title and description from a parsed document
pub fn extract_metadata(document: &Html) -> PageMetadata {
    PageMetadata {
        title: extract_title(document),
        description: extract_description(document),
    }
}

fn extract_title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// `<meta name="description">` wins when present, even with empty content;
/// `og:description` is only consulted when that element is missing.
fn extract_description(document: &Html) -> String {
    let meta_content = |query: &str| -> Option<String> {
        let selector = Selector::parse(query).ok()?;
        document.select(&selector).next().map(|element| {
            element
                .value()
                .attr("content")
                .unwrap_or_default()
                .trim()
                .to_string()
        })
    };

    meta_content(r#"meta[name="description"]"#)
        .or_else(|| meta_content(r#"meta[property="og:description"]"#))
        .unwrap_or_default()
}

/// Extracts every `<a href>` from the document, resolved to absolute URLs
///
/// Duplicates are kept; dedup and scoping belong to the frontier. Hrefs that
/// cannot be joined onto `base_url` are skipped.
pub fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| base_url.join(href.trim()).ok())
        .map(String::from)
        .collect()
}

/// Shortens text for a log line: the first 50 characters plus `...`
pub fn truncate_for_display(text: &str) -> String {
    if text.chars().count() <= DISPLAY_LIMIT {
        return text.to_string();
    }

    let mut short: String = text.chars().take(DISPLAY_LIMIT).collect();
    short.push_str("...");
    short
}
