use super::CanonicalUrl;

/// Path suffixes treated as non-page resources
pub const SKIP_EXTENSIONS: &[&str] = &[
    // Documents
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
    // Archives
    ".zip", ".tar", ".gz", ".rar",
    // Images
    ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".ico",
    // Audio/video
    ".mp3", ".mp4", ".avi", ".mov", ".wmv",
    // Stylesheets, scripts and data files
    ".css", ".js", ".json", ".xml",
];

/// Returns true if `url` lives on the same authority as the crawl origin
///
/// Authorities are compared exactly: `blog.example.com` is out of scope for
/// an `example.com` origin, and so is `example.com:8080`. The scheme is not
/// compared, so a site that links both `http://host/a` and `https://host/a`
/// gets two canonical URLs and two output rows for the same page.
///
/// # Examples
///
/// ```
/// use site_ledger::url::{is_in_scope, normalize_url, CanonicalUrl};
///
/// let origin = CanonicalUrl::parse_origin("https://example.com").unwrap();
/// let inside = normalize_url("https://example.com/about", &origin).unwrap();
/// let outside = normalize_url("https://other.com/x", &origin).unwrap();
/// assert!(is_in_scope(&inside, &origin));
/// assert!(!is_in_scope(&outside, &origin));
/// ```
pub fn is_in_scope(url: &CanonicalUrl, origin: &CanonicalUrl) -> bool {
    url.authority() == origin.authority()
}

/// Returns false if the URL path ends in one of [`SKIP_EXTENSIONS`]
///
/// Only the path is inspected; the query string never is.
pub fn is_crawlable_extension(url: &CanonicalUrl) -> bool {
    let path = url.path().to_lowercase();
    !SKIP_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
