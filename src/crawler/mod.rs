//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The breadth-first frontier with dedup and domain scoping
//! - Plain HTTP and browser-rendered fetching
//! - HTML parsing for metadata and link extraction
//! - Request pacing
//! - Overall crawl coordination

mod browser;
mod coordinator;
mod fetcher;
mod frontier;
mod pacing;
mod parser;

pub use browser::{is_placeholder_title, RenderedFetcher};
pub use coordinator::{Coordinator, CrawlReport};
pub use fetcher::{build_http_client, is_html, FetchBackend, FetchedPage, PlainFetcher, RenderedPage};
pub use frontier::{Frontier, Offer};
pub use pacing::{RateLimiter, Slot};
pub use parser::{
    extract_links, extract_metadata, parse_page, truncate_for_display, PageMetadata, ParsedPage,
};
