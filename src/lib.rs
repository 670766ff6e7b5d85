//! Site-Ledger: a single-origin page inventory crawler
//!
//! This crate walks every reachable page of one origin breadth-first and
//! records each page's URL, title and meta description as a CSV row.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Crawl worker failed: {0}")]
    Worker(String),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::RunState,
        to: state::RunState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid origin: {0}")]
    InvalidOrigin(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Errors raised by a fetch backend for a single URL
///
/// None of these abort a crawl; the run loop logs and counts them and moves
/// on to the next frontier entry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Browser error for {url}: {message}")]
    Browser { url: String, message: String },
}

impl FetchError {
    /// Returns true if the failure was a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type alias for Site-Ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use crate::config::{CrawlConfig, Settings};
pub use crate::crawler::{Coordinator, CrawlReport, FetchBackend, Frontier};
pub use crate::output::{CsvSink, PageRecord, ResultSink};
pub use crate::state::{PageOutcome, RunState};
pub use crate::url::{is_crawlable_extension, is_in_scope, normalize_url, CanonicalUrl};
