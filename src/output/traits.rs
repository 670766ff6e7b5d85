//! Result sink trait and record type
//!
//! This module defines the interface the run loop flushes its collected
//! records through, and the record itself.

use crate::url::CanonicalUrl;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One row of output: a successfully fetched HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// Canonical URL of the page
    pub url: CanonicalUrl,

    /// Trimmed `<title>` text, empty if absent
    pub title: String,

    /// Trimmed meta description, empty if absent
    pub description: String,
}

/// Trait for result sinks
///
/// A sink receives the full record list exactly once, when the run stops.
pub trait ResultSink: Send {
    /// Writes all records, in visit order
    ///
    /// # Arguments
    ///
    /// * `records` - The records collected during the run; never empty
    fn write_records(&mut self, records: &[PageRecord]) -> OutputResult<()>;

    /// Human-readable description of where records go
    fn target(&self) -> String;
}
