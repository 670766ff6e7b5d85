//! Output module for crawl results
//!
//! This module handles:
//! - The record type and the sink interface the run loop flushes through
//! - Writing records as CSV
//! - Run statistics for the end-of-run summary
//! - Deriving a default output file name from the origin

mod csv_writer;
pub mod stats;
mod traits;

pub use csv_writer::{CsvSink, CSV_HEADER};
pub use stats::CrawlStatistics;
pub use traits::{OutputError, OutputResult, PageRecord, ResultSink};

use crate::url::CanonicalUrl;
use chrono::{DateTime, TimeZone};
use std::path::PathBuf;

/// Derives the default CSV file name from the crawl origin
///
/// The name is the origin's authority (`:` replaced by `_`), optionally
/// followed by a `_YYYYmmdd_HHMM` timestamp.
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use site_ledger::output::default_output_path;
/// use site_ledger::url::CanonicalUrl;
///
/// let origin = CanonicalUrl::parse_origin("https://example.com").unwrap();
/// let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
/// let path = default_output_path(&origin, true, now);
/// assert_eq!(path.to_str(), Some("example.com_20240309_1405.csv"));
/// ```
pub fn default_output_path<Tz>(origin: &CanonicalUrl, timestamped: bool, now: DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let stem = origin.authority().replace(':', "_");
    if timestamped {
        PathBuf::from(format!("{}_{}.csv", stem, now.format("%Y%m%d_%H%M")))
    } else {
        PathBuf::from(format!("{}.csv", stem))
    }
}
