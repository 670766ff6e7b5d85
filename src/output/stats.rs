//! Run statistics
//!
//! Counters the run loop updates as pages finish, used for the end-of-run
//! summary line.

use crate::state::PageOutcome;
use std::collections::HashMap;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Count of visited pages by outcome
    pub pages_by_outcome: HashMap<PageOutcome, u64>,

    /// Links extracted from pages (before dedup and scoping)
    pub links_discovered: u64,

    /// Links that entered the frontier queue
    pub links_queued: u64,

    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one visited page
    pub fn record_outcome(&mut self, outcome: PageOutcome) {
        *self.pages_by_outcome.entry(outcome).or_insert(0) += 1;
    }

    /// Returns the count for a single outcome
    pub fn count(&self, outcome: PageOutcome) -> u64 {
        self.pages_by_outcome.get(&outcome).copied().unwrap_or(0)
    }

    /// Total number of dequeued pages
    pub fn pages_visited(&self) -> u64 {
        self.pages_by_outcome.values().sum()
    }

    /// Number of pages that produced a record
    pub fn pages_recorded(&self) -> u64 {
        self.count(PageOutcome::Recorded)
    }

    /// Number of pages that ended in an error outcome
    pub fn total_errors(&self) -> u64 {
        self.pages_by_outcome
            .iter()
            .filter(|(outcome, _)| outcome.is_error())
            .map(|(_, count)| count)
            .sum()
    }

    /// One-line summary for the end of a run
    pub fn summary_line(&self) -> String {
        format!(
            "{} pages visited, {} recorded, {} skipped (not HTML), {} errors ({} timeouts), {} links queued in {:.1}s",
            self.pages_visited(),
            self.pages_recorded(),
            self.count(PageOutcome::NotHtml),
            self.total_errors(),
            self.count(PageOutcome::Timeout),
            self.links_queued,
            self.elapsed.as_secs_f64()
        )
    }
}
