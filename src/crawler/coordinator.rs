//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the run loop that ties the crawl together:
//! - Spawning the worker pool over a shared frontier
//! - Pacing requests through the global rate limiter
//! - Fetching, extracting and recording pages
//! - Handling cancellation and worker failure
//! - Flushing collected records exactly once at the end

use crate::config::CrawlConfig;
use crate::crawler::fetcher::{FetchBackend, FetchedPage};
use crate::crawler::frontier::{Frontier, Offer};
use crate::crawler::pacing::RateLimiter;
use crate::crawler::parser::{parse_page, truncate_for_display};
use crate::output::{CrawlStatistics, PageRecord, ResultSink};
use crate::state::{PageOutcome, RunState};
use crate::url::CanonicalUrl;
use crate::{FetchError, LedgerError, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::Notify;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Outcome of a finished run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Terminal state the run ended in
    pub state: RunState,

    /// Number of records handed to the sink
    pub records_saved: usize,

    pub statistics: CrawlStatistics,
}

/// State shared by all workers of one run
struct Shared {
    frontier: Mutex<Frontier>,
    /// Records keyed by visit index
    records: Mutex<Vec<(usize, PageRecord)>>,
    stats: Mutex<CrawlStatistics>,
    limiter: RateLimiter,
    idle: Notify,
    backend: FetchBackend,
    cancel: CancellationToken,
}

/// What a worker does next after looking at the frontier
enum Step {
    Visit(usize, CanonicalUrl),
    Wait,
    Stop,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: CrawlConfig,
    backend: FetchBackend,
    sink: Box<dyn ResultSink>,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration
    /// * `backend` - How pages are fetched
    /// * `sink` - Where records go when the run stops
    /// * `cancel` - Token that interrupts the run when cancelled
    pub fn new(
        config: CrawlConfig,
        backend: FetchBackend,
        sink: Box<dyn ResultSink>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            backend,
            sink,
            cancel,
        }
    }

    /// Runs the crawl to completion or interruption
    ///
    /// Records are flushed once, whichever way the run ends. A worker failure
    /// is reported as [`LedgerError::Worker`] after that flush; a sink failure
    /// as [`LedgerError::Output`].
    pub async fn run(self) -> Result<CrawlReport> {
        let Coordinator {
            config,
            backend,
            mut sink,
            cancel,
        } = self;

        let started = Instant::now();
        let workers = config.concurrency.max(1);

        info!("Crawling started: {}", config.origin);
        info!("Output file: {}", sink.target());
        debug!(
            "{} worker(s), {} backend, {:?} delay",
            workers,
            backend.name(),
            config.delay
        );

        let shared = Arc::new(Shared {
            frontier: Mutex::new(Frontier::new(config.origin.clone())),
            records: Mutex::new(Vec::new()),
            stats: Mutex::new(CrawlStatistics::new()),
            limiter: RateLimiter::new(config.delay),
            idle: Notify::new(),
            backend,
            // Worker failure stops the pool without cancelling the caller's token
            cancel: cancel.child_token(),
        });

        let mut pool = JoinSet::new();
        for id in 0..workers {
            pool.spawn(worker(id, Arc::clone(&shared)));
        }

        let mut failure: Option<String> = None;
        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                error!("Crawl worker failed: {}", e);
                failure.get_or_insert_with(|| e.to_string());
                shared.cancel.cancel();
            }
        }

        let next = if failure.is_some() || shared.cancel.is_cancelled() {
            RunState::Interrupted
        } else {
            RunState::Done
        };
        let state = RunState::Running.transition(next)?;

        match state {
            RunState::Done => info!("Crawling complete"),
            _ => info!("Crawling interrupted"),
        }

        let mut indexed = std::mem::take(&mut *lock(&shared.records));
        indexed.sort_unstable_by_key(|(index, _)| *index);
        let records: Vec<PageRecord> = indexed.into_iter().map(|(_, record)| record).collect();
        let mut statistics = lock(&shared.stats).clone();
        statistics.elapsed = started.elapsed();

        let flushed = flush_records(sink.as_mut(), &records);

        match Arc::try_unwrap(shared) {
            Ok(shared) => shared.backend.shutdown().await,
            Err(_) => warn!("Fetch backend still in use; skipping shutdown"),
        }

        info!("{}", statistics.summary_line());

        if let Some(message) = failure {
            return Err(LedgerError::Worker(message));
        }

        Ok(CrawlReport {
            state,
            records_saved: flushed?,
            statistics,
        })
    }
}

/// Writes all records to the sink once
///
/// An empty record list leaves the sink untouched.
fn flush_records(sink: &mut dyn ResultSink, records: &[PageRecord]) -> Result<usize> {
    if records.is_empty() {
        info!("No results to save");
        return Ok(0);
    }

    sink.write_records(records)?;
    info!("Saved {} pages to {}", records.len(), sink.target());
    Ok(records.len())
}

/// Worker loop: dequeue, visit, repeat until exhausted or cancelled
async fn worker(id: usize, shared: Arc<Shared>) {
    trace!("Worker {} started", id);

    loop {
        if shared.cancel.is_cancelled() {
            break;
        }

        // Registered before the frontier check so a wakeup in between is not lost
        let notified = shared.idle.notified();

        let step = {
            let mut frontier = lock(&shared.frontier);
            match frontier.next() {
                Some((index, url)) => Step::Visit(index, url),
                None if frontier.is_exhausted() => Step::Stop,
                None => Step::Wait,
            }
        };

        match step {
            Step::Stop => {
                shared.idle.notify_waiters();
                break;
            }
            Step::Wait => {
                tokio::select! {
                    _ = shared.cancel.cancelled() => break,
                    _ = notified => continue,
                }
            }
            Step::Visit(index, url) => {
                let outcome = visit(&shared, index, &url).await;

                lock(&shared.stats).record_outcome(outcome);
                lock(&shared.frontier).finish();
                shared.idle.notify_waiters();

                if outcome == PageOutcome::Abandoned {
                    break;
                }
            }
        }
    }

    trace!("Worker {} stopped", id);
}

/// Visits one dequeued URL: pace, fetch, extract, record
async fn visit(shared: &Shared, index: usize, url: &CanonicalUrl) -> PageOutcome {
    let slot = tokio::select! {
        _ = shared.cancel.cancelled() => return PageOutcome::Abandoned,
        slot = shared.limiter.acquire() => slot,
    };

    info!("Fetching: {}", url);

    let fetched = tokio::select! {
        _ = shared.cancel.cancelled() => {
            debug!("Abandoned in-flight fetch of {}", url);
            return PageOutcome::Abandoned;
        }
        result = shared.backend.fetch(url) => result,
    };

    let outcome = match fetched {
        Ok(FetchedPage::Html(page)) => {
            let parsed = parse_page(&page);
            offer_links(shared, &parsed.links);

            let metadata = parsed.metadata;
            info!("  Title: {}", truncate_for_display(&metadata.title));

            let record = PageRecord {
                url: url.clone(),
                title: metadata.title,
                description: metadata.description,
            };
            lock(&shared.records).push((index, record));
            PageOutcome::Recorded
        }
        Ok(FetchedPage::NotHtml { content_type }) => {
            debug!("Skipping non-HTML page {} ({})", url, content_type);
            PageOutcome::NotHtml
        }
        Err(e) => {
            warn!("Error: {}", e);
            classify_failure(&e)
        }
    };

    shared.limiter.complete(slot, outcome.is_paced());
    outcome
}

/// Offers extracted links to the frontier and wakes idle workers
fn offer_links(shared: &Shared, links: &[String]) {
    let mut queued = 0u64;

    {
        let mut frontier = lock(&shared.frontier);
        for link in links {
            match frontier.offer(link) {
                Offer::Queued(url) => {
                    trace!("Queued {}", url);
                    queued += 1;
                }
                dropped => trace!("Dropped {} ({:?})", link, dropped),
            }
        }
    }

    {
        let mut stats = lock(&shared.stats);
        stats.links_discovered += links.len() as u64;
        stats.links_queued += queued;
    }

    if queued > 0 {
        shared.idle.notify_waiters();
    }
}

fn classify_failure(error: &FetchError) -> PageOutcome {
    match error {
        FetchError::Timeout { .. } => PageOutcome::Timeout,
        FetchError::Transport { .. } | FetchError::Status { .. } => PageOutcome::TransportError,
        FetchError::Browser { .. } => PageOutcome::Failed,
    }
}

/// Locks a mutex, recovering the data if another worker panicked holding it
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
