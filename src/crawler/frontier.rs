//! Crawl frontier
//!
//! This module owns the breadth-first queue and the visited set, and with
//! them the dedup and domain-scoping policy:
//! - FIFO queue in discovery order, no reordering
//! - A URL is queued at most once and never re-queued after a visit
//! - Only in-scope, crawlable-extension URLs are accepted
//!
//! Mutating methods take `&mut self`, so wrapping the frontier in a single
//! mutex makes "test membership and insert" atomic for concurrent workers.

use crate::url::{is_crawlable_extension, is_in_scope, normalize_url, CanonicalUrl};
use std::collections::{HashSet, VecDeque};

/// What [`Frontier::offer`] did with a raw link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Offer {
    /// Appended to the queue
    Queued(CanonicalUrl),

    /// Could not be parsed or is not http(s)
    Invalid,

    /// Different authority than the origin
    OutOfScope,

    /// Path ends in a skip-extension
    NonPage,

    /// Already queued or visited
    Duplicate,
}

impl Offer {
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued(_))
    }
}

/// Breadth-first frontier for a single origin
#[derive(Debug)]
pub struct Frontier {
    /// Canonical crawl origin
    origin: CanonicalUrl,

    /// URLs waiting to be visited, in discovery order
    queue: VecDeque<CanonicalUrl>,

    /// URLs already dequeued
    visited: HashSet<CanonicalUrl>,

    /// Membership of `queue` and `visited`
    enqueued: HashSet<CanonicalUrl>,

    /// Dequeued URLs whose processing has not finished
    in_flight: usize,

    /// Number of URLs handed out so far; the next visit index
    dequeued: usize,
}

impl Frontier {
    /// Creates a frontier seeded with the origin
    pub fn new(origin: CanonicalUrl) -> Self {
        let mut queue = VecDeque::new();
        let mut enqueued = HashSet::new();

        queue.push_back(origin.clone());
        enqueued.insert(origin.clone());

        Self {
            origin,
            queue,
            visited: HashSet::new(),
            enqueued,
            in_flight: 0,
            dequeued: 0,
        }
    }

    pub fn origin(&self) -> &CanonicalUrl {
        &self.origin
    }

    /// Normalizes a raw URL against this frontier's origin
    ///
    /// Returns `None` for anything that cannot be canonicalized.
    pub fn normalize(&self, raw: &str) -> Option<CanonicalUrl> {
        normalize_url(raw, &self.origin).ok()
    }

    /// Returns true if the URL shares the origin's authority
    pub fn is_in_scope(&self, url: &CanonicalUrl) -> bool {
        is_in_scope(url, &self.origin)
    }

    /// Offers a raw link for crawling
    ///
    /// The link is normalized and appended to the queue if it is in scope,
    /// has a crawlable extension, and has not been queued or visited before.
    /// Rejections are silent; the return value says why.
    pub fn offer(&mut self, raw: &str) -> Offer {
        let url = match self.normalize(raw) {
            Some(url) => url,
            None => return Offer::Invalid,
        };

        if !self.is_in_scope(&url) {
            return Offer::OutOfScope;
        }

        if !is_crawlable_extension(&url) {
            return Offer::NonPage;
        }

        if !self.enqueued.insert(url.clone()) {
            return Offer::Duplicate;
        }

        self.queue.push_back(url.clone());
        Offer::Queued(url)
    }

    /// Pops the next URL and marks it visited
    ///
    /// Returns the URL with its visit index: 0 for the origin, then one more
    /// per dequeue. Records sorted by this index are in visit order no matter
    /// which worker finishes first.
    ///
    /// The URL moves into the visited set before it is fetched, so it cannot
    /// be queued again while its fetch is outstanding. Every `Some` must be
    /// matched by a later call to [`Frontier::finish`].
    pub fn next(&mut self) -> Option<(usize, CanonicalUrl)> {
        let url = self.queue.pop_front()?;
        let index = self.dequeued;
        self.dequeued += 1;
        self.visited.insert(url.clone());
        self.in_flight += 1;
        Some((index, url))
    }

    /// Marks one dequeued URL as fully processed
    pub fn finish(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// True when nothing is queued and nothing is being processed
    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty() && self.in_flight == 0
    }

    pub fn is_visited(&self, url: &CanonicalUrl) -> bool {
        self.visited.contains(url)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}
