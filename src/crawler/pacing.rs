//! Request pacing
//!
//! A global fixed-interval gate shared by all workers. Every fetch reserves a
//! start slot at least `interval` after the previous reservation; finishing a
//! paced page pushes the next slot to at least `now + interval`. With one
//! worker this is exactly "wait `interval` after each visited page".

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// A reserved start slot, handed back to [`RateLimiter::complete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    start: Instant,
    reserved_until: Instant,
}

/// Fixed-interval rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next: Mutex<Instant>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Mutex::new(Instant::now()),
        }
    }

    /// Reserves the next start slot without waiting for it
    pub fn reserve(&self) -> Slot {
        let mut next = self.next.lock().unwrap_or_else(|e| e.into_inner());
        let start = (*next).max(Instant::now());
        let reserved_until = start + self.interval;
        *next = reserved_until;

        Slot {
            start,
            reserved_until,
        }
    }

    /// Reserves a slot and sleeps until it opens
    ///
    /// Cancel-safe: dropping the future only wastes the reservation.
    pub async fn acquire(&self) -> Slot {
        let slot = self.reserve();
        sleep_until(slot.start).await;
        slot
    }

    /// Reports that the page fetched in `slot` has been handled
    ///
    /// A paced page delays the next slot to at least `now + interval`. An
    /// unpaced page (skipped content type) gives its reservation back, but
    /// only if no other worker has reserved after it.
    pub fn complete(&self, slot: Slot, paced: bool) {
        let mut next = self.next.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        if paced {
            *next = (*next).max(now + self.interval);
        } else if *next == slot.reserved_until {
            *next = now;
        }
    }
}
