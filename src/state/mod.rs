//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `RunState`: the run-level state machine (running, interrupted, done)
//! - `PageOutcome`: how the visit of each dequeued URL ended

mod page_outcome;
mod run_state;

// Re-export main types
pub use page_outcome::PageOutcome;
pub use run_state::RunState;
