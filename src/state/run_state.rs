/// Run-level state machine
///
/// A run starts `Running` and ends in exactly one of the two terminal states.
/// Entering a terminal state is what triggers the single result flush.
use crate::LedgerError;
use std::fmt;

/// Current state of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Workers are dequeuing and fetching
    Running,

    /// A cancellation request (signal, explicit stop, or worker failure) ended the run
    Interrupted,

    /// The frontier was exhausted
    Done,
}

impl RunState {
    /// Validates a transition and returns the new state
    ///
    /// Only `Running -> Running`, `Running -> Interrupted` and
    /// `Running -> Done` are legal.
    pub fn transition(self, to: RunState) -> Result<RunState, LedgerError> {
        match (self, to) {
            (Self::Running, _) => Ok(to),
            (from, to) => Err(LedgerError::InvalidTransition { from, to }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Interrupted => "interrupted",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
