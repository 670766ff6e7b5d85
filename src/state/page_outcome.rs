/// Outcome definitions for visited pages
///
/// Every URL the run loop dequeues ends in exactly one of these outcomes.
use std::fmt;

/// How the visit of a single dequeued URL ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageOutcome {
    // ===== Success =====
    /// Page was fetched, extracted and recorded
    Recorded,

    // ===== Skip =====
    /// Response Content-Type was not HTML; nothing extracted
    NotHtml,

    /// Cancellation arrived while the page was waiting or in flight
    Abandoned,

    // ===== Recoverable errors =====
    /// The fetch exceeded its timeout
    Timeout,

    /// Connection, TLS or non-2xx status failure
    TransportError,

    /// Any other failure while fetching or processing the page
    Failed,
}

impl PageOutcome {
    /// Returns true if this represents an error outcome
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Timeout | Self::TransportError | Self::Failed)
    }

    /// Returns true if the request delay applies after this outcome
    ///
    /// Every visited page is paced except a wrong-content-type skip. An
    /// abandoned page ends the run, so there is nothing left to pace.
    pub fn is_paced(&self) -> bool {
        !matches!(self, Self::NotHtml | Self::Abandoned)
    }

    /// Short label used in logs and the end-of-run summary
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recorded => "recorded",
            Self::NotHtml => "not_html",
            Self::Abandoned => "abandoned",
            Self::Timeout => "timeout",
            Self::TransportError => "transport_error",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
