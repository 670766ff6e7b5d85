use crate::url::CanonicalUrl;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Browser-like user agent sent by the plain HTTP client
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Settings file structure for Site-Ledger
///
/// Every section and key is optional; missing values take the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub crawler: CrawlerSettings,
    pub fetch: FetchSettings,
    pub output: OutputSettings,
}

/// Crawl loop behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerSettings {
    /// Delay after each visited page, in seconds (mode default when unset)
    #[serde(rename = "delay-seconds")]
    pub delay_seconds: Option<f64>,

    /// Number of workers sharing the frontier
    pub concurrency: u32,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            delay_seconds: None,
            concurrency: 1,
        }
    }
}

/// Which fetch backend a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Plain HTTP GET plus HTML parsing
    #[default]
    Plain,

    /// Chromium-rendered DOM for script-driven sites
    Rendered,
}

impl FetchMode {
    /// Default per-request delay for this mode
    pub fn default_delay(&self) -> Duration {
        match self {
            Self::Plain => Duration::from_millis(500),
            Self::Rendered => Duration::from_secs(1),
        }
    }
}

/// Fetch backend configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub mode: FetchMode,

    /// Per-fetch network timeout in seconds
    #[serde(rename = "timeout-seconds")]
    pub timeout_seconds: u64,

    /// User-Agent header for the plain client
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Run the browser without a window (rendered mode only)
    pub headless: bool,

    /// Pause after navigation before the DOM is read, in milliseconds
    #[serde(rename = "settle-millis")]
    pub settle_millis: u64,

    /// Upper bound on waiting for the page to go idle, in seconds
    #[serde(rename = "idle-timeout-seconds")]
    pub idle_timeout_seconds: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            mode: FetchMode::Plain,
            timeout_seconds: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headless: true,
            settle_millis: 500,
            idle_timeout_seconds: 10,
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_millis)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Append `_YYYYmmdd_HHMM` to the derived default file name
    pub timestamped: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self { timestamped: true }
    }
}

/// Validated configuration of a single crawl run
///
/// Fixed for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Canonical crawl origin; also the scope boundary
    pub origin: CanonicalUrl,

    /// Pause after each visited page
    pub delay: Duration,

    /// CSV output target
    pub output: PathBuf,

    /// Worker count, at least 1
    pub concurrency: usize,

    pub fetch: FetchSettings,
}
