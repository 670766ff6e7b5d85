//! Page fetching
//!
//! This module defines the fetch capability the run loop drives:
//! - Building the HTTP client with the configured user agent and timeout
//! - GET requests with redirect following
//! - Content-Type gating for HTML
//! - Error classification into [`FetchError`]
//!
//! The browser-rendered variant lives in [`crate::crawler::browser`].

use crate::config::{FetchMode, FetchSettings};
use crate::crawler::browser::RenderedFetcher;
use crate::url::CanonicalUrl;
use crate::{FetchError, LedgerError};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Connect timeout cap for the plain client
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A page ready for extraction
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL the content was served from, after redirects
    pub final_url: Url,

    /// Full HTML document
    pub html: String,
}

/// Result of a successful fetch
#[derive(Debug, Clone)]
pub enum FetchedPage {
    /// HTML content to extract from
    Html(RenderedPage),

    /// The response was not HTML; nothing is extracted
    NotHtml {
        /// The Content-Type received
        content_type: String,
    },
}

/// Fetch backend selected at startup
pub enum FetchBackend {
    /// Direct HTTP GET of the page
    Plain(PlainFetcher),

    /// Headless browser rendering, for script-built pages
    Rendered(RenderedFetcher),

    /// Canned pages for run-loop tests
    #[cfg(test)]
    Stub(StubFetcher),
}

impl FetchBackend {
    /// Builds the backend described by the fetch settings
    ///
    /// The rendered variant launches a browser process.
    pub async fn from_settings(settings: &FetchSettings) -> Result<Self, LedgerError> {
        match settings.mode {
            FetchMode::Plain => Ok(Self::Plain(PlainFetcher::new(settings)?)),
            FetchMode::Rendered => Ok(Self::Rendered(RenderedFetcher::launch(settings).await?)),
        }
    }

    /// Fetches one URL
    pub async fn fetch(&self, url: &CanonicalUrl) -> Result<FetchedPage, FetchError> {
        match self {
            Self::Plain(fetcher) => fetcher.fetch(url).await,
            Self::Rendered(fetcher) => fetcher.fetch(url).await.map(FetchedPage::Html),
            #[cfg(test)]
            Self::Stub(fetcher) => fetcher.fetch(url),
        }
    }

    /// Releases backend resources (closes the browser, if any)
    pub async fn shutdown(self) {
        match self {
            Self::Plain(_) => {}
            Self::Rendered(fetcher) => fetcher.shutdown().await,
            #[cfg(test)]
            Self::Stub(_) => {}
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Plain(_) => "plain",
            Self::Rendered(_) => "rendered",
            #[cfg(test)]
            Self::Stub(_) => "stub",
        }
    }
}

/// Plain HTTP fetcher
#[derive(Debug, Clone)]
pub struct PlainFetcher {
    client: Client,
}

impl PlainFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(settings)?,
        })
    }

    /// Fetches a URL and gates on Content-Type
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx with `text/html` | `FetchedPage::Html` |
    /// | 2xx, other content type | `FetchedPage::NotHtml` |
    /// | Non-2xx status | `FetchError::Status` |
    /// | Request or body timeout | `FetchError::Timeout` |
    /// | Any other failure | `FetchError::Transport` |
    pub async fn fetch(&self, url: &CanonicalUrl) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            return Ok(FetchedPage::NotHtml { content_type });
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(FetchedPage::Html(RenderedPage { final_url, html }))
    }
}

/// Builds an HTTP client from the fetch settings
///
/// # Example
///
/// ```
/// use site_ledger::config::FetchSettings;
/// use site_ledger::crawler::build_http_client;
///
/// let client = build_http_client(&FetchSettings::default()).unwrap();
/// ```
pub fn build_http_client(settings: &FetchSettings) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(settings.timeout())
        .connect_timeout(CONNECT_TIMEOUT.min(settings.timeout()))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true if a Content-Type header value denotes HTML
pub fn is_html(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}

/// In-memory fetcher serving HTML by canonical URL
///
/// Fetching a URL with no page registered panics, which lets tests exercise
/// worker failure.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct StubFetcher {
    pages: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl StubFetcher {
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    fn fetch(&self, url: &CanonicalUrl) -> Result<FetchedPage, FetchError> {
        let html = match self.pages.get(url.as_str()) {
            Some(html) => html.clone(),
            None => panic!("no page registered for {}", url),
        };
        let final_url = url.to_url().map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(FetchedPage::Html(RenderedPage { final_url, html }))
    }
}

fn classify_error(url: &CanonicalUrl, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Transport {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
