//! Browser-rendered fetching
//!
//! Pages whose content is assembled by scripts are loaded in a headless
//! Chromium over CDP. Each fetch opens a fresh tab, navigates, waits for the
//! page to settle, and returns the serialized DOM.

use crate::config::FetchSettings;
use crate::crawler::fetcher::RenderedPage;
use crate::url::CanonicalUrl;
use crate::{FetchError, LedgerError};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, trace, warn};
use url::Url;

/// Titles that mean a script-built page has not rendered yet (compared lowercased)
const PLACEHOLDER_TITLES: [&str; 4] = ["", "loading", "loading...", "読み込み中"];

/// Number of title re-checks while a placeholder title is showing
const TITLE_POLLS: usize = 10;

const TITLE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Fetcher backed by a Chromium instance
pub struct RenderedFetcher {
    browser: Browser,
    handler: JoinHandle<()>,
    timeout: Duration,
    idle_timeout: Duration,
    settle: Duration,
}

impl RenderedFetcher {
    /// Launches the browser and its CDP event loop
    pub async fn launch(settings: &FetchSettings) -> Result<Self, LedgerError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(settings.timeout())
            .arg(format!("--user-agent={}", settings.user_agent))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-notifications")
            .arg("--mute-audio");

        if !settings.headless {
            builder = builder.with_head();
        }

        let config = builder.build().map_err(LedgerError::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| LedgerError::Browser(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    // Unknown CDP events fail to deserialize; they are harmless
                    trace!("Browser handler error: {}", e);
                }
            }
            debug!("Browser event handler task completed");
        });

        debug!(
            "Browser launched ({})",
            if settings.headless { "headless" } else { "headed" }
        );

        Ok(Self {
            browser,
            handler,
            timeout: settings.timeout(),
            idle_timeout: settings.idle_timeout(),
            settle: settings.settle(),
        })
    }

    /// Loads a URL in a fresh tab and returns its rendered HTML
    ///
    /// The tab is closed on every exit path, including when the returned
    /// future is dropped mid-render.
    pub async fn fetch(&self, url: &CanonicalUrl) -> Result<RenderedPage, FetchError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| cdp_error(url, e))?;
        let mut tab = TabGuard(Some(page.clone()));

        let result = self.render(&page, url).await;

        tab.0 = None;
        if let Err(e) = page.close().await {
            debug!("Failed to close tab for {}: {}", url, e);
        }

        result
    }

    /// Number of tabs the browser currently has open
    pub async fn open_tabs(&self) -> Result<usize, LedgerError> {
        self.browser
            .pages()
            .await
            .map(|pages| pages.len())
            .map_err(|e| LedgerError::Browser(e.to_string()))
    }

    async fn render(&self, page: &Page, url: &CanonicalUrl) -> Result<RenderedPage, FetchError> {
        match timeout(self.timeout, page.goto(url.as_str())).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(cdp_error(url, e)),
            Err(_) => return Err(timeout_error(url)),
        }

        // Pages that keep loading past the idle wait are extracted as they are
        if timeout(self.idle_timeout, page.wait_for_navigation())
            .await
            .is_err()
        {
            debug!("Idle wait elapsed for {}", url);
        }

        sleep(self.settle).await;
        wait_for_title(page).await;

        let html = timeout(self.timeout, page.content())
            .await
            .map_err(|_| timeout_error(url))?
            .map_err(|e| cdp_error(url, e))?;

        let final_url = match page
            .url()
            .await
            .ok()
            .flatten()
            .and_then(|u| Url::parse(&u).ok())
        {
            Some(final_url) => final_url,
            None => url.to_url().map_err(|e| FetchError::Browser {
                url: url.to_string(),
                message: e.to_string(),
            })?,
        };

        Ok(RenderedPage { final_url, html })
    }

    /// Closes the browser and stops its event loop
    pub async fn shutdown(mut self) {
        if let Ok(tabs) = self.open_tabs().await {
            debug!("Closing browser with {} open tab(s)", tabs);
        }
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Failed to wait for browser exit: {}", e);
        }
        self.handler.abort();
    }
}

/// Closes its tab on drop unless emptied first
struct TabGuard(Option<Page>);

impl Drop for TabGuard {
    fn drop(&mut self) {
        let Some(page) = self.0.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = page.close().await {
                        debug!("Failed to close abandoned tab: {}", e);
                    }
                });
            }
            Err(_) => trace!("No runtime to close abandoned tab"),
        }
    }
}

/// Returns true if a title looks like a not-yet-rendered placeholder
pub fn is_placeholder_title(title: &str) -> bool {
    let title = title.trim().to_lowercase();
    PLACEHOLDER_TITLES.contains(&title.as_str())
}

/// Polls the title while it still shows a placeholder
async fn wait_for_title(page: &Page) {
    if !is_placeholder_title(&current_title(page).await) {
        return;
    }

    for _ in 0..TITLE_POLLS {
        sleep(TITLE_POLL_INTERVAL).await;
        if !is_placeholder_title(&current_title(page).await) {
            return;
        }
    }

    trace!("Title still a placeholder after {} polls", TITLE_POLLS);
}

async fn current_title(page: &Page) -> String {
    page.get_title().await.ok().flatten().unwrap_or_default()
}

fn timeout_error(url: &CanonicalUrl) -> FetchError {
    FetchError::Timeout {
        url: url.to_string(),
    }
}

fn cdp_error(url: &CanonicalUrl, error: CdpError) -> FetchError {
    match error {
        CdpError::Timeout => timeout_error(url),
        other => FetchError::Browser {
            url: url.to_string(),
            message: other.to_string(),
        },
    }
}
