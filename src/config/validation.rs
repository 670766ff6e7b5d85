use crate::config::types::{CrawlerSettings, FetchSettings, Settings};
use crate::url::CanonicalUrl;
use crate::ConfigError;

/// Largest accepted per-request delay, in seconds
const MAX_DELAY_SECONDS: f64 = 3600.0;

/// Largest accepted worker count
const MAX_CONCURRENCY: u32 = 32;

/// Validates the entire settings structure
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    validate_crawler_settings(&settings.crawler)?;
    validate_fetch_settings(&settings.fetch)?;
    Ok(())
}

/// Validates the crawl origin and returns its canonical form
///
/// The origin must start with `http://` or `https://` and have a host.
pub fn validate_origin(raw: &str) -> Result<CanonicalUrl, ConfigError> {
    CanonicalUrl::parse_origin(raw)
        .map_err(|e| ConfigError::InvalidOrigin(format!("'{}': {}", raw, e)))
}

/// Validates crawler settings
fn validate_crawler_settings(settings: &CrawlerSettings) -> Result<(), ConfigError> {
    if let Some(delay) = settings.delay_seconds {
        if !delay.is_finite() || !(0.0..=MAX_DELAY_SECONDS).contains(&delay) {
            return Err(ConfigError::Validation(format!(
                "delay_seconds must be between 0 and {}, got {}",
                MAX_DELAY_SECONDS, delay
            )));
        }
    }

    if settings.concurrency < 1 || settings.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, settings.concurrency
        )));
    }

    Ok(())
}

/// Validates fetch settings
fn validate_fetch_settings(settings: &FetchSettings) -> Result<(), ConfigError> {
    if settings.timeout_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_seconds must be >= 1, got {}",
            settings.timeout_seconds
        )));
    }

    if settings.idle_timeout_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "idle_timeout_seconds must be >= 1, got {}",
            settings.idle_timeout_seconds
        )));
    }

    if settings.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}
