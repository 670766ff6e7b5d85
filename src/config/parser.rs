use crate::config::types::{CrawlConfig, Settings};
use crate::config::validation::{validate, validate_origin};
use crate::output::default_output_path;
use crate::ConfigError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Loads and parses a settings file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML settings file
///
/// # Returns
///
/// * `Ok(Settings)` - Successfully loaded and validated settings
/// * `Err(ConfigError)` - Failed to load, parse, or validate the settings
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use site_ledger::config::load_settings;
///
/// let settings = load_settings(Path::new("site-ledger.toml")).unwrap();
/// println!("Workers: {}", settings.crawler.concurrency);
/// ```
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_settings(&content)
}

/// Parses and validates settings from TOML text
pub fn parse_settings(content: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = toml::from_str(content)?;
    validate(&settings)?;
    Ok(settings)
}

impl CrawlConfig {
    /// Assembles the run configuration from an origin and validated settings
    ///
    /// # Arguments
    ///
    /// * `origin` - Raw origin URL from the command line
    /// * `output` - Explicit output path; derived from the origin when `None`
    /// * `settings` - Settings after command-line overrides were applied
    pub fn from_settings(
        origin: &str,
        output: Option<PathBuf>,
        settings: &Settings,
    ) -> Result<Self, ConfigError> {
        validate(settings)?;
        let origin = validate_origin(origin)?;

        let delay = match settings.crawler.delay_seconds {
            Some(seconds) => Duration::from_secs_f64(seconds),
            None => settings.fetch.mode.default_delay(),
        };

        let output = output.unwrap_or_else(|| {
            default_output_path(&origin, settings.output.timestamped, chrono::Local::now())
        });

        Ok(Self {
            origin,
            delay,
            output,
            concurrency: settings.crawler.concurrency as usize,
            fetch: settings.fetch.clone(),
        })
    }
}
