//! Configuration module for Site-Ledger
//!
//! This module handles loading, parsing, and validating the optional TOML
//! settings file, and assembling the fixed per-run [`CrawlConfig`].
//!
//! # Example
//!
//! ```no_run
//! use site_ledger::config::{load_settings, CrawlConfig};
//! use std::path::Path;
//!
//! let settings = load_settings(Path::new("site-ledger.toml")).unwrap();
//! let config = CrawlConfig::from_settings("https://example.com", None, &settings).unwrap();
//! println!("Writing results to {}", config.output.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlConfig, CrawlerSettings, FetchMode, FetchSettings, OutputSettings, Settings,
    DEFAULT_USER_AGENT,
};

// Re-export parser and validation functions
pub use parser::{load_settings, parse_settings};
pub use validation::validate_origin;
