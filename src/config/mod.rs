//! Configuration module for Photo-Harvest
//!
//! This module handles loading and validating the crawler settings. Settings
//! come from an optional TOML file and are then overridden by command-line
//! flags, so validation runs separately once all sources are merged.
//!
//! # Example
//!
//! ```no_run
//! use photo_harvest::config::{load_config, validate};
//! use std::path::Path;
//!
//! let mut config = load_config(Path::new("harvest.toml")).unwrap();
//! config.api.access_key = "my-key".to_string();
//! validate(&config).unwrap();
//! println!("Crawling query: {}", config.api.query);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, Config, OutputConfig, PacingConfig, DEFAULT_API_BASE, DEFAULT_IMAGE_QUERY,
    DEFAULT_QUERY,
};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
