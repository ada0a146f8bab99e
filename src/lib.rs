//! Photo-Harvest: a paced photo-search crawler
//!
//! This crate repeatedly queries a paginated photo-search API, downloads every
//! referenced image into a local directory exactly once, and only advances its
//! page cursor when a whole page was stored without error.

pub mod config;
pub mod crawler;
pub mod photo;
pub mod storage;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Search request to {url} failed: {status}")]
    Request { url: String, status: String },

    #[error("Failed to parse search response: {0}")]
    Parse(String),

    #[error("Transport error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Download of {id} failed with HTTP {status_code}")]
    Download { id: String, status_code: u16 },

    #[error("Photo {id} has no raw source URL")]
    MissingSource { id: String },

    #[error("Storage error at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl CrawlError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlSession, CycleOutcome, CycleReport, PacingMode, PacingPolicy};
pub use photo::{Photo, PhotoUrls};
pub use storage::ArtifactStore;
