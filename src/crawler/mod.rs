//! Crawler module for paged photo harvesting
//!
//! This module contains the core crawling logic, including:
//! - Page fetching against the search API
//! - Idempotent image downloads
//! - Cycle pacing
//! - The cursor-owning crawl loop

mod coordinator;
mod downloader;
mod fetcher;
mod pacing;
mod stats;

pub use coordinator::{CrawlSession, CycleOutcome, CycleReport, PageSummary};
pub use downloader::{
    caption_line, image_url, DownloadOptions, DownloadOutcome, HttpImageDownloader,
    ImageDownloader, FORCED_FORMAT,
};
pub use fetcher::{build_http_client, HttpPhotoSource, PhotoSource, ORDER_BY, PER_PAGE};
pub use pacing::{PacingMode, PacingPolicy};
pub use stats::SessionStats;

use crate::config::Config;
use crate::storage::ArtifactStore;
use crate::CrawlError;

/// Builds a session wired to the HTTP API and the local artifact directory
///
/// Creates the output directory if it does not exist yet.
///
/// # Arguments
///
/// * `config` - A validated configuration
///
/// # Returns
///
/// * `Ok(CrawlSession)` - Session positioned at the configured start page
/// * `Err(CrawlError)` - The HTTP client or the output directory could not be set up
pub async fn build_session(config: &Config) -> Result<CrawlSession, CrawlError> {
    let store = ArtifactStore::new(&config.output.image_dir);
    store.ensure_dir().await?;

    let client = build_http_client(&config.api)?;
    let source = HttpPhotoSource::new(client.clone(), &config.api);
    let downloader =
        HttpImageDownloader::new(client, store, DownloadOptions::from(&config.output));

    Ok(CrawlSession::new(
        config.api.query.clone(),
        config.api.start_page,
        Box::new(source),
        Box::new(downloader),
        PacingPolicy::from(&config.pacing),
    ))
}

/// Runs a crawl until the process is interrupted
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Create the artifact directory
/// 2. Build the HTTP client and collaborators
/// 3. Run fetch/download cycles forever
/// 4. Stop on Ctrl-C and report session totals
///
/// # Example
///
/// ```no_run
/// use photo_harvest::config::Config;
/// use photo_harvest::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.api.access_key = "my-key".to_string();
/// crawl(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config) -> Result<(), CrawlError> {
    let mut session = build_session(&config).await?;

    let interrupted = tokio::select! {
        _ = session.run() => false,
        _ = shutdown_signal() => true,
    };

    if interrupted {
        tracing::info!("Interrupted, stopping crawl at page {}", session.cursor());
    }

    tracing::info!("Session totals: {}", session.stats());
    Ok(())
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
