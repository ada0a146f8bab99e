//! Crawl coordinator - the paged fetch/download loop
//!
//! A [`CrawlSession`] owns the query and the page cursor. Each cycle fetches
//! the page under the cursor, downloads every photo on it in order and then
//! decides where the cursor goes next:
//!
//! | Outcome | Cursor | Delay |
//! |---------|--------|-------|
//! | Fetch failed | unchanged | `fetch_error_delay` |
//! | Empty page | reset to 1 | `exhaustion_delay` |
//! | All photos stored (or already present) | `+1` | budget pacing + jitter |
//! | Any download failed | unchanged | budget pacing + jitter |
//!
//! Holding the cursor re-fetches the same page next cycle; photos that were
//! stored are then skipped by the existence check, so only failures retry.

use crate::crawler::downloader::{DownloadOutcome, ImageDownloader};
use crate::crawler::fetcher::PhotoSource;
use crate::crawler::pacing::PacingPolicy;
use crate::crawler::stats::SessionStats;
use crate::CrawlError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

/// Per-page download tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl PageSummary {
    /// True when no download on the page failed
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// What happened during one cycle
#[derive(Debug)]
pub enum CycleOutcome {
    /// The page could not be fetched or decoded
    FetchFailed { page: u64, error: CrawlError },

    /// The page was empty; the query starts over
    Exhausted { previous_page: u64 },

    /// Every photo on the page was attempted
    Completed { page: u64, summary: PageSummary },
}

/// Result of [`CrawlSession::run_cycle`]
#[derive(Debug)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    /// Cursor after the cycle
    pub cursor: u64,
    /// Time spent fetching and downloading
    pub elapsed: Duration,
    /// Sleep owed before the next cycle
    pub delay: Duration,
}

impl CycleReport {
    /// True when the cursor moved forward during this cycle
    pub fn advanced(&self) -> bool {
        matches!(self.outcome, CycleOutcome::Completed { page, .. } if self.cursor == page + 1)
    }
}

/// Crawl state for one query
pub struct CrawlSession {
    query: String,
    cursor: u64,
    source: Box<dyn PhotoSource>,
    downloader: Box<dyn ImageDownloader>,
    policy: PacingPolicy,
    stats: SessionStats,
    rng: StdRng,
}

impl CrawlSession {
    /// Creates a session starting at `start_page` (clamped to at least 1)
    pub fn new(
        query: impl Into<String>,
        start_page: u64,
        source: Box<dyn PhotoSource>,
        downloader: Box<dyn ImageDownloader>,
        policy: PacingPolicy,
    ) -> Self {
        Self {
            query: query.into(),
            cursor: start_page.max(1),
            source,
            downloader,
            policy,
            stats: SessionStats::default(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Replaces the jitter source with a seeded one
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Next page to request
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Runs one fetch-and-download cycle without sleeping
    pub async fn run_cycle(&mut self) -> CycleReport {
        let started = Instant::now();
        let page = self.cursor;

        let photos = match self.source.fetch_page(&self.query, page).await {
            Ok(photos) => photos,
            Err(error) => {
                tracing::warn!("Failed to fetch page {}: {}", page, error);
                let delay = self.policy.fetch_error_delay;
                return self.finish(
                    CycleOutcome::FetchFailed { page, error },
                    started.elapsed(),
                    delay,
                );
            }
        };

        if photos.is_empty() {
            self.cursor = 1;
            tracing::info!(
                "Query '{}' exhausted at page {}, next page: {}",
                self.query,
                page,
                self.cursor
            );
            let delay = self.policy.exhaustion_delay;
            return self.finish(
                CycleOutcome::Exhausted {
                    previous_page: page,
                },
                started.elapsed(),
                delay,
            );
        }

        // Every photo is attempted; one failure holds the page
        let mut summary = PageSummary::default();
        for photo in &photos {
            tracing::debug!(
                "Photo {} tags: [{}]",
                photo.id,
                photo.tag_titles().collect::<Vec<_>>().join(", ")
            );
            match self.downloader.download(photo).await {
                Ok(DownloadOutcome::Downloaded { .. }) => summary.downloaded += 1,
                Ok(DownloadOutcome::AlreadyPresent { .. }) => summary.skipped += 1,
                Err(e) => {
                    tracing::warn!("Failed to download photo {}: {}", photo.id, e);
                    summary.failed += 1;
                }
            }
        }

        let elapsed = started.elapsed();
        tracing::info!(
            "Page {}: {} downloaded, {} skipped, {} failed in {}s",
            page,
            summary.downloaded,
            summary.skipped,
            summary.failed,
            elapsed.as_secs()
        );

        if summary.is_clean() {
            self.cursor += 1;
            tracing::info!("Next page: {}", self.cursor);
        } else {
            tracing::warn!("Holding page {} after {} failed downloads", page, summary.failed);
        }

        let delay = self.policy.cycle_delay(elapsed, &mut self.rng);
        self.finish(CycleOutcome::Completed { page, summary }, elapsed, delay)
    }

    fn finish(&mut self, outcome: CycleOutcome, elapsed: Duration, delay: Duration) -> CycleReport {
        self.stats.record(&outcome);
        CycleReport {
            outcome,
            cursor: self.cursor,
            elapsed,
            delay,
        }
    }

    /// Runs cycles forever, sleeping the reported delay after each
    pub async fn run(&mut self) {
        tracing::info!(
            "Starting crawl of '{}' at page {}",
            self.query,
            self.cursor
        );

        loop {
            let report = self.run_cycle().await;

            if self.stats.cycles % 10 == 0 {
                tracing::info!("Progress: {}", self.stats);
            }

            tracing::info!("Sleep: {} seconds", report.delay.as_secs());
            tokio::time::sleep(report.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::pacing::PacingMode;
    use crate::photo::{Photo, PhotoUrls};
    use async_trait::async_trait;
    use std::collections::{HashSet, VecDeque};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    fn photo(id: &str) -> Photo {
        Photo {
            id: id.to_string(),
            urls: PhotoUrls {
                raw: Some(format!("https://images.example.com/{}?ixid=1", id)),
                ..PhotoUrls::default()
            },
            ..Photo::default()
        }
    }

    /// Serves queued responses and records requested pages
    #[derive(Clone, Default)]
    struct FakeSource {
        responses: Arc<Mutex<VecDeque<Result<Vec<Photo>, CrawlError>>>>,
        requested: Arc<Mutex<Vec<(String, u64)>>>,
    }

    impl FakeSource {
        fn push(&self, response: Result<Vec<Photo>, CrawlError>) {
            self.responses.lock().unwrap().push_back(response);
        }

        fn requested_pages(&self) -> Vec<u64> {
            self.requested.lock().unwrap().iter().map(|(_, p)| *p).collect()
        }
    }

    #[async_trait]
    impl PhotoSource for FakeSource {
        async fn fetch_page(&self, query: &str, page: u64) -> Result<Vec<Photo>, CrawlError> {
            self.requested
                .lock()
                .unwrap()
                .push((query.to_string(), page));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    /// Pretends to download; ids in `failing` error, ids in `stored` are skipped
    #[derive(Clone, Default)]
    struct FakeDownloader {
        failing: Arc<Mutex<HashSet<String>>>,
        stored: Arc<Mutex<HashSet<String>>>,
        attempts: Arc<Mutex<Vec<String>>>,
    }

    impl FakeDownloader {
        fn fail(&self, id: &str) {
            self.failing.lock().unwrap().insert(id.to_string());
        }

        fn heal(&self, id: &str) {
            self.failing.lock().unwrap().remove(id);
        }

        fn attempts(&self) -> Vec<String> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageDownloader for FakeDownloader {
        async fn download(&self, photo: &Photo) -> Result<DownloadOutcome, CrawlError> {
            self.attempts.lock().unwrap().push(photo.id.clone());
            let path = PathBuf::from(format!("img/{}.png", photo.id));

            if self.stored.lock().unwrap().contains(&photo.id) {
                return Ok(DownloadOutcome::AlreadyPresent { path });
            }
            if self.failing.lock().unwrap().contains(&photo.id) {
                return Err(CrawlError::Download {
                    id: photo.id.clone(),
                    status_code: 503,
                });
            }

            self.stored.lock().unwrap().insert(photo.id.clone());
            Ok(DownloadOutcome::Downloaded {
                path,
                bytes: 4,
                caption: None,
            })
        }
    }

    fn session(start: u64, source: &FakeSource, downloader: &FakeDownloader) -> CrawlSession {
        CrawlSession::new(
            "photos",
            start,
            Box::new(source.clone()),
            Box::new(downloader.clone()),
            PacingPolicy::default(),
        )
        .with_seed(3)
    }

    #[tokio::test]
    async fn test_clean_page_advances_cursor() {
        let source = FakeSource::default();
        let downloader = FakeDownloader::default();
        source.push(Ok(vec![photo("a"), photo("b")]));

        let mut session = session(1, &source, &downloader);
        let report = session.run_cycle().await;

        assert_eq!(session.cursor(), 2);
        assert!(report.advanced());
        assert_eq!(source.requested.lock().unwrap()[0], ("photos".to_string(), 1));
        assert_eq!(downloader.attempts(), ["a", "b"]);
        match report.outcome {
            CycleOutcome::Completed { page, summary } => {
                assert_eq!(page, 1);
                assert_eq!(summary.downloaded, 2);
                assert!(summary.is_clean());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        // Remaining budget plus jitter below 10s
        assert!(report.delay <= Duration::from_secs(72 + 9));
    }

    #[tokio::test]
    async fn test_any_failure_holds_cursor_but_attempts_all() {
        let source = FakeSource::default();
        let downloader = FakeDownloader::default();
        downloader.fail("b");
        source.push(Ok(vec![photo("a"), photo("b"), photo("c")]));

        let mut session = session(7, &source, &downloader);
        let report = session.run_cycle().await;

        assert_eq!(session.cursor(), 7);
        assert!(!report.advanced());
        assert_eq!(downloader.attempts(), ["a", "b", "c"]);
        match report.outcome {
            CycleOutcome::Completed { summary, .. } => {
                assert_eq!(summary.downloaded, 2);
                assert_eq!(summary.failed, 1);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_held_page_is_retried_and_then_advances() {
        let source = FakeSource::default();
        let downloader = FakeDownloader::default();
        downloader.fail("b");
        source.push(Ok(vec![photo("a"), photo("b")]));
        source.push(Ok(vec![photo("a"), photo("b")]));

        let mut session = session(3, &source, &downloader);
        session.run_cycle().await;
        assert_eq!(session.cursor(), 3);

        downloader.heal("b");
        let report = session.run_cycle().await;

        assert_eq!(source.requested_pages(), [3, 3]);
        assert_eq!(session.cursor(), 4);
        match report.outcome {
            CycleOutcome::Completed { summary, .. } => {
                assert_eq!(summary.skipped, 1);
                assert_eq!(summary.downloaded, 1);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_already_present_counts_as_success() {
        let source = FakeSource::default();
        let downloader = FakeDownloader::default();
        downloader.stored.lock().unwrap().insert("a".to_string());
        source.push(Ok(vec![photo("a")]));

        let mut session = session(2, &source, &downloader);
        session.run_cycle().await;

        assert_eq!(session.cursor(), 3);
        assert_eq!(session.stats().skipped, 1);
        assert_eq!(session.stats().downloaded, 0);
    }

    #[tokio::test]
    async fn test_empty_page_resets_cursor() {
        let source = FakeSource::default();
        let downloader = FakeDownloader::default();
        source.push(Ok(Vec::new()));

        let mut session = session(5, &source, &downloader);
        let report = session.run_cycle().await;

        assert_eq!(session.cursor(), 1);
        assert_eq!(report.delay, Duration::from_secs(72));
        assert!(matches!(
            report.outcome,
            CycleOutcome::Exhausted { previous_page: 5 }
        ));
        assert!(downloader.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_keeps_cursor() {
        let source = FakeSource::default();
        let downloader = FakeDownloader::default();
        source.push(Err(CrawlError::Request {
            url: "https://api.example.com/photos".to_string(),
            status: "500 Internal Server Error".to_string(),
        }));

        let mut session = session(4, &source, &downloader);
        let report = session.run_cycle().await;

        assert_eq!(session.cursor(), 4);
        assert_eq!(report.delay, Duration::from_secs(30));
        assert!(matches!(
            report.outcome,
            CycleOutcome::FetchFailed { page: 4, .. }
        ));
        assert!(downloader.attempts().is_empty());
        assert_eq!(session.stats().fetch_failures, 1);
    }

    #[tokio::test]
    async fn test_literal_pacing_sleeps_only_jitter_for_fast_cycle() {
        let source = FakeSource::default();
        let downloader = FakeDownloader::default();
        source.push(Ok(vec![photo("a")]));

        let policy = PacingPolicy {
            mode: PacingMode::Literal,
            ..PacingPolicy::default()
        };
        let mut session = CrawlSession::new(
            "photos",
            1,
            Box::new(source.clone()),
            Box::new(downloader.clone()),
            policy,
        );
        let report = session.run_cycle().await;

        assert!(report.delay < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_start_page_is_at_least_one() {
        let source = FakeSource::default();
        let downloader = FakeDownloader::default();
        let session = session(0, &source, &downloader);
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.query(), "photos");
    }

    #[tokio::test]
    async fn test_stats_accumulate() {
        let source = FakeSource::default();
        let downloader = FakeDownloader::default();
        downloader.fail("x");
        source.push(Ok(vec![photo("a")]));
        source.push(Ok(vec![photo("x")]));
        source.push(Ok(Vec::new()));

        let mut session = session(1, &source, &downloader);
        for _ in 0..3 {
            session.run_cycle().await;
        }

        let stats = session.stats();
        assert_eq!(stats.cycles, 3);
        assert_eq!(stats.pages_completed, 1);
        assert_eq!(stats.pages_held, 1);
        assert_eq!(stats.resets, 1);
        assert_eq!(stats.downloaded, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(source.requested_pages(), [1, 2, 1]);
    }
}
