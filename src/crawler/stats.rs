//! Running totals for a crawl session

use crate::crawler::coordinator::CycleOutcome;
use std::fmt;

/// Counters accumulated across cycles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub cycles: u64,
    /// Pages whose every photo was stored
    pub pages_completed: u64,
    /// Pages that will be fetched again because a download failed
    pub pages_held: u64,
    pub fetch_failures: u64,
    /// Times the cursor was reset after an empty page
    pub resets: u64,
    pub downloaded: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl SessionStats {
    pub fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::FetchFailed { .. } => self.fetch_failures += 1,
            CycleOutcome::Exhausted { .. } => self.resets += 1,
            CycleOutcome::Completed { summary, .. } => {
                if summary.is_clean() {
                    self.pages_completed += 1;
                } else {
                    self.pages_held += 1;
                }
                self.downloaded += summary.downloaded as u64;
                self.skipped += summary.skipped as u64;
                self.failed += summary.failed as u64;
            }
        }
    }
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cycles, {} pages completed, {} held, {} fetch failures, {} resets; \
             {} downloaded, {} skipped, {} failed",
            self.cycles,
            self.pages_completed,
            self.pages_held,
            self.fetch_failures,
            self.resets,
            self.downloaded,
            self.skipped,
            self.failed
        )
    }
}
