//! Cycle pacing
//!
//! The API enforces an hourly request quota, so every cycle is stretched to a
//! fixed budget. The delays live in a [`PacingPolicy`] value so the crawl loop
//! only asks "how long now?" and the arithmetic can be tested on its own.

use crate::config::PacingConfig;
use rand::Rng;
use serde::Deserialize;
use std::time::Duration;

/// How the end-of-cycle sleep is derived from the time a cycle took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PacingMode {
    /// Sleep a full budget only when the cycle overran it, otherwise no base
    /// sleep at all. Mirrors the cadence of the first deployed crawler.
    Literal,

    /// Sleep whatever remains of the budget: `max(0, budget - elapsed)`
    #[default]
    Remaining,
}

/// Delays applied between cycles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Sleep after a failed page fetch; the same page is retried
    pub fetch_error_delay: Duration,

    /// Sleep after the query returned an empty page
    pub exhaustion_delay: Duration,

    /// Target duration of a fetch-and-download cycle
    pub cycle_budget: Duration,

    /// Exclusive upper bound of the whole-second jitter
    pub max_jitter: Duration,

    pub mode: PacingMode,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::from(&PacingConfig::default())
    }
}

impl From<&PacingConfig> for PacingPolicy {
    fn from(config: &PacingConfig) -> Self {
        Self {
            fetch_error_delay: Duration::from_secs(config.fetch_error_delay_secs),
            exhaustion_delay: Duration::from_secs(config.exhaustion_delay_secs),
            cycle_budget: Duration::from_secs(config.cycle_budget_secs),
            max_jitter: Duration::from_secs(config.max_jitter_secs),
            mode: config.mode,
        }
    }
}

impl PacingPolicy {
    /// Sleep owed after a completed page, before jitter
    pub fn base_delay(&self, elapsed: Duration) -> Duration {
        match self.mode {
            PacingMode::Remaining => self.cycle_budget.saturating_sub(elapsed),
            PacingMode::Literal => {
                // Whole seconds, truncated
                let diff = self.cycle_budget.as_secs() as i64 - elapsed.as_secs() as i64;
                if diff <= 0 {
                    self.cycle_budget
                } else {
                    Duration::ZERO
                }
            }
        }
    }

    /// Random whole-second jitter in `[0, max_jitter)`
    pub fn jitter<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let max = self.max_jitter.as_secs();
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs(rng.gen_range(0..max))
    }

    /// Full sleep after a completed page
    pub fn cycle_delay<R: Rng + ?Sized>(&self, elapsed: Duration, rng: &mut R) -> Duration {
        self.base_delay(elapsed) + self.jitter(rng)
    }
}
