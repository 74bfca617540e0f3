//! Search configuration
//!
//! Caller-tunable parameters for catalog queries. Hosts typically fill these
//! from their own configuration file or request arguments.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Default minimum score (0-100) a match must reach
pub const DEFAULT_MIN_SCORE: f64 = 60.0;

/// Default maximum number of results
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Configuration for search queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Matches scoring below this are discarded
    #[serde(default = "default_min_score")]
    pub min_score: f64,

    /// Upper bound on the number of matches returned
    #[serde(default = "default_max_results")]
    pub max_results: NonZeroUsize,
}

fn default_min_score() -> f64 {
    DEFAULT_MIN_SCORE
}

fn default_max_results() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_MAX_RESULTS).unwrap_or(NonZeroUsize::MIN)
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            max_results: default_max_results(),
        }
    }
}

impl SearchConfig {
    /// Create a new search configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the minimum score (clamped to 0-100)
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self.min_score = self.effective_min_score();
        self
    }

    /// Builder method: set the result limit
    pub fn with_max_results(mut self, max_results: NonZeroUsize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Minimum score actually applied: clamped to 0-100, default if NaN
    pub fn effective_min_score(&self) -> f64 {
        if self.min_score.is_nan() {
            DEFAULT_MIN_SCORE
        } else {
            self.min_score.clamp(0.0, 100.0)
        }
    }
}
