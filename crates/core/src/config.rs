//! Engine configuration

use crate::types::DEFAULT_RESHUFFLE_LIMIT;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Seed for refills, color-bomb picks and reshuffles
    pub seed: u32,
    /// Attempts before a reshuffle gives up on a dead board
    pub reshuffle_limit: u32,
    /// Fill random level cells without creating runs at load time
    pub avoid_initial_runs: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            reshuffle_limit: DEFAULT_RESHUFFLE_LIMIT,
            avoid_initial_runs: true,
        }
    }
}

impl EngineConfig {
    /// Create from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let seed = env::var("TILE_CASCADE_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.seed);

        let reshuffle_limit = env::var("TILE_CASCADE_RESHUFFLE_LIMIT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .filter(|&n: &u32| n > 0)
            .unwrap_or(defaults.reshuffle_limit);

        let avoid_initial_runs = !env::var("TILE_CASCADE_ALLOW_INITIAL_RUNS")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        Self {
            seed,
            reshuffle_limit,
            avoid_initial_runs,
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }
}
