use serde::{Deserialize, Serialize};

use crate::process::ProcessContext;

/// One simulated day, in minutes.
pub const DAY_MINUTES: f64 = 24.0 * 60.0;

/// Run-level settings for a [`crate::runner::Simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Events due at or after this time are never dispatched. `f64::INFINITY` runs until drained.
    pub horizon: f64,
    /// Seed for the default [`crate::random::SeededRandom`] source.
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            horizon: DAY_MINUTES,
            seed: 42,
        }
    }
}

impl RunConfig {
    pub fn with_horizon(mut self, horizon: f64) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Bounds for a uniform draw, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformRange {
    pub min: f64,
    pub max: f64,
}

impl UniformRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, ctx: &mut ProcessContext<'_>) -> f64 {
        ctx.uniform(self.min, self.max)
    }
}
