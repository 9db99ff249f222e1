//! Environment configuration.

use tilegym_problem::ProblemParams;

use crate::error::ConfigError;
use crate::representation::RepresentationKind;

/// Adjustable environment parameters. `None` keeps the current value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LevelParams {
    /// Problem overrides (extent, probabilities, target path, weights).
    pub problem: ProblemParams,
    /// Fraction of cells that may change before the episode ends.
    pub change_percentage: Option<f64>,
    /// Narrow representation: jump the focus randomly instead of walking.
    pub random_tile: Option<bool>,
    /// Turtle representation: wrap at the edges instead of clamping.
    pub warp: Option<bool>,
}

impl LevelParams {
    /// Check values that can be checked without a problem instance.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(p) = self.change_percentage {
            if !(p > 0.0 && p <= 1.0) {
                return Err(ConfigError::InvalidChangePercentage { value: p });
            }
        }
        Ok(())
    }
}

/// Construction-time configuration for a [`LevelEnv`](crate::LevelEnv).
#[derive(Clone, Debug, PartialEq)]
pub struct LevelConfig {
    /// Edit representation.
    pub representation: RepresentationKind,
    /// Seed for the environment's RNG.
    pub seed: u64,
    /// Initial parameter overrides.
    pub params: LevelParams,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            representation: RepresentationKind::Narrow,
            seed: 0,
            params: LevelParams::default(),
        }
    }
}

/// Default fraction of cells an agent may change per episode.
pub const DEFAULT_CHANGE_PERCENTAGE: f64 = 0.2;
