//! The `Problem` trait: how a game scores a level.

use tilegym_core::{Stats, TileCatalog, TileGrid};

use crate::config::{ProblemParams, ProblemSettings};
use crate::error::ProblemError;
use crate::reward::RangeTarget;

/// A level-design game: its tiles, its stats, and how stats become reward.
///
/// Stats computation never fails. Malformed levels (missing or duplicated
/// landmarks, disconnected regions) degrade metrics to zero instead.
pub trait Problem: Send {
    /// Registry name.
    fn name(&self) -> &str;

    /// The tile kinds this game understands.
    fn catalog(&self) -> &TileCatalog;

    /// Current adjustable settings.
    fn settings(&self) -> &ProblemSettings;

    /// Mutable settings, used by [`adjust`](Self::adjust).
    fn settings_mut(&mut self) -> &mut ProblemSettings;

    /// Compute the stats record for a level.
    fn compute_stats(&self, grid: &TileGrid) -> Stats;

    /// Target interval for each rewarded metric, in summation order.
    fn targets(&self) -> Vec<(&'static str, RangeTarget)>;

    /// Whether the level is good enough to end the episode.
    fn episode_over(&self, new: &Stats, old: &Stats) -> bool;

    /// Weighted sum of per-metric range rewards.
    fn reward(&self, new: &Stats, old: &Stats) -> f64 {
        let settings = self.settings();
        self.targets()
            .into_iter()
            .map(|(metric, target)| {
                settings.weight(metric) * target.reward(new.get(metric), old.get(metric))
            })
            .sum()
    }

    /// Read-only projection of the stats for logging.
    fn debug_info(&self, new: &Stats, _old: &Stats) -> Stats {
        new.clone()
    }

    /// Apply parameter overrides.
    fn adjust(&mut self, params: &ProblemParams) -> Result<(), ProblemError> {
        let catalog = self.catalog().clone();
        self.settings_mut().apply(params, &catalog)
    }
}
