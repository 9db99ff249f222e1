//! Binary maze: connect the empty space and lengthen its longest path.

use tilegym_core::{Stats, TileCatalog, TileGrid, TileId};
use tilegym_space::{label_regions, longest_shortest_path};

use crate::config::ProblemSettings;
use crate::error::ProblemError;
use crate::problem::Problem;
use crate::reward::RangeTarget;

/// Metric: connected regions of empty tiles.
pub const REGIONS: &str = "regions";
/// Metric: longest shortest path through the empty tiles.
pub const PATH_LENGTH: &str = "path-length";

/// Two-tile maze problem over `empty, solid`.
#[derive(Clone, Debug)]
pub struct BinaryProblem {
    catalog: TileCatalog,
    settings: ProblemSettings,
    empty: TileId,
}

impl BinaryProblem {
    /// Registry name.
    pub const NAME: &'static str = "binary";

    /// A 14x14 maze with `target_path = 20`.
    pub fn new() -> Result<Self, ProblemError> {
        let catalog = TileCatalog::new(["empty", "solid"], "solid")?;
        let settings = ProblemSettings {
            width: 14,
            height: 14,
            probs: vec![0.5, 0.5],
            target_path: 20,
            random_probs: true,
            weights: [(REGIONS, 5.0), (PATH_LENGTH, 1.0)]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        };
        Ok(Self {
            empty: catalog.require("empty")?,
            catalog,
            settings,
        })
    }
}

impl Problem for BinaryProblem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    fn settings(&self) -> &ProblemSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut ProblemSettings {
        &mut self.settings
    }

    fn compute_stats(&self, grid: &TileGrid) -> Stats {
        let regions = label_regions(grid, &[self.empty]).count();
        let path = longest_shortest_path(grid, &[self.empty]);
        [(REGIONS, regions as f64), (PATH_LENGTH, path as f64)]
            .into_iter()
            .collect()
    }

    fn targets(&self) -> Vec<(&'static str, RangeTarget)> {
        vec![
            (REGIONS, RangeTarget::exactly(1.0)),
            (
                PATH_LENGTH,
                RangeTarget::new(self.settings.target_path as f64, f64::INFINITY),
            ),
        ]
    }

    fn episode_over(&self, new: &Stats, _old: &Stats) -> bool {
        new.get(REGIONS) == 1.0 && new.get(PATH_LENGTH) >= self.settings.target_path as f64
    }
}
