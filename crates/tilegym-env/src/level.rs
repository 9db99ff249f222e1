//! The single-agent level-editing environment.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tilegym_core::{
    Action, ActionSpace, Array, BoxSpace, GridError, Info, ObsSpace, Observation, Pos, Stats,
    TileCatalog, TileGrid, TileId, Transition,
};
use tilegym_problem::{make_problem, Problem, ProblemError};
use tracing::{debug, warn};

use crate::config::{LevelConfig, LevelParams, DEFAULT_CHANGE_PERCENTAGE};
use crate::env::Env;
use crate::error::{ConfigError, EnvError};
use crate::representation::{Representation, RepresentationKind};

/// Edit state machine: owns the grid, applies one edit per step, and asks
/// its [`Problem`] for stats, reward and termination.
///
/// An episode ends when the problem is satisfied, when `max_changes` cells
/// have been changed, or after `max_iterations` steps, whichever is first.
///
/// Observation channels:
///
/// | Channel | Shape | Range |
/// |---------|-------|-------|
/// | `map` | `(h, w)` | `[0, kinds - 1]` |
/// | `heatmap` | `(h, w)` | `[0, max_changes]` |
/// | `pos` (narrow, turtle) | `[2]` as `[x, y]` | `[0, max(w, h) - 1]` |
pub struct LevelEnv {
    problem: Box<dyn Problem>,
    rep: Representation,
    rng: ChaCha8Rng,
    grid: TileGrid,
    stats: Stats,
    heatmap: Vec<u32>,
    probs: Vec<f64>,
    queued: Option<TileGrid>,
    last_target: Option<Pos>,
    change_percentage: f64,
    max_changes: usize,
    max_iterations: usize,
    iteration: usize,
    changes: usize,
    obs_space: ObsSpace,
    contract_frozen: bool,
}

impl LevelEnv {
    /// Build an environment around a problem instance.
    pub fn new(mut problem: Box<dyn Problem>, config: LevelConfig) -> Result<Self, ConfigError> {
        config.params.validate()?;
        problem.adjust(&config.params.problem)?;
        let grid = border_grid(problem.as_ref())?;
        let probs = problem.settings().probs.clone();
        let stats = problem.compute_stats(&grid);
        let mut rep = Representation::new(config.representation, false, false);
        rep.set_options(config.params.random_tile, config.params.warp);

        let mut env = Self {
            heatmap: vec![0; grid.cell_count()],
            problem,
            rep,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            grid,
            stats,
            probs,
            queued: None,
            last_target: None,
            change_percentage: config
                .params
                .change_percentage
                .unwrap_or(DEFAULT_CHANGE_PERCENTAGE),
            max_changes: 0,
            max_iterations: 0,
            iteration: 0,
            changes: 0,
            obs_space: ObsSpace::new(),
            contract_frozen: false,
        };
        env.derive_limits();
        Ok(env)
    }

    /// Build an environment for a registered problem name.
    pub fn from_name(problem: &str, config: LevelConfig) -> Result<Self, ConfigError> {
        Self::new(make_problem(problem)?, config)
    }

    /// Apply parameter overrides. Takes effect from the next `reset`.
    ///
    /// Once the contract is frozen, overrides that would change the extent
    /// or the change budget are rejected and nothing is applied.
    pub fn adjust_param(&mut self, params: &LevelParams) -> Result<(), ConfigError> {
        params.validate()?;
        if self.contract_frozen {
            self.check_frozen(params)?;
        }
        self.problem.adjust(&params.problem)?;
        if let Some(p) = params.change_percentage {
            self.change_percentage = p;
        }
        self.rep.set_options(params.random_tile, params.warp);
        let settings = self.problem.settings();
        self.probs = settings.probs.clone();
        if (settings.width, settings.height) != (self.grid.width(), self.grid.height()) {
            self.grid = border_grid(self.problem.as_ref())?;
            self.heatmap = vec![0; self.grid.cell_count()];
            self.queued = None;
            self.stats = self.problem.compute_stats(&self.grid);
        }
        self.derive_limits();
        Ok(())
    }

    fn check_frozen(&self, params: &LevelParams) -> Result<(), ConfigError> {
        let (w, h) = (self.width(), self.height());
        let extent = (
            params.problem.width.unwrap_or(w),
            params.problem.height.unwrap_or(h),
        );
        if extent != (w, h) {
            return Err(ConfigError::FrozenContract { param: "extent" });
        }
        if params
            .change_percentage
            .is_some_and(|p| p != self.change_percentage)
        {
            return Err(ConfigError::FrozenContract {
                param: "change_percentage",
            });
        }
        Ok(())
    }

    /// Pin the observation contract. Called by wrappers that size
    /// themselves from it when they are built.
    pub fn freeze_contract(&mut self) {
        self.contract_frozen = true;
    }

    /// Whether [`freeze_contract`](Self::freeze_contract) has been called.
    pub fn is_contract_frozen(&self) -> bool {
        self.contract_frozen
    }

    fn derive_limits(&mut self) {
        let (w, h) = (self.grid.width(), self.grid.height());
        let cells = w * h;
        self.max_changes = ((self.change_percentage * cells as f64) as usize).max(1);
        self.max_iterations = self.max_changes * cells;

        let kinds = self.problem.catalog().len();
        let mut space = ObsSpace::new();
        space.insert("map", BoxSpace::new(0.0, (kinds - 1) as f32, &[h, w]));
        space.insert("heatmap", BoxSpace::new(0.0, self.max_changes as f32, &[h, w]));
        if self.rep.focus().is_some() {
            space.insert("pos", BoxSpace::new(0.0, (w.max(h) - 1) as f32, &[2]));
        }
        self.obs_space = space;
    }

    // ── Accessors ───────────────────────────────────────────────

    /// The scoring problem.
    pub fn problem(&self) -> &dyn Problem {
        self.problem.as_ref()
    }

    /// The tile catalog.
    pub fn catalog(&self) -> &TileCatalog {
        self.problem.catalog()
    }

    /// The current level.
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Stats of the current level.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Level width.
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Level height.
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Representation in use.
    pub fn representation(&self) -> RepresentationKind {
        self.rep.kind()
    }

    /// The cell the next edit targets, for focus-following representations.
    pub fn focus(&self) -> Option<Pos> {
        self.rep.focus()
    }

    /// The cell the most recent step addressed: the focus before the step,
    /// or the `(x, y)` of a wide action.
    pub fn last_target(&self) -> Option<Pos> {
        self.last_target
    }

    /// Per-cell change counts this episode, row-major.
    pub fn heatmap(&self) -> &[u32] {
        &self.heatmap
    }

    /// Steps taken this episode.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Cells changed this episode.
    pub fn changes(&self) -> usize {
        self.changes
    }

    /// Change budget per episode.
    pub fn max_changes(&self) -> usize {
        self.max_changes
    }

    /// Step budget per episode.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Tile sampling weights used for the current episode.
    pub fn tile_probs(&self) -> &[f64] {
        &self.probs
    }

    /// The environment's seeded RNG.
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    // ── Editing hooks ───────────────────────────────────────────

    /// Use `grid` as the starting level of the next episode only.
    pub fn queue_initial_map(&mut self, grid: TileGrid) -> Result<(), GridError> {
        if (grid.width(), grid.height()) != (self.width(), self.height()) {
            return Err(GridError::CellCountMismatch {
                expected: self.grid.cell_count(),
                got: grid.cell_count(),
            });
        }
        grid.check_catalog(self.catalog())?;
        self.queued = Some(grid);
        Ok(())
    }

    /// Whether a seed level is waiting for the next reset.
    pub fn has_queued_map(&self) -> bool {
        self.queued.is_some()
    }

    /// Overwrite one tile outside the edit budget and refresh stats.
    ///
    /// Returns whether the tile changed.
    pub fn set_tile(&mut self, pos: Pos, tile: TileId) -> Result<bool, EnvError> {
        if !self.catalog().contains(tile) {
            return Err(GridError::UnknownTile {
                tile,
                kinds: self.catalog().len(),
            }
            .into());
        }
        let old = self.grid.set(pos, tile)?;
        if old != tile {
            self.stats = self.problem.compute_stats(&self.grid);
        }
        Ok(old != tile)
    }

    /// The action that writes `kind` at `pos`. Focus-following
    /// representations write at their focus regardless of `pos`.
    pub fn placement(&self, pos: Pos, kind: TileId) -> Action {
        self.rep.placement(pos, kind)
    }

    /// The current observation.
    pub fn observation(&self) -> Observation {
        let (w, h) = (self.width(), self.height());
        let mut obs = Observation::new();
        obs.insert("map", Array::from_grid(&self.grid));
        debug_assert_eq!(self.heatmap.len(), w * h);
        let mut heat = Array::zeros(&[h, w]);
        for (cell, &count) in heat.data_mut().iter_mut().zip(&self.heatmap) {
            *cell = count as f32;
        }
        obs.insert("heatmap", heat);
        if let Some(p) = self.rep.focus() {
            obs.insert("pos", Array::from_pos(p));
        }
        obs
    }

    fn sample_grid(&mut self) -> Result<TileGrid, GridError> {
        let total: f64 = self.probs.iter().sum();
        let (w, h) = (self.problem.settings().width, self.problem.settings().height);
        let cells = (0..w * h)
            .map(|_| {
                let mut r = self.rng.random::<f64>() * total;
                for (i, p) in self.probs.iter().enumerate() {
                    if r < *p {
                        return TileId(i as u8);
                    }
                    r -= p;
                }
                TileId((self.probs.len() - 1) as u8)
            })
            .collect();
        TileGrid::from_cells(w, h, cells)
    }
}

/// A level of the problem's extent filled with its border tile.
fn border_grid(problem: &dyn Problem) -> Result<TileGrid, ProblemError> {
    let settings = problem.settings();
    TileGrid::filled(settings.width, settings.height, problem.catalog().border()).map_err(|_| {
        ProblemError::InvalidExtent {
            width: settings.width,
            height: settings.height,
        }
    })
}

impl Env for LevelEnv {
    fn reset(&mut self) -> Result<Observation, EnvError> {
        self.iteration = 0;
        self.changes = 0;
        self.last_target = None;
        if self.problem.settings().random_probs {
            let drawn: Vec<f64> = (0..self.catalog().len())
                .map(|_| self.rng.random::<f64>())
                .collect();
            if drawn.iter().sum::<f64>() > 0.0 {
                self.probs = drawn;
            } else {
                warn!("random tile weights summed to zero, keeping previous weights");
            }
        } else {
            self.probs = self.problem.settings().probs.clone();
        }

        self.grid = match self.queued.take() {
            Some(seed) => {
                debug!(problem = self.problem.name(), "reset from queued map");
                seed
            }
            None => self.sample_grid()?,
        };
        let (w, h) = (self.width(), self.height());
        self.rep.reset(w, h, &mut self.rng);
        self.stats = self.problem.compute_stats(&self.grid);
        self.heatmap = vec![0; self.grid.cell_count()];
        Ok(self.observation())
    }

    fn step(&mut self, action: &Action) -> Result<Transition, EnvError> {
        let space = self.action_space();
        if !space.contains(action) {
            return Err(EnvError::InvalidAction {
                action: action.clone(),
                space,
            });
        }

        self.iteration += 1;
        self.last_target = match action {
            Action::Multi(v) if v.len() == 3 => Some(Pos::new(v[0], v[1])),
            _ => self.rep.focus(),
        };
        let old_stats = self.stats.clone();
        let kinds = self.catalog().len();
        if let Some(pos) = self.rep.apply(action, &mut self.grid, kinds, &mut self.rng)? {
            self.changes += 1;
            if let Some(i) = self.grid.index_of(pos) {
                self.heatmap[i] += 1;
            }
            self.stats = self.problem.compute_stats(&self.grid);
        }

        let reward = self.problem.reward(&self.stats, &old_stats);
        let solved = self.problem.episode_over(&self.stats, &old_stats);
        let done = solved
            || self.changes >= self.max_changes
            || self.iteration >= self.max_iterations;
        if done {
            debug!(
                problem = self.problem.name(),
                iterations = self.iteration,
                changes = self.changes,
                solved,
                "episode finished"
            );
        }

        let mut info = Info::from(&self.problem.debug_info(&self.stats, &old_stats));
        info.insert("iterations", self.iteration);
        info.insert("changes", self.changes);
        info.insert("max_iterations", self.max_iterations);
        info.insert("max_changes", self.max_changes);

        Ok(Transition {
            obs: self.observation(),
            reward,
            done,
            info,
        })
    }

    fn observation_space(&self) -> &ObsSpace {
        &self.obs_space
    }

    fn action_space(&self) -> ActionSpace {
        self.rep
            .action_space(self.width(), self.height(), self.catalog().len())
    }

    fn level(&self) -> &LevelEnv {
        self
    }

    fn level_mut(&mut self) -> &mut LevelEnv {
        self
    }
}
