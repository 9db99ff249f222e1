//! Stages that append a derived channel.

use tilegym_core::{Array, BoxSpace, ObsSpace, Observation, Transition};
use tilegym_env::LevelEnv;

use crate::error::StageError;
use crate::stage::{require, Transform};

/// Append `changes`: the sum of the `heatmap` channel.
///
/// In map mode the sum fills an array shaped like `heatmap`; otherwise it
/// is a single-element channel.
#[derive(Clone, Debug)]
pub struct AddChanges {
    is_map: bool,
}

impl AddChanges {
    /// Spatial `changes` channel.
    pub fn map() -> Self {
        Self { is_map: true }
    }

    /// Single-element `changes` channel.
    pub fn scalar() -> Self {
        Self { is_map: false }
    }
}

impl Transform for AddChanges {
    fn name(&self) -> &'static str {
        "add-changes"
    }

    fn contract(&mut self, upstream: &ObsSpace, _level: &LevelEnv) -> Result<ObsSpace, StageError> {
        let heat = require(self.name(), upstream, "heatmap")?;
        let n = heat.size() as f32;
        let shape: &[usize] = if self.is_map { heat.shape.as_slice() } else { &[1] };
        let changes = BoxSpace::new(heat.low * n, heat.high * n, shape);
        let mut space = upstream.clone();
        space.insert("changes", changes);
        Ok(space)
    }

    fn observe(&mut self, _level: &LevelEnv, obs: &mut Observation) {
        let Some(heat) = obs.get("heatmap") else {
            return;
        };
        let total = heat.sum();
        let out = if self.is_map {
            Array::full(heat.shape(), total)
        } else {
            Array::full(&[1], total)
        };
        obs.insert("changes", out);
    }
}

/// Append `visits`: how often each cell has been the focus this episode.
///
/// Sized from the level's extent, so it stays aligned with the level even
/// when `map` has been cropped upstream. The focus is counted on reset and
/// after every non-terminal step. Without a focus, the cell addressed by
/// the last action is counted instead.
#[derive(Clone, Debug, Default)]
pub struct VisitedMap {
    width: usize,
    height: usize,
    visits: Vec<u32>,
}

impl VisitedMap {
    /// A fresh visit counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Visit counts, row-major.
    pub fn visits(&self) -> &[u32] {
        &self.visits
    }

    fn write(&self, obs: &mut Observation) {
        let data = self.visits.iter().map(|&v| v as f32).collect();
        if let Ok(arr) = Array::new(&[self.height, self.width], data) {
            obs.insert("visits", arr);
        }
    }
}

impl Transform for VisitedMap {
    fn name(&self) -> &'static str {
        "visited-map"
    }

    fn contract(&mut self, upstream: &ObsSpace, level: &LevelEnv) -> Result<ObsSpace, StageError> {
        require(self.name(), upstream, "map")?;
        self.width = level.width();
        self.height = level.height();
        self.visits = vec![0; self.width * self.height];
        let high = (level.max_iterations() + 1) as f32;
        let mut space = upstream.clone();
        space.insert("visits", BoxSpace::new(0.0, high, &[self.height, self.width]));
        Ok(space)
    }

    fn observe(&mut self, _level: &LevelEnv, obs: &mut Observation) {
        self.write(obs);
    }

    fn on_reset(&mut self, level: &LevelEnv, obs: &mut Observation) {
        self.visits.iter_mut().for_each(|v| *v = 0);
        if let Some(v) = level
            .focus()
            .and_then(|p| level.grid().index_of(p))
            .and_then(|i| self.visits.get_mut(i))
        {
            *v += 1;
        }
        self.write(obs);
    }

    fn on_step(&mut self, level: &LevelEnv, transition: &mut Transition) {
        if !transition.done {
            let at = level.focus().or(level.last_target());
            if let Some(v) = at
                .and_then(|p| level.grid().index_of(p))
                .and_then(|i| self.visits.get_mut(i))
            {
                *v += 1;
            }
        }
        self.write(&mut transition.obs);
    }
}
