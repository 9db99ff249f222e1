//! Collapsing stages: named channels to one array.
//!
//! [`ToImage`] and [`ToFlat`] implement [`TensorEnv`] rather than
//! [`Env`], so nothing that expects named channels can be stacked on top
//! of them.

use tilegym_core::{Action, ActionSpace, Array, BoxSpace, ObsSpace, Observation, Transition};
use tilegym_env::{Env, EnvError, LevelEnv};

use crate::error::StageError;
use crate::stage::require;

/// An environment whose observation is a single array.
pub trait TensorEnv {
    /// Start a new episode.
    fn reset(&mut self) -> Result<Array, EnvError>;

    /// Apply one action.
    fn step(&mut self, action: &Action) -> Result<Transition<Array>, EnvError>;

    /// Shape and range of the observation.
    fn observation_space(&self) -> &BoxSpace;

    /// Actions currently accepted.
    fn action_space(&self) -> ActionSpace;

    /// The underlying edit environment.
    fn level(&self) -> &LevelEnv;

    /// The underlying edit environment, mutably.
    fn level_mut(&mut self) -> &mut LevelEnv;
}

fn bounds<'a>(spaces: impl Iterator<Item = &'a BoxSpace>) -> (f32, f32) {
    spaces.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), s| {
        (lo.min(s.low), hi.max(s.high))
    })
}

fn check_names(stage: &'static str, names: &[String]) -> Result<(), StageError> {
    if names.is_empty() {
        Err(StageError::invalid(stage, "no channels to collapse"))
    } else {
        Ok(())
    }
}

/// Stack spatial channels into one `(h, w, depth)` image.
///
/// Every channel must share the same `(h, w)`. 2D channels add one layer;
/// 3D channels add their trailing axis.
pub struct ToImage<E> {
    inner: E,
    names: Vec<String>,
    depths: Vec<usize>,
    extent: (usize, usize),
    space: BoxSpace,
}

impl<E: Env> ToImage<E> {
    /// Collapse `names`, in order.
    pub fn new<S: Into<String>>(
        mut inner: E,
        names: impl IntoIterator<Item = S>,
    ) -> Result<Self, StageError> {
        const STAGE: &str = "to-image";
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        check_names(STAGE, &names)?;
        let upstream = inner.observation_space();

        let mut extent = None;
        let mut depths = Vec::with_capacity(names.len());
        let mut spaces = Vec::with_capacity(names.len());
        for name in &names {
            let s = require(STAGE, upstream, name)?;
            let (h, w) = s.spatial_extent().ok_or_else(|| StageError::NotSpatial {
                stage: STAGE,
                channel: name.clone(),
                shape: s.shape.to_vec(),
            })?;
            match extent {
                None => extent = Some((h, w)),
                Some((eh, ew)) if (eh, ew) != (h, w) => {
                    return Err(StageError::ShapeMismatch {
                        stage: STAGE,
                        channel: name.clone(),
                        expected: vec![eh, ew],
                        got: s.shape.to_vec(),
                    })
                }
                Some(_) => {}
            }
            depths.push(s.cell_depth().max(1));
            spaces.push(s);
        }
        let (h, w) = extent.unwrap_or((0, 0));
        let (low, high) = bounds(spaces.into_iter());
        let depth: usize = depths.iter().sum();
        inner.level_mut().freeze_contract();
        Ok(Self {
            space: BoxSpace::new(low, high, &[h, w, depth]),
            inner,
            names,
            depths,
            extent: (h, w),
        })
    }

    fn collapse(&self, obs: &Observation) -> Array {
        let (h, w) = self.extent;
        let depth: usize = self.depths.iter().sum();
        let mut out = Array::zeros(&[h, w, depth]);
        let data = out.data_mut();
        let mut layer = 0;
        for (name, &d) in self.names.iter().zip(&self.depths) {
            if let Some(src) = obs.get(name) {
                for (cell, chunk) in src.data().chunks(d).enumerate().take(h * w) {
                    let at = cell * depth + layer;
                    data[at..at + chunk.len()].copy_from_slice(chunk);
                }
            }
            layer += d;
        }
        out
    }

    /// The wrapped environment.
    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: Env> TensorEnv for ToImage<E> {
    fn reset(&mut self) -> Result<Array, EnvError> {
        let obs = self.inner.reset()?;
        Ok(self.collapse(&obs))
    }

    fn step(&mut self, action: &Action) -> Result<Transition<Array>, EnvError> {
        let t = self.inner.step(action)?;
        Ok(t.map_obs(|obs| self.collapse(&obs)))
    }

    fn observation_space(&self) -> &BoxSpace {
        &self.space
    }

    fn action_space(&self) -> ActionSpace {
        self.inner.action_space()
    }

    fn level(&self) -> &LevelEnv {
        self.inner.level()
    }

    fn level_mut(&mut self) -> &mut LevelEnv {
        self.inner.level_mut()
    }
}

/// Concatenate channels, each flattened row-major, into one vector.
pub struct ToFlat<E> {
    inner: E,
    names: Vec<String>,
    space: BoxSpace,
}

impl<E: Env> ToFlat<E> {
    /// Collapse `names`, in order.
    pub fn new<S: Into<String>>(
        mut inner: E,
        names: impl IntoIterator<Item = S>,
    ) -> Result<Self, StageError> {
        const STAGE: &str = "to-flat";
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        check_names(STAGE, &names)?;
        let upstream: &ObsSpace = inner.observation_space();
        let spaces = names
            .iter()
            .map(|n| require(STAGE, upstream, n))
            .collect::<Result<Vec<_>, _>>()?;
        let len = spaces.iter().map(|s| s.size()).sum::<usize>();
        let (low, high) = bounds(spaces.into_iter());
        inner.level_mut().freeze_contract();
        Ok(Self {
            space: BoxSpace::new(low, high, &[len]),
            inner,
            names,
        })
    }

    fn collapse(&self, obs: &Observation) -> Array {
        let mut data = Vec::with_capacity(self.space.size());
        for name in &self.names {
            if let Some(src) = obs.get(name) {
                data.extend_from_slice(src.data());
            }
        }
        data.resize(self.space.size(), 0.0);
        Array::new(&[data.len()], data).unwrap_or_else(|_| Array::zeros(&[0]))
    }

    /// The wrapped environment.
    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: Env> TensorEnv for ToFlat<E> {
    fn reset(&mut self) -> Result<Array, EnvError> {
        let obs = self.inner.reset()?;
        Ok(self.collapse(&obs))
    }

    fn step(&mut self, action: &Action) -> Result<Transition<Array>, EnvError> {
        let t = self.inner.step(action)?;
        Ok(t.map_obs(|obs| self.collapse(&obs)))
    }

    fn observation_space(&self) -> &BoxSpace {
        &self.space
    }

    fn action_space(&self) -> ActionSpace {
        self.inner.action_space()
    }

    fn level(&self) -> &LevelEnv {
        self.inner.level()
    }

    fn level_mut(&mut self) -> &mut LevelEnv {
        self.inner.level_mut()
    }
}
