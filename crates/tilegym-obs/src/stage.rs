//! The [`Transform`] trait and the [`Stage`] that applies one to an
//! inner environment.

use tilegym_core::{Action, ActionSpace, BoxSpace, ObsSpace, Observation, Transition};
use tilegym_env::{Env, EnvError, LevelEnv};

use crate::error::StageError;

/// One observation or action rewrite.
///
/// [`contract`](Self::contract) runs once, when the stage is built: it
/// checks the upstream channels the transform depends on and returns the
/// contract the stage exposes. Everything after that is infallible.
pub trait Transform {
    /// Stage name used in errors.
    fn name(&self) -> &'static str;

    /// Validate `upstream` and return this stage's observation contract.
    fn contract(&mut self, upstream: &ObsSpace, level: &LevelEnv) -> Result<ObsSpace, StageError>;

    /// Rewrite an observation. Called after every reset and step unless
    /// the hooks below are overridden.
    fn observe(&mut self, level: &LevelEnv, obs: &mut Observation);

    /// Hook after the inner reset.
    fn on_reset(&mut self, level: &LevelEnv, obs: &mut Observation) {
        self.observe(level, obs);
    }

    /// Hook after the inner step.
    fn on_step(&mut self, level: &LevelEnv, transition: &mut Transition) {
        self.observe(level, &mut transition.obs);
    }

    /// The action space exposed to the caller.
    fn action_space(&self, _level: &LevelEnv, inner: ActionSpace) -> ActionSpace {
        inner
    }

    /// Map a caller action to an inner action.
    fn translate(&self, _level: &LevelEnv, action: &Action) -> Result<Action, EnvError> {
        Ok(action.clone())
    }
}

/// An environment wrapped by one [`Transform`].
pub struct Stage<E, T> {
    inner: E,
    transform: T,
    space: ObsSpace,
}

impl<E: Env, T: Transform> Stage<E, T> {
    /// Wrap `inner`, validating the transform against its contract.
    ///
    /// The level's contract is frozen, so later `adjust_param` calls cannot
    /// resize what this stage was built against.
    pub fn new(mut inner: E, mut transform: T) -> Result<Self, StageError> {
        let space = transform.contract(inner.observation_space(), inner.level())?;
        inner.level_mut().freeze_contract();
        Ok(Self {
            inner,
            transform,
            space,
        })
    }

    /// The wrapped environment.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// The transform.
    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Unwrap the inner environment.
    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: Env, T: Transform> Env for Stage<E, T> {
    fn reset(&mut self) -> Result<Observation, EnvError> {
        let mut obs = self.inner.reset()?;
        self.transform.on_reset(self.inner.level(), &mut obs);
        Ok(obs)
    }

    fn step(&mut self, action: &Action) -> Result<Transition, EnvError> {
        let forwarded = self.transform.translate(self.inner.level(), action)?;
        let mut t = self.inner.step(&forwarded)?;
        self.transform.on_step(self.inner.level(), &mut t);
        Ok(t)
    }

    fn observation_space(&self) -> &ObsSpace {
        &self.space
    }

    fn action_space(&self) -> ActionSpace {
        self.transform
            .action_space(self.inner.level(), self.inner.action_space())
    }

    fn level(&self) -> &LevelEnv {
        self.inner.level()
    }

    fn level_mut(&mut self) -> &mut LevelEnv {
        self.inner.level_mut()
    }
}

// ── Contract helpers ────────────────────────────────────────────────

pub(crate) fn require<'a>(
    stage: &'static str,
    space: &'a ObsSpace,
    channel: &str,
) -> Result<&'a BoxSpace, StageError> {
    space
        .get(channel)
        .ok_or_else(|| StageError::missing(stage, channel))
}

pub(crate) fn require_2d<'a>(
    stage: &'static str,
    space: &'a ObsSpace,
    channel: &str,
) -> Result<&'a BoxSpace, StageError> {
    let s = require(stage, space, channel)?;
    if s.shape.len() != 2 {
        return Err(StageError::NotSpatial {
            stage,
            channel: channel.to_string(),
            shape: s.shape.to_vec(),
        });
    }
    Ok(s)
}

pub(crate) fn require_pos(stage: &'static str, space: &ObsSpace) -> Result<(), StageError> {
    let s = require(stage, space, "pos")?;
    if s.shape.as_slice() != [2] {
        return Err(StageError::ShapeMismatch {
            stage,
            channel: "pos".to_string(),
            expected: vec![2],
            got: s.shape.to_vec(),
        });
    }
    Ok(())
}
