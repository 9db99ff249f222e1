//! The reset/step contract shared by environments and pipeline stages.

use tilegym_core::{Action, ActionSpace, ObsSpace, Observation, Transition};

use crate::error::EnvError;
use crate::level::LevelEnv;

/// A steppable environment with a declared observation contract.
///
/// Every stage of an observation pipeline implements this trait by holding
/// exactly one inner `Env`. The innermost environment is always a
/// [`LevelEnv`], reachable through [`level`](Self::level) so stages can
/// query the grid, focus, and RNG without forwarding ad-hoc calls.
pub trait Env {
    /// Start a new episode.
    fn reset(&mut self) -> Result<Observation, EnvError>;

    /// Apply one action.
    fn step(&mut self, action: &Action) -> Result<Transition, EnvError>;

    /// Channels this environment produces, with shape and range.
    fn observation_space(&self) -> &ObsSpace;

    /// Actions this environment currently accepts.
    fn action_space(&self) -> ActionSpace;

    /// The underlying edit environment.
    fn level(&self) -> &LevelEnv;

    /// The underlying edit environment, mutably.
    fn level_mut(&mut self) -> &mut LevelEnv;
}

impl<E: Env + ?Sized> Env for Box<E> {
    fn reset(&mut self) -> Result<Observation, EnvError> {
        (**self).reset()
    }

    fn step(&mut self, action: &Action) -> Result<Transition, EnvError> {
        (**self).step(action)
    }

    fn observation_space(&self) -> &ObsSpace {
        (**self).observation_space()
    }

    fn action_space(&self) -> ActionSpace {
        (**self).action_space()
    }

    fn level(&self) -> &LevelEnv {
        (**self).level()
    }

    fn level_mut(&mut self) -> &mut LevelEnv {
        (**self).level_mut()
    }
}
