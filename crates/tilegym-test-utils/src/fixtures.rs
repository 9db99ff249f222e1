//! Environment fixtures for pipeline and cache tests.

use std::collections::VecDeque;

use tilegym_core::{Action, ActionSpace, ObsSpace, Observation, Transition};
use tilegym_env::{Env, EnvError, LevelConfig, LevelEnv, RepresentationKind};

/// A live [`LevelEnv`] whose reward and `done` come from a script.
///
/// Each step pops the next `(reward, done)` pair; once the script runs
/// out, steps report `(0.0, false)`. The grid still changes as the
/// action dictates, so stages that read the level see real state.
pub struct ScriptedEnv {
    inner: LevelEnv,
    script: VecDeque<(f64, bool)>,
    pub resets: usize,
    pub steps: usize,
}

impl ScriptedEnv {
    pub fn new(inner: LevelEnv) -> Self {
        Self {
            inner,
            script: VecDeque::new(),
            resets: 0,
            steps: 0,
        }
    }

    /// A wide-representation coding-game level with the given seed.
    pub fn coding(seed: u64) -> Self {
        Self::new(Self::level("coding-game", RepresentationKind::Wide, seed))
    }

    /// A narrow-representation level for `problem`.
    pub fn narrow(problem: &str, seed: u64) -> Self {
        Self::new(Self::level(problem, RepresentationKind::Narrow, seed))
    }

    fn level(problem: &str, representation: RepresentationKind, seed: u64) -> LevelEnv {
        LevelEnv::from_name(
            problem,
            LevelConfig {
                representation,
                seed,
                ..Default::default()
            },
        )
        .unwrap()
    }

    /// Append `(reward, done)` pairs to the script.
    pub fn push(&mut self, outcomes: impl IntoIterator<Item = (f64, bool)>) -> &mut Self {
        self.script.extend(outcomes);
        self
    }

    /// Append one episode: `len - 1` non-terminal steps of `reward`, then
    /// a terminal step of `reward`.
    pub fn push_episode(&mut self, reward: f64, len: usize) -> &mut Self {
        for i in 0..len {
            self.script.push_back((reward, i + 1 == len));
        }
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Env for ScriptedEnv {
    fn reset(&mut self) -> Result<Observation, EnvError> {
        self.resets += 1;
        self.inner.reset()
    }

    fn step(&mut self, action: &Action) -> Result<Transition, EnvError> {
        self.steps += 1;
        let mut t = self.inner.step(action)?;
        let (reward, done) = self.script.pop_front().unwrap_or((0.0, false));
        t.reward = reward;
        t.done = done;
        Ok(t)
    }

    fn observation_space(&self) -> &ObsSpace {
        self.inner.observation_space()
    }

    fn action_space(&self) -> ActionSpace {
        self.inner.action_space()
    }

    fn level(&self) -> &LevelEnv {
        &self.inner
    }

    fn level_mut(&mut self) -> &mut LevelEnv {
        &mut self.inner
    }
}
