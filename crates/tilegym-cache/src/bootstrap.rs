//! The bootstrapping stage: seeds episodes from, and scores them against,
//! a [`LevelCache`].

use tilegym_core::{Action, ActionSpace, ObsSpace, Observation, Transition};
use tilegym_env::{Env, EnvError, LevelEnv};
use tracing::debug;

use crate::error::CacheError;
use crate::store::{LevelCache, Outcome, Start};

const STAGE: &str = "bootstrapping";

fn cache_err(e: CacheError) -> EnvError {
    EnvError::stage(STAGE, e)
}

/// Wraps an environment so that its episodes feed and draw on a
/// [`LevelCache`].
///
/// While the cache is filling, every reset stores the previous episode's
/// final level (the fresh level on the very first reset). Once it is full,
/// each reset either starts from a random level or from a uniformly chosen
/// slot, and the first terminal step of a slot-seeded or filling episode
/// is scored against that slot with the episode's cumulative reward.
///
/// Decisions draw on the edit environment's seeded RNG.
pub struct Bootstrapping<E> {
    inner: E,
    cache: LevelCache,
    total: f64,
    pending: bool,
    random_run: bool,
    started: bool,
    last_outcome: Option<Outcome>,
}

impl<E: Env> Bootstrapping<E> {
    /// Drive `cache` from `inner`'s episodes.
    pub fn new(inner: E, cache: LevelCache) -> Self {
        Self {
            inner,
            cache,
            total: 0.0,
            pending: false,
            random_run: false,
            started: false,
            last_outcome: None,
        }
    }

    /// The cache.
    pub fn cache(&self) -> &LevelCache {
        &self.cache
    }

    /// The wrapped environment.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Unwrap into the environment and the cache.
    pub fn into_parts(self) -> (E, LevelCache) {
        (self.inner, self.cache)
    }

    /// Whether this episode started from a random level and goes unscored.
    pub fn is_random_run(&self) -> bool {
        self.random_run
    }

    /// Reward accumulated this episode.
    pub fn total_reward(&self) -> f64 {
        self.total
    }

    /// The outcome recorded by the most recent scored episode.
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }
}

impl<E: Env> Env for Bootstrapping<E> {
    fn reset(&mut self) -> Result<Observation, EnvError> {
        self.total = 0.0;
        self.pending = true;
        self.random_run = false;

        let growing = !self.cache.is_full();
        let previous = (growing && self.started).then(|| self.inner.level().grid().clone());
        let start = self
            .cache
            .choose_start(self.inner.level_mut().rng_mut())
            .map_err(cache_err)?;
        match start {
            Start::Grow => {}
            Start::Random => self.random_run = true,
            Start::Seeded { grid, .. } => self.inner.level_mut().queue_initial_map(grid)?,
        }

        let obs = self.inner.reset()?;
        self.started = true;
        if growing {
            let map = previous.unwrap_or_else(|| self.inner.level().grid().clone());
            self.cache.store_next(&map).map_err(cache_err)?;
        }
        Ok(obs)
    }

    fn step(&mut self, action: &Action) -> Result<Transition, EnvError> {
        let t = self.inner.step(action)?;
        self.total += t.reward;
        if t.done && self.pending && !self.random_run {
            self.pending = false;
            let outcome = self
                .cache
                .record_outcome(self.total, self.inner.level().grid())
                .map_err(cache_err)?;
            debug!(?outcome, reward = self.total, "episode scored against cache");
            self.last_outcome = Some(outcome);
        }
        Ok(t)
    }

    fn observation_space(&self) -> &ObsSpace {
        self.inner.observation_space()
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
