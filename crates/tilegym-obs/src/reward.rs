//! Reward shaping stages.

use tilegym_core::{ObsSpace, Observation, Transition};
use tilegym_env::LevelEnv;

use crate::error::StageError;
use crate::stage::Transform;

/// Withhold reward until the episode ends, then pay the episode total.
#[derive(Clone, Debug, Default)]
pub struct LateReward {
    total: f64,
}

impl LateReward {
    /// A fresh accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reward accumulated so far this episode.
    pub fn total(&self) -> f64 {
        self.total
    }
}

impl Transform for LateReward {
    fn name(&self) -> &'static str {
        "late-reward"
    }

    fn contract(&mut self, upstream: &ObsSpace, _level: &LevelEnv) -> Result<ObsSpace, StageError> {
        Ok(upstream.clone())
    }

    fn observe(&mut self, _level: &LevelEnv, _obs: &mut Observation) {}

    fn on_reset(&mut self, _level: &LevelEnv, _obs: &mut Observation) {
        self.total = 0.0;
    }

    fn on_step(&mut self, _level: &LevelEnv, transition: &mut Transition) {
        self.total += transition.reward;
        transition.reward = if transition.done { self.total } else { 0.0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilegym_core::Action;
    use tilegym_env::Env;
    use tilegym_test_utils::ScriptedEnv;

    use crate::stage::Stage;

    #[test]
    fn pays_total_on_done() {
        let mut scripted = ScriptedEnv::coding(2);
        scripted.push([(1.0, false), (-0.5, false), (2.0, true), (4.0, true)]);
        let mut stage = Stage::new(scripted, LateReward::new()).unwrap();
        stage.reset().unwrap();
        let a = Action::multi(&[0, 0, 0]);
        let rewards: Vec<f64> = (0..3).map(|_| stage.step(&a).unwrap().reward).collect();
        assert_eq!(rewards, [0.0, 0.0, 2.5]);

        stage.reset().unwrap();
        assert_eq!(stage.transform().total(), 0.0);
        assert_eq!(stage.step(&a).unwrap().reward, 4.0);
    }
}
