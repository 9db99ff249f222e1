//! Integration test: full pipelines over live levels.

use tilegym_core::{Action, Pos};
use tilegym_env::{Env, LevelConfig, LevelEnv, LevelParams, RepresentationKind};
use tilegym_obs::{cropped_image, flat, PipelineBuilder, PipelineOptions, StageError, TensorEnv};
use tilegym_problem::ProblemParams;
use tilegym_test_utils::{scenario_a, ScriptedEnv};

fn level(rep: RepresentationKind) -> LevelEnv {
    LevelEnv::from_name(
        "coding-game",
        LevelConfig {
            representation: rep,
            seed: 21,
            params: LevelParams {
                problem: ProblemParams {
                    target_path: Some(40),
                    ..Default::default()
                },
                ..Default::default()
            },
        },
    )
    .unwrap()
}

#[test]
fn cropped_turtle_episode_stays_in_contract() {
    let mut env = cropped_image(level(RepresentationKind::Turtle), 28, PipelineOptions::default())
        .unwrap();
    let space = env.observation_space().clone();
    assert_eq!(space.shape.as_slice(), &[28, 28, 8]);
    assert!(space.contains(&env.reset().unwrap()));

    // Walk east placing solid tiles; the focus stays at the crop centre.
    for i in 0..30 {
        let action = if i % 2 == 0 { 0 } else { 4 + 1 };
        let t = env.step(&Action::Discrete(action)).unwrap();
        assert!(space.contains(&t.obs));
        let focus = env.level().focus().unwrap();
        let solid_layer = t.obs.get(&[14, 14, 1]).unwrap();
        let expected = env.level().grid().get(focus).map(|k| k.index() == 1);
        assert_eq!(Some(solid_layer == 1.0), expected);
        if t.done {
            break;
        }
    }
}

#[test]
fn scenario_a_cropped_at_player() {
    let mut lvl = level(RepresentationKind::Narrow);
    lvl.queue_initial_map(scenario_a()).unwrap();
    let mut env = PipelineBuilder::new(lvl)
        .crop("map", 5, 1.0)
        .unwrap()
        .build();

    // No-op steps walk the narrow focus row-major onto the player.
    let player = Pos::new(2, 2);
    let mut obs = env.reset().unwrap();
    for _ in 0..196 {
        if env.level().focus() == Some(player) {
            break;
        }
        obs = env.step(&Action::Discrete(0)).unwrap().obs;
    }
    assert_eq!(env.level().focus(), Some(player));
    let map = obs.get("map").unwrap();
    assert_eq!(map.shape(), &[5, 5]);
    assert_eq!(map.get(&[2, 2]), Some(2.0));
    assert_eq!(map.get(&[0, 0]), Some(1.0));
    assert_eq!(map.get(&[2, 0]), Some(1.0));
    assert_eq!(map.get(&[2, 1]), Some(0.0));
}

#[test]
fn misordered_pipeline_fails_at_build() {
    let err = PipelineBuilder::new(level(RepresentationKind::Narrow))
        .normalize("changes")
        .err()
        .unwrap();
    assert_eq!(
        err,
        StageError::MissingChannel {
            stage: "normalize",
            channel: "changes".into()
        }
    );
}

#[test]
fn late_reward_over_scripted_episode() {
    let mut scripted = ScriptedEnv::narrow("binary", 4);
    scripted.push_episode(0.25, 4);
    let mut env = PipelineBuilder::new(scripted)
        .late_reward()
        .unwrap()
        .build();
    env.reset().unwrap();
    let rewards: Vec<f64> = (0..4)
        .map(|_| env.step(&Action::Discrete(0)).unwrap().reward)
        .collect();
    assert_eq!(rewards, [0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn flat_wide_has_no_pos() {
    let mut env = flat(level(RepresentationKind::Wide), PipelineOptions::default()).unwrap();
    let n = env.observation_space().size();
    assert_eq!(n, 196 * 5 + 196 + 1 + 196);
    assert_eq!(env.reset().unwrap().len(), n);
}
