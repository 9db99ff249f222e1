//! Random-action rollouts over a cached, cropped binary level.
//!
//! ```text
//! RUST_LOG=debug cargo run -p tilegym --example rollout
//! ```

use std::error::Error;

use rand::Rng;
use tilegym::prelude::*;
use tracing::info;

const EPISODES: usize = 20;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let dir = tempfile::tempdir()?;

    let level = LevelEnv::from_name(
        "binary",
        LevelConfig {
            seed: 7,
            ..Default::default()
        },
    )?;
    let cache = LevelCache::builder().dir(dir.path()).capacity(8).open()?;
    let bootstrapped = Bootstrapping::new(level, cache);
    let mut env = tilegym::obs::cropped_image(bootstrapped, 28, PipelineOptions::default())?;

    let n = match env.action_space() {
        ActionSpace::Discrete(n) => n,
        other => return Err(format!("unexpected action space {other:?}").into()),
    };
    for episode in 0..EPISODES {
        env.reset()?;
        let mut total = 0.0;
        let mut steps = 0;
        loop {
            let a = env.level_mut().rng_mut().random_range(0..n);
            let t = env.step(&Action::Discrete(a))?;
            total += t.reward;
            steps += 1;
            if t.done {
                break;
            }
        }
        let stats = env.level().stats();
        info!(
            episode,
            steps,
            reward = total,
            regions = stats.get("regions"),
            path_length = stats.get("path-length"),
            "episode finished"
        );
    }
    Ok(())
}
