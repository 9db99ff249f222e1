//! tilegym: tile-grid level design as a reinforcement-learning environment.
//!
//! This is the facade crate that re-exports the public API of the tilegym
//! sub-crates. An agent edits a 2D tile map one action at a time; a
//! problem scores each edit from connectivity and path statistics and
//! decides when the level is finished.
//!
//! # Quick start
//!
//! ```rust
//! use tilegym::prelude::*;
//!
//! let level = LevelEnv::from_name("binary", LevelConfig::default()).unwrap();
//! let mut env = tilegym::obs::cropped_image(level, 28, PipelineOptions::default()).unwrap();
//! let obs = env.reset().unwrap();
//! assert_eq!(obs.shape(), &[28, 28, 4]);
//! assert!(env.observation_space().contains(&obs));
//!
//! let t = env.step(&Action::Discrete(1)).unwrap();
//! assert!(t.reward.is_finite());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tilegym-core` | grids, catalogs, stats, actions, observations |
//! | [`space`] | `tilegym-space` | regions, shortest paths, landmarks |
//! | [`problem`] | `tilegym-problem` | stats, reward and termination per problem |
//! | [`env`] | `tilegym-env` | the edit state machine and the design-then-play extension |
//! | [`obs`] | `tilegym-obs` | observation and action stages, standard pipelines |
//! | [`cache`] | `tilegym-cache` | the bootstrapping level cache |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Grids, tile catalogs, stats, actions and observations (`tilegym-core`).
pub use tilegym_core as types;

/// Connectivity engine (`tilegym-space`).
///
/// [`space::region_count`] and [`space::shortest_path`] are the
/// building blocks every problem's stats use.
pub use tilegym_space as space;

/// Problems: stats, reward and termination (`tilegym-problem`).
pub use tilegym_problem as problem;

/// Environments (`tilegym-env`).
///
/// [`env::LevelEnv`] for editing, [`env::PlayEnv`] for design-then-play.
pub use tilegym_env as env;

/// Observation pipelines (`tilegym-obs`).
pub use tilegym_obs as obs;

/// The bootstrapping level cache (`tilegym-cache`).
pub use tilegym_cache as cache;

/// Common imports.
///
/// ```rust
/// use tilegym::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use tilegym_core::{
        Action, ActionSpace, Array, BoxSpace, Info, ObsSpace, Observation, Pos, Stats,
        TileCatalog, TileGrid, TileId, Transition,
    };

    // Problems
    pub use tilegym_problem::{make_problem, Problem, ProblemKind, ProblemParams};

    // Environments
    pub use tilegym_env::{
        Agent, Env, EnvError, LevelConfig, LevelEnv, LevelParams, PlayEnv, RepresentationKind,
    };

    // Observation
    pub use tilegym_obs::{PipelineBuilder, PipelineOptions, StageError, TensorEnv};

    // Cache
    pub use tilegym_cache::{Bootstrapping, CacheError, LevelCache};
}
