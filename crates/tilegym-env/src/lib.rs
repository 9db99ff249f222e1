//! Level-editing environments for tilegym.
//!
//! [`LevelEnv`] is the edit state machine: it owns a [`TileGrid`](tilegym_core::TileGrid),
//! applies one edit per step through its representation, and asks its
//! [`Problem`](tilegym_problem::Problem) for stats, reward and termination.
//! [`PlayEnv`] adds a second phase in which a player walks the designed
//! level. Both implement [`Env`], the contract every observation stage
//! wraps.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod env;
pub mod error;
pub mod level;
pub mod play;
mod representation;

pub use config::{LevelConfig, LevelParams, DEFAULT_CHANGE_PERCENTAGE};
pub use env::Env;
pub use error::{ConfigError, EnvError};
pub use level::LevelEnv;
pub use play::{Agent, PlayEnv};
pub use representation::RepresentationKind;
