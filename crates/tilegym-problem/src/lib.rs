//! Level-scoring problems for tilegym.
//!
//! A [`Problem`] turns a tile grid into a [`Stats`](tilegym_core::Stats)
//! record and a pair of records into a shaped reward and a termination
//! decision. Rewards are weighted sums of per-metric [`range_reward`]s.
//!
//! Problems are a closed set selected by name through [`make_problem`]:
//!
//! | Name | Type | Metrics |
//! |------|------|---------|
//! | `coding-game` | [`CodingGameProblem`] | player, key, door, regions, path-length |
//! | `binary` | [`BinaryProblem`] | regions, path-length |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod binary;
pub mod coding_game;
pub mod config;
pub mod error;
pub mod problem;
pub mod registry;
pub mod reward;

pub use binary::BinaryProblem;
pub use coding_game::CodingGameProblem;
pub use config::{ProblemParams, ProblemSettings};
pub use error::ProblemError;
pub use problem::Problem;
pub use registry::{make_problem, ProblemKind};
pub use reward::{range_reward, RangeTarget};
