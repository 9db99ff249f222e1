//! Composable observation and action stages for tilegym environments.
//!
//! A pipeline is a chain of [`Stage`]s over a
//! [`LevelEnv`](tilegym_env::LevelEnv). Each stage holds exactly one inner
//! environment and applies one [`Transform`]: it rewrites a channel in
//! place, appends a derived channel, or rewrites actions and rewards.
//! Stages validate the channels they depend on when they are built, so a
//! misordered pipeline fails at construction with a [`StageError`].
//!
//! [`ToImage`] and [`ToFlat`] collapse the named channels into a single
//! array and implement [`TensorEnv`] instead of
//! [`Env`](tilegym_env::Env), which keeps them last in any pipeline.
//!
//! | Stage | Effect |
//! |-------|--------|
//! | [`Normalize`] | channel onto `[0, 1]`, clamped |
//! | [`Inverse`] | `v ↦ high - v + low` |
//! | [`OneHot`] | trailing one-hot axis |
//! | [`Cropped`] | focus-centred `S × S` window |
//! | [`PosImage`] | `pos` as a (Gaussian) window mask |
//! | [`AddChanges`] | `changes` = sum of `heatmap` |
//! | [`VisitedMap`] | `visits` = focus counts this episode |
//! | [`LateReward`] | reward paid at episode end |
//! | [`ActionMap`] | one index per `(cell, kind)` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action_map;
pub mod channel;
pub mod crop;
pub mod derive;
pub mod error;
pub mod pipeline;
pub mod position;
pub mod reward;
pub mod stage;
pub mod tensor;

pub use action_map::ActionMap;
pub use channel::{Inverse, Normalize, OneHot};
pub use crop::{crop_centered, Cropped};
pub use derive::{AddChanges, VisitedMap};
pub use error::StageError;
pub use pipeline::{
    action_map_image, cropped_image, flat, image, position_image, PipelineBuilder,
    PipelineOptions,
};
pub use position::PosImage;
pub use reward::LateReward;
pub use stage::{Stage, Transform};
pub use tensor::{TensorEnv, ToFlat, ToImage};
