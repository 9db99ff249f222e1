//! Core types for the tilegym level-design environments.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! data model shared by every other tilegym crate: tile grids and the
//! tile-kind catalog, stats records, named-channel observations with their
//! declared spaces, actions, and step transitions.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod catalog;
pub mod error;
pub mod grid;
pub mod info;
pub mod obs;
pub mod stats;

pub use action::{Action, ActionSpace};
pub use catalog::TileCatalog;
pub use error::{CatalogError, GridError, ShapeError};
pub use grid::{Pos, TileGrid, TileId};
pub use info::{Info, InfoValue, Transition};
pub use obs::{Array, BoxSpace, ObsSpace, Observation, Shape};
pub use stats::Stats;
