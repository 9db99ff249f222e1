//! Error types for the core data model.

use std::error::Error;
use std::fmt;

use crate::grid::{Pos, TileId};

/// Errors from constructing or mutating a [`TileGrid`](crate::TileGrid).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    /// Width or height is zero.
    EmptyExtent {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
    /// The cell buffer length does not match `width * height`.
    CellCountMismatch {
        /// `width * height`.
        expected: usize,
        /// Length of the supplied buffer.
        got: usize,
    },
    /// A coordinate lies outside the grid.
    OutOfBounds {
        /// The offending coordinate.
        pos: Pos,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },
    /// A cell holds a tile id that the catalog does not define.
    UnknownTile {
        /// The offending tile id.
        tile: TileId,
        /// Number of kinds in the catalog.
        kinds: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyExtent { width, height } => {
                write!(f, "grid extent {width}x{height} must be non-empty")
            }
            Self::CellCountMismatch { expected, got } => {
                write!(f, "expected {expected} cells, got {got}")
            }
            Self::OutOfBounds { pos, width, height } => {
                write!(f, "{pos} is outside the {width}x{height} grid")
            }
            Self::UnknownTile { tile, kinds } => {
                write!(f, "tile {tile} is not in a catalog of {kinds} kinds")
            }
        }
    }
}

impl Error for GridError {}

/// Errors from building a [`TileCatalog`](crate::TileCatalog).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogError {
    /// No tile kinds were supplied.
    Empty,
    /// The same name was supplied twice.
    DuplicateName {
        /// The repeated name.
        name: String,
    },
    /// More kinds than a [`TileId`] can index.
    TooManyKinds {
        /// Number of kinds supplied.
        count: usize,
    },
    /// A name that the catalog does not define.
    UnknownName {
        /// The unknown name.
        name: String,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "tile catalog must define at least one kind"),
            Self::DuplicateName { name } => write!(f, "tile kind '{name}' defined twice"),
            Self::TooManyKinds { count } => {
                write!(f, "{count} tile kinds exceed the maximum of 256")
            }
            Self::UnknownName { name } => write!(f, "unknown tile kind '{name}'"),
        }
    }
}

impl Error for CatalogError {}

/// A flat buffer does not fit the declared array shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeError {
    /// Element count implied by the shape.
    pub expected: usize,
    /// Length of the supplied buffer.
    pub got: usize,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shape holds {} elements but buffer has {}",
            self.expected, self.got
        )
    }
}

impl Error for ShapeError {}
