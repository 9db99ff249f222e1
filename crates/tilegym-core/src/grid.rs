//! Tile grids: the mutable level map every environment edits.

use std::fmt;

use crate::catalog::TileCatalog;
use crate::error::GridError;

/// Index of a tile kind within a [`TileCatalog`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileId(pub u8);

impl TileId {
    /// The catalog index as a `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for TileId {
    fn from(v: u8) -> Self {
        Self(v)
    }
}

/// A cell coordinate: `x` is the column, `y` the row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    /// Column.
    pub x: usize,
    /// Row.
    pub y: usize,
}

impl Pos {
    /// Create a coordinate.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Offset by a signed displacement, returning `None` below zero.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let x = self.x.checked_add_signed(dx as isize)?;
        let y = self.y.checked_add_signed(dy as isize)?;
        Some(Self { x, y })
    }

    /// Manhattan distance to `other`.
    pub fn manhattan(self, other: Pos) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A fixed-size 2D grid of tile ids, stored row-major.
///
/// Cell `(x, y)` lives at index `y * width + x`. The extent never changes
/// after construction; edits go through [`set`](Self::set).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<TileId>,
}

impl TileGrid {
    /// A grid with every cell set to `tile`.
    pub fn filled(width: usize, height: usize, tile: TileId) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyExtent { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![tile; width * height],
        })
    }

    /// A grid over an existing row-major cell buffer.
    pub fn from_cells(width: usize, height: usize, cells: Vec<TileId>) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyExtent { width, height });
        }
        if cells.len() != width * height {
            return Err(GridError::CellCountMismatch {
                expected: width * height,
                got: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Whether a signed coordinate lies inside the grid.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Row-major index of `pos`, or `None` if out of bounds.
    pub fn index_of(&self, pos: Pos) -> Option<usize> {
        (pos.x < self.width && pos.y < self.height).then(|| pos.y * self.width + pos.x)
    }

    /// Coordinate of a row-major index. The index must be in range.
    pub fn pos_of(&self, index: usize) -> Pos {
        Pos::new(index % self.width, index / self.width)
    }

    /// The tile at `pos`, or `None` if out of bounds.
    pub fn get(&self, pos: Pos) -> Option<TileId> {
        self.index_of(pos).map(|i| self.cells[i])
    }

    /// Overwrite the tile at `pos`, returning the previous value.
    pub fn set(&mut self, pos: Pos, tile: TileId) -> Result<TileId, GridError> {
        let i = self.index_of(pos).ok_or(GridError::OutOfBounds {
            pos,
            width: self.width,
            height: self.height,
        })?;
        Ok(std::mem::replace(&mut self.cells[i], tile))
    }

    /// Row-major cell slice.
    pub fn cells(&self) -> &[TileId] {
        &self.cells
    }

    /// Iterate `(pos, tile)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Pos, TileId)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &t)| (self.pos_of(i), t))
    }

    /// Number of cells holding `tile`.
    pub fn count(&self, tile: TileId) -> usize {
        self.cells.iter().filter(|&&t| t == tile).count()
    }

    /// Check that every cell names a kind defined by `catalog`.
    pub fn check_catalog(&self, catalog: &TileCatalog) -> Result<(), GridError> {
        match self.cells.iter().find(|t| !catalog.contains(**t)) {
            Some(&tile) => Err(GridError::UnknownTile {
                tile,
                kinds: catalog.len(),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            for (i, t) in row.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{t}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
