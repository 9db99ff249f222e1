//! Connectivity engine for tilegym grids.
//!
//! Pure functions over a [`TileGrid`](tilegym_core::TileGrid) and a set of
//! passable tile kinds: connected-region counting, single-source shortest
//! paths (unweighted BFS and weighted Dijkstra), landmark lookup, and the
//! longest-shortest-path estimate used by maze-style problems.
//!
//! Adjacency is always 4-connected. Nothing here holds state between calls.
//!
//! ```
//! use tilegym_core::{Pos, TileGrid, TileId};
//! use tilegym_space::{region_count, shortest_path};
//!
//! let empty = TileId(0);
//! let grid = TileGrid::filled(4, 3, empty).unwrap();
//! assert_eq!(region_count(&grid, &[empty]), 1);
//! let dist = shortest_path(Pos::new(0, 0), &grid, &[empty]);
//! assert_eq!(dist.distance(Pos::new(3, 2)), Some(5));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod edge;
pub mod locate;
pub mod path;
pub mod region;

pub use edge::{neighbours4, step_pos, Direction, EdgeBehavior};
pub use locate::locate_tiles;
pub use path::{
    longest_shortest_path, shortest_path, weighted_shortest_path, DistanceMap, UNREACHABLE,
};
pub use region::{label_regions, region_count, RegionLabels};

use tilegym_core::TileId;

/// Lookup table from tile id to passability.
#[derive(Clone)]
pub(crate) struct PassMask([bool; 256]);

impl PassMask {
    pub(crate) fn new(passable: &[TileId]) -> Self {
        let mut mask = [false; 256];
        for t in passable {
            mask[t.index()] = true;
        }
        Self(mask)
    }

    pub(crate) fn allows(&self, tile: TileId) -> bool {
        self.0[tile.index()]
    }
}
