//! Landmark lookup.

use indexmap::IndexMap;
use tilegym_core::{Pos, TileGrid, TileId};

/// Every occurrence of each requested kind, in row-major order.
///
/// Each requested kind gets an entry, empty if it does not occur. Callers
/// check the list length before treating a kind as a unique landmark.
pub fn locate_tiles(grid: &TileGrid, kinds: &[TileId]) -> IndexMap<TileId, Vec<Pos>> {
    let mut out: IndexMap<TileId, Vec<Pos>> = kinds.iter().map(|&k| (k, Vec::new())).collect();
    for (pos, tile) in grid.iter() {
        if let Some(list) = out.get_mut(&tile) {
            list.push(pos);
        }
    }
    out
}
