//! Connected-region labelling.

use std::collections::VecDeque;

use tilegym_core::{Pos, TileGrid, TileId};

use crate::edge::neighbours4;
use crate::PassMask;

/// Per-cell region labels for one grid and passable set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionLabels {
    labels: Vec<Option<u32>>,
    sizes: Vec<usize>,
}

impl RegionLabels {
    /// Number of regions.
    pub fn count(&self) -> usize {
        self.sizes.len()
    }

    /// Region of a row-major cell index, `None` for impassable cells.
    pub fn label(&self, index: usize) -> Option<u32> {
        self.labels.get(index).copied().flatten()
    }

    /// Cell count of each region, in label order.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }
}

/// Label each maximal 4-connected component of passable cells.
///
/// Labels are assigned in row-major order of each region's first cell.
pub fn label_regions(grid: &TileGrid, passable: &[TileId]) -> RegionLabels {
    let mask = PassMask::new(passable);
    let cells = grid.cells();
    let mut labels: Vec<Option<u32>> = vec![None; cells.len()];
    let mut sizes = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..cells.len() {
        if labels[start].is_some() || !mask.allows(cells[start]) {
            continue;
        }
        let label = sizes.len() as u32;
        let mut size = 0;
        labels[start] = Some(label);
        queue.push_back(start);
        while let Some(i) = queue.pop_front() {
            size += 1;
            for n in neighbours4(grid, grid.pos_of(i)) {
                let ni = n.y * grid.width() + n.x;
                if labels[ni].is_none() && mask.allows(cells[ni]) {
                    labels[ni] = Some(label);
                    queue.push_back(ni);
                }
            }
        }
        sizes.push(size);
    }

    RegionLabels { labels, sizes }
}

/// Number of 4-connected components of cells whose kind is in `passable`.
pub fn region_count(grid: &TileGrid, passable: &[TileId]) -> usize {
    label_regions(grid, passable).count()
}

/// First cell, in row-major order, of every region.
pub(crate) fn region_seeds(grid: &TileGrid, labels: &RegionLabels) -> Vec<Pos> {
    let mut seeds = Vec::with_capacity(labels.count());
    let mut next = 0u32;
    for i in 0..grid.cell_count() {
        if labels.label(i) == Some(next) {
            seeds.push(grid.pos_of(i));
            next += 1;
        }
    }
    seeds
}
