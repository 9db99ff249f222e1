//! Single-source shortest paths over passable tiles.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use tilegym_core::{Pos, TileGrid, TileId};

use crate::edge::neighbours4;
use crate::region::{label_regions, region_seeds};
use crate::PassMask;

/// Distance sentinel for cells not reachable from the source.
pub const UNREACHABLE: u32 = u32::MAX;

/// Distances and predecessors from one source cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistanceMap {
    width: usize,
    dist: Vec<u32>,
    prev: Vec<Option<usize>>,
}

impl DistanceMap {
    fn unreachable(grid: &TileGrid) -> Self {
        Self {
            width: grid.width(),
            dist: vec![UNREACHABLE; grid.cell_count()],
            prev: vec![None; grid.cell_count()],
        }
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        let i = pos.y.checked_mul(self.width)? + pos.x;
        (pos.x < self.width && i < self.dist.len()).then_some(i)
    }

    /// Distance to `pos`, `None` if unreachable or out of bounds.
    pub fn distance(&self, pos: Pos) -> Option<u32> {
        self.index(pos)
            .map(|i| self.dist[i])
            .filter(|&d| d != UNREACHABLE)
    }

    /// Row-major distances with [`UNREACHABLE`] for unreached cells.
    pub fn distances(&self) -> &[u32] {
        &self.dist
    }

    /// Number of reachable cells, source included.
    pub fn reachable_count(&self) -> usize {
        self.dist.iter().filter(|&&d| d != UNREACHABLE).count()
    }

    /// The first reachable cell (row-major) at maximum distance.
    pub fn farthest(&self) -> Option<(Pos, u32)> {
        let mut best: Option<(usize, u32)> = None;
        for (i, &d) in self.dist.iter().enumerate() {
            if d != UNREACHABLE && best.is_none_or(|(_, b)| d > b) {
                best = Some((i, d));
            }
        }
        best.map(|(i, d)| (Pos::new(i % self.width, i / self.width), d))
    }

    /// Cells from the source to `pos` inclusive, `None` if unreachable.
    pub fn path_to(&self, pos: Pos) -> Option<Vec<Pos>> {
        self.distance(pos)?;
        let mut i = self.index(pos)?;
        let mut path = vec![pos];
        while let Some(p) = self.prev[i] {
            path.push(Pos::new(p % self.width, p / self.width));
            i = p;
        }
        path.reverse();
        Some(path)
    }
}

/// Breadth-first distances from `source` over cells whose kind is passable.
///
/// Every step costs 1. A source outside the grid or on an impassable cell
/// yields a map with no reachable cells.
pub fn shortest_path(source: Pos, grid: &TileGrid, passable: &[TileId]) -> DistanceMap {
    let mask = PassMask::new(passable);
    let mut out = DistanceMap::unreachable(grid);
    let Some(start) = grid.index_of(source) else {
        return out;
    };
    if !mask.allows(grid.cells()[start]) {
        return out;
    }

    let mut queue = VecDeque::new();
    out.dist[start] = 0;
    queue.push_back(start);
    while let Some(i) = queue.pop_front() {
        let d = out.dist[i];
        for n in neighbours4(grid, grid.pos_of(i)) {
            let ni = n.y * grid.width() + n.x;
            if out.dist[ni] == UNREACHABLE && mask.allows(grid.cells()[ni]) {
                out.dist[ni] = d + 1;
                out.prev[ni] = Some(i);
                queue.push_back(ni);
            }
        }
    }
    out
}

/// Dijkstra distances from `source` with a per-kind step cost.
///
/// `cost(kind)` is the price of entering a cell of that kind; `None` marks it
/// impassable. The source itself must be passable.
pub fn weighted_shortest_path(
    source: Pos,
    grid: &TileGrid,
    cost: impl Fn(TileId) -> Option<u32>,
) -> DistanceMap {
    let mut out = DistanceMap::unreachable(grid);
    let Some(start) = grid.index_of(source) else {
        return out;
    };
    if cost(grid.cells()[start]).is_none() {
        return out;
    }

    let mut heap = BinaryHeap::new();
    out.dist[start] = 0;
    heap.push(Reverse((0u32, start)));
    while let Some(Reverse((d, i))) = heap.pop() {
        if d > out.dist[i] {
            continue;
        }
        for n in neighbours4(grid, grid.pos_of(i)) {
            let ni = n.y * grid.width() + n.x;
            let Some(step) = cost(grid.cells()[ni]) else {
                continue;
            };
            let nd = d.saturating_add(step);
            if nd < out.dist[ni] {
                out.dist[ni] = nd;
                out.prev[ni] = Some(i);
                heap.push(Reverse((nd, ni)));
            }
        }
    }
    out
}

/// Longest shortest path found in any passable region.
///
/// Per region: BFS from its first cell, then BFS again from the farthest cell
/// reached, keeping the largest distance. Exact on trees, a lower bound on
/// graphs with cycles.
pub fn longest_shortest_path(grid: &TileGrid, passable: &[TileId]) -> u32 {
    let labels = label_regions(grid, passable);
    region_seeds(grid, &labels)
        .into_iter()
        .filter_map(|seed| {
            let (far, _) = shortest_path(seed, grid, passable).farthest()?;
            shortest_path(far, grid, passable)
                .farthest()
                .map(|(_, d)| d)
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const E: TileId = TileId(0);
    const S: TileId = TileId(1);

    fn grid(rows: &[&[u8]]) -> TileGrid {
        let h = rows.len();
        let w = rows[0].len();
        let cells = rows.iter().flat_map(|r| r.iter().map(|&v| TileId(v))).collect();
        TileGrid::from_cells(w, h, cells).unwrap()
    }

    #[test]
    fn open_grid_distance_is_manhattan() {
        let g = TileGrid::filled(6, 4, E).unwrap();
        let d = shortest_path(Pos::new(1, 1), &g, &[E]);
        assert_eq!(d.distance(Pos::new(1, 1)), Some(0));
        assert_eq!(d.distance(Pos::new(5, 3)), Some(6));
        assert_eq!(d.reachable_count(), 24);
    }

    #[test]
    fn walls_force_detour() {
        let g = grid(&[
            &[0, 1, 0],
            &[0, 1, 0],
            &[0, 0, 0],
        ]);
        let d = shortest_path(Pos::new(0, 0), &g, &[E]);
        assert_eq!(d.distance(Pos::new(2, 0)), Some(6));
        let path = d.path_to(Pos::new(2, 0)).unwrap();
        assert_eq!(path.len(), 7);
        assert_eq!(path[0], Pos::new(0, 0));
        assert_eq!(path[6], Pos::new(2, 0));
        for w in path.windows(2) {
            assert_eq!(w[0].manhattan(w[1]), 1);
        }
    }

    #[test]
    fn unreachable_cells_report_none() {
        let g = grid(&[&[0, 1, 0]]);
        let d = shortest_path(Pos::new(0, 0), &g, &[E]);
        assert_eq!(d.distance(Pos::new(2, 0)), None);
        assert_eq!(d.distances()[2], UNREACHABLE);
        assert_eq!(d.path_to(Pos::new(2, 0)), None);
    }

    #[test]
    fn impassable_source_reaches_nothing() {
        let g = grid(&[&[1, 0, 0]]);
        let d = shortest_path(Pos::new(0, 0), &g, &[E]);
        assert_eq!(d.reachable_count(), 0);
        assert_eq!(d.distance(Pos::new(0, 0)), None);
    }

    #[test]
    fn out_of_bounds_source_reaches_nothing() {
        let g = TileGrid::filled(2, 2, E).unwrap();
        let d = shortest_path(Pos::new(5, 0), &g, &[E]);
        assert_eq!(d.reachable_count(), 0);
        assert_eq!(d.distance(Pos::new(9, 9)), None);
    }

    #[test]
    fn weighted_prefers_cheap_detour() {
        // Kind 2 costs 10, so going around it (4 extra steps) is cheaper.
        let g = grid(&[
            &[0, 2, 0],
            &[0, 0, 0],
        ]);
        let cost = |t: TileId| match t.0 {
            0 => Some(1),
            2 => Some(10),
            _ => None,
        };
        let d = weighted_shortest_path(Pos::new(0, 0), &g, cost);
        assert_eq!(d.distance(Pos::new(2, 0)), Some(4));
        assert_eq!(d.distance(Pos::new(1, 0)), Some(10));
    }

    #[test]
    fn weighted_with_unit_cost_matches_bfs() {
        let g = grid(&[
            &[0, 0, 1, 0],
            &[1, 0, 1, 0],
            &[0, 0, 0, 0],
        ]);
        let bfs = shortest_path(Pos::new(0, 0), &g, &[E]);
        let dij = weighted_shortest_path(Pos::new(0, 0), &g, |t| (t == E).then_some(1));
        assert_eq!(bfs.distances(), dij.distances());
    }

    #[test]
    fn longest_path_in_corridor() {
        let g = grid(&[
            &[0, 0, 0, 0, 0],
            &[1, 1, 1, 1, 0],
            &[0, 0, 0, 0, 0],
        ]);
        assert_eq!(longest_shortest_path(&g, &[E]), 10);
    }

    #[test]
    fn longest_path_takes_best_region() {
        let g = grid(&[&[0, 0, 1, 0, 0, 0, 0]]);
        assert_eq!(longest_shortest_path(&g, &[E]), 3);
        let solid = TileGrid::filled(3, 3, S).unwrap();
        assert_eq!(longest_shortest_path(&solid, &[E]), 0);
    }

    #[test]
    fn farthest_picks_first_maximum() {
        let g = TileGrid::filled(3, 1, E).unwrap();
        let d = shortest_path(Pos::new(1, 0), &g, &[E]);
        assert_eq!(d.farthest(), Some((Pos::new(0, 0), 1)));
    }

    // ── Property tests ──────────────────────────────────────────

    proptest! {
        #[test]
        fn open_grid_distances_are_manhattan(
            w in 1usize..12,
            h in 1usize..12,
            sx in 0usize..12,
            sy in 0usize..12,
        ) {
            let src = Pos::new(sx % w, sy % h);
            let g = TileGrid::filled(w, h, E).unwrap();
            let d = shortest_path(src, &g, &[E]);
            for (p, _) in g.iter() {
                prop_assert_eq!(d.distance(p), Some(src.manhattan(p) as u32));
            }
        }

        #[test]
        fn reconstructed_path_length_matches_distance(
            cells in proptest::collection::vec(prop_oneof![3 => Just(0u8), 1 => Just(1u8)], 64),
        ) {
            let g = TileGrid::from_cells(8, 8, cells.into_iter().map(TileId).collect()).unwrap();
            let d = shortest_path(Pos::new(0, 0), &g, &[E]);
            for (p, _) in g.iter() {
                if let Some(dist) = d.distance(p) {
                    let path = d.path_to(p).unwrap();
                    prop_assert_eq!(path.len() as u32, dist + 1);
                }
            }
        }
    }
}
