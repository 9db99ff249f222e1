//! Test fixtures for tilegym development.
//!
//! Grid builders that read ASCII art, the two reference coding-game
//! layouts, and a [`ScriptedEnv`] whose reward and termination are fed
//! from a script instead of the scoring problem.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::ScriptedEnv;

use tilegym_core::{Pos, TileGrid, TileId};

pub const EMPTY: TileId = TileId(0);
pub const SOLID: TileId = TileId(1);
pub const PLAYER: TileId = TileId(2);
pub const KEY: TileId = TileId(3);
pub const DOOR: TileId = TileId(4);

/// Build a coding-game grid from rows of `.` (empty), `#` (solid),
/// `P` (player), `K` (key) and `D` (door).
///
/// # Panics
///
/// On ragged rows or unknown characters.
pub fn grid_from_rows(rows: &[&str]) -> TileGrid {
    let height = rows.len();
    let width = rows.first().map_or(0, |r| r.len());
    let mut cells = Vec::with_capacity(width * height);
    for row in rows {
        assert_eq!(row.len(), width, "ragged row {row:?}");
        for c in row.chars() {
            cells.push(match c {
                '.' => EMPTY,
                '#' => SOLID,
                'P' => PLAYER,
                'K' => KEY,
                'D' => DOOR,
                other => panic!("unknown tile character {other:?}"),
            });
        }
    }
    TileGrid::from_cells(width, height, cells).unwrap()
}

/// Build a binary grid from rows of `.` (empty) and `#` (solid).
pub fn binary_grid(rows: &[&str]) -> TileGrid {
    for row in rows {
        assert!(row.chars().all(|c| c == '.' || c == '#'), "binary row {row:?}");
    }
    grid_from_rows(rows)
}

/// 14×14 open room inside a solid ring: player (2, 2), key (7, 2),
/// door (10, 2). One region, path length 8.
pub fn scenario_a() -> TileGrid {
    let mut grid = TileGrid::filled(14, 14, EMPTY).unwrap();
    for i in 0..14 {
        for pos in [Pos::new(i, 0), Pos::new(i, 13), Pos::new(0, i), Pos::new(13, i)] {
            grid.set(pos, SOLID).unwrap();
        }
    }
    grid.set(Pos::new(2, 2), PLAYER).unwrap();
    grid.set(Pos::new(7, 2), KEY).unwrap();
    grid.set(Pos::new(10, 2), DOOR).unwrap();
    grid
}

/// Scenario A with a solid wall down column 7: player (2, 2) and
/// key (4, 5) on the west side, door (10, 5) on the east. Two regions,
/// path length 0.
pub fn scenario_b() -> TileGrid {
    let mut grid = scenario_a();
    grid.set(Pos::new(7, 2), EMPTY).unwrap();
    grid.set(Pos::new(10, 2), EMPTY).unwrap();
    for y in 0..14 {
        grid.set(Pos::new(7, y), SOLID).unwrap();
    }
    grid.set(Pos::new(4, 5), KEY).unwrap();
    grid.set(Pos::new(10, 5), DOOR).unwrap();
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_rows_become_cells() {
        let g = grid_from_rows(&["P.#", "KD."]);
        assert_eq!((g.width(), g.height()), (3, 2));
        assert_eq!(g.get(Pos::new(0, 0)), Some(PLAYER));
        assert_eq!(g.get(Pos::new(2, 0)), Some(SOLID));
        assert_eq!(g.get(Pos::new(1, 1)), Some(DOOR));
    }

    #[test]
    fn scenarios_have_one_of_each_landmark() {
        for g in [scenario_a(), scenario_b()] {
            assert_eq!(g.count(PLAYER), 1);
            assert_eq!(g.count(KEY), 1);
            assert_eq!(g.count(DOOR), 1);
        }
    }
}
