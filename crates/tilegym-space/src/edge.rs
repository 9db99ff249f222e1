//! Cardinal moves and how they behave at the grid edge.

use smallvec::SmallVec;
use tilegym_core::{Pos, TileGrid};

/// How a move that leaves the grid is resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EdgeBehavior {
    /// The move is dropped.
    #[default]
    Absorb,
    /// The coordinate is clamped to the boundary cell.
    Clamp,
    /// The coordinate wraps to the opposite side.
    Wrap,
}

/// One of the four cardinal directions.
///
/// The discriminant order `East, South, West, North` is the move table used
/// by the player agent, so `Direction::ALL[i]` decodes move action `i`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    /// `x + 1`.
    East = 0,
    /// `y + 1`.
    South = 1,
    /// `x - 1`.
    West = 2,
    /// `y - 1`.
    North = 3,
}

impl Direction {
    /// All directions in move-index order.
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::North,
    ];

    /// Decode a move index.
    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    /// `(dx, dy)` for this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::North => (0, -1),
        }
    }
}

fn resolve_axis(val: i64, len: usize, edge: EdgeBehavior) -> Option<usize> {
    let n = len as i64;
    if (0..n).contains(&val) {
        return Some(val as usize);
    }
    match edge {
        EdgeBehavior::Absorb => None,
        EdgeBehavior::Clamp => Some(val.clamp(0, n - 1) as usize),
        EdgeBehavior::Wrap => Some(val.rem_euclid(n) as usize),
    }
}

/// Move `pos` one cell in `dir` inside a `width x height` grid.
pub fn step_pos(
    pos: Pos,
    dir: Direction,
    width: usize,
    height: usize,
    edge: EdgeBehavior,
) -> Option<Pos> {
    let (dx, dy) = dir.offset();
    let x = resolve_axis(pos.x as i64 + dx as i64, width, edge)?;
    let y = resolve_axis(pos.y as i64 + dy as i64, height, edge)?;
    Some(Pos::new(x, y))
}

/// In-bounds 4-neighbours of `pos`, in move-index order.
pub fn neighbours4(grid: &TileGrid, pos: Pos) -> SmallVec<[Pos; 4]> {
    Direction::ALL
        .iter()
        .filter_map(|&d| step_pos(pos, d, grid.width(), grid.height(), EdgeBehavior::Absorb))
        .collect()
}
