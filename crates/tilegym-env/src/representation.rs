//! Edit representations: how an action becomes a tile change.
//!
//! - **narrow**: a focus walks the grid; `Discrete(0)` keeps the tile,
//!   `Discrete(k)` places kind `k - 1`, then the focus advances.
//! - **wide**: `Multi([x, y, kind])` places anywhere.
//! - **turtle**: `Discrete(0..4)` moves the focus (east, south, west,
//!   north); `Discrete(4 + k)` places kind `k` under it.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use smallvec::smallvec;
use tilegym_core::{Action, ActionSpace, Pos, TileGrid, TileId};
use tilegym_space::{step_pos, Direction, EdgeBehavior};

use crate::error::{ConfigError, EnvError};

/// Which edit representation an environment uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RepresentationKind {
    /// Sequential or random focus, one kind per step.
    #[default]
    Narrow,
    /// Free placement anywhere.
    Wide,
    /// A moving focus that can also place.
    Turtle,
}

impl RepresentationKind {
    /// Registry name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Narrow => "narrow",
            Self::Wide => "wide",
            Self::Turtle => "turtle",
        }
    }
}

impl fmt::Display for RepresentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RepresentationKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Narrow, Self::Wide, Self::Turtle]
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| ConfigError::UnknownRepresentation { name: s.to_string() })
    }
}

/// Per-episode representation state.
#[derive(Clone, Debug)]
pub(crate) enum Representation {
    Narrow { focus: Pos, random_tile: bool },
    Wide,
    Turtle { focus: Pos, edge: EdgeBehavior },
}

impl Representation {
    pub(crate) fn new(kind: RepresentationKind, random_tile: bool, warp: bool) -> Self {
        match kind {
            RepresentationKind::Narrow => Self::Narrow {
                focus: Pos::default(),
                random_tile,
            },
            RepresentationKind::Wide => Self::Wide,
            RepresentationKind::Turtle => Self::Turtle {
                focus: Pos::default(),
                edge: if warp {
                    EdgeBehavior::Wrap
                } else {
                    EdgeBehavior::Clamp
                },
            },
        }
    }

    pub(crate) fn kind(&self) -> RepresentationKind {
        match self {
            Self::Narrow { .. } => RepresentationKind::Narrow,
            Self::Wide => RepresentationKind::Wide,
            Self::Turtle { .. } => RepresentationKind::Turtle,
        }
    }

    pub(crate) fn set_options(&mut self, random_tile: Option<bool>, warp: Option<bool>) {
        match self {
            Self::Narrow { random_tile: r, .. } => {
                if let Some(v) = random_tile {
                    *r = v;
                }
            }
            Self::Turtle { edge, .. } => {
                if let Some(w) = warp {
                    *edge = if w { EdgeBehavior::Wrap } else { EdgeBehavior::Clamp };
                }
            }
            Self::Wide => {}
        }
    }

    /// Place the focus at a random cell.
    pub(crate) fn reset(&mut self, width: usize, height: usize, rng: &mut impl Rng) {
        match self {
            Self::Narrow { focus, .. } | Self::Turtle { focus, .. } => {
                *focus = Pos::new(rng.random_range(0..width), rng.random_range(0..height));
            }
            Self::Wide => {}
        }
    }

    pub(crate) fn focus(&self) -> Option<Pos> {
        match self {
            Self::Narrow { focus, .. } | Self::Turtle { focus, .. } => Some(*focus),
            Self::Wide => None,
        }
    }

    pub(crate) fn action_space(&self, width: usize, height: usize, kinds: usize) -> ActionSpace {
        match self {
            Self::Narrow { .. } => ActionSpace::Discrete(kinds + 1),
            Self::Wide => ActionSpace::MultiDiscrete(smallvec![width, height, kinds]),
            Self::Turtle { .. } => ActionSpace::Discrete(Direction::ALL.len() + kinds),
        }
    }

    /// The action that writes `kind` at `pos` (at the focus for
    /// focus-following representations).
    pub(crate) fn placement(&self, pos: Pos, kind: TileId) -> Action {
        match self {
            Self::Narrow { .. } => Action::Discrete(kind.index() + 1),
            Self::Wide => Action::multi(&[pos.x, pos.y, kind.index()]),
            Self::Turtle { .. } => Action::Discrete(Direction::ALL.len() + kind.index()),
        }
    }

    /// Apply an already-validated action. Returns the cell whose tile
    /// changed, if any.
    pub(crate) fn apply(
        &mut self,
        action: &Action,
        grid: &mut TileGrid,
        kinds: usize,
        rng: &mut impl Rng,
    ) -> Result<Option<Pos>, EnvError> {
        let (w, h) = (grid.width(), grid.height());
        match (self, action) {
            (Self::Narrow { focus, random_tile }, Action::Discrete(a)) => {
                let at = *focus;
                let changed = if *a > 0 {
                    write(grid, at, TileId((*a - 1) as u8))?
                } else {
                    None
                };
                *focus = if *random_tile {
                    Pos::new(rng.random_range(0..w), rng.random_range(0..h))
                } else {
                    let next = at.y * w + at.x + 1;
                    Pos::new(next % w, (next / w) % h)
                };
                Ok(changed)
            }
            (Self::Wide, Action::Multi(v)) if v.len() == 3 => {
                write(grid, Pos::new(v[0], v[1]), TileId(v[2] as u8))
            }
            (Self::Turtle { focus, edge }, Action::Discrete(a)) => {
                if let Some(dir) = Direction::from_index(*a) {
                    if let Some(next) = step_pos(*focus, dir, w, h, *edge) {
                        *focus = next;
                    }
                    Ok(None)
                } else {
                    write(grid, *focus, TileId((*a - Direction::ALL.len()) as u8))
                }
            }
            (rep, action) => Err(EnvError::InvalidAction {
                action: action.clone(),
                space: rep.action_space(w, h, kinds),
            }),
        }
    }
}

fn write(grid: &mut TileGrid, pos: Pos, tile: TileId) -> Result<Option<Pos>, EnvError> {
    let old = grid.set(pos, tile)?;
    Ok((old != tile).then_some(pos))
}
