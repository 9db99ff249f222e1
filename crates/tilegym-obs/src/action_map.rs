//! Single-index actions over every `(cell, kind)` pair.

use tilegym_core::{Action, ActionSpace, ObsSpace, Observation, Pos, TileId};
use tilegym_env::{EnvError, LevelEnv};

use crate::error::StageError;
use crate::stage::{require, Transform};

/// Accept `Discrete(width × height × kinds)` and decode each index
/// row-major as `(y, x, kind)`.
///
/// For position-free representations the decoded triple becomes the edit.
/// For focus-following ones, the kind is placed only when the decoded cell
/// is the current focus; any other cell rewrites the focus with its
/// current kind, which changes nothing.
#[derive(Clone, Debug, Default)]
pub struct ActionMap;

impl ActionMap {
    /// The action-map stage.
    pub fn new() -> Self {
        Self
    }

    /// Decode `index` to `(x, y, kind)` for a `width × kinds` row stride.
    pub fn unravel(index: usize, width: usize, kinds: usize) -> (usize, usize, usize) {
        let kind = index % kinds;
        let x = (index / kinds) % width;
        let y = index / (kinds * width);
        (x, y, kind)
    }
}

impl Transform for ActionMap {
    fn name(&self) -> &'static str {
        "action-map"
    }

    fn contract(&mut self, upstream: &ObsSpace, _level: &LevelEnv) -> Result<ObsSpace, StageError> {
        require(self.name(), upstream, "map")?;
        Ok(upstream.clone())
    }

    fn observe(&mut self, _level: &LevelEnv, _obs: &mut Observation) {}

    fn action_space(&self, level: &LevelEnv, _inner: ActionSpace) -> ActionSpace {
        ActionSpace::Discrete(level.width() * level.height() * level.catalog().len())
    }

    fn translate(&self, level: &LevelEnv, action: &Action) -> Result<Action, EnvError> {
        let space = self.action_space(level, ActionSpace::Discrete(0));
        let index = match action {
            Action::Discrete(i) if space.contains(action) => *i,
            _ => {
                return Err(EnvError::InvalidAction {
                    action: action.clone(),
                    space,
                })
            }
        };
        let (x, y, kind) = Self::unravel(index, level.width(), level.catalog().len());
        let target = Pos::new(x, y);
        let kind = TileId(kind as u8);
        Ok(match level.focus() {
            None => level.placement(target, kind),
            Some(focus) if focus == target => level.placement(focus, kind),
            Some(focus) => {
                let current = level.grid().get(focus).unwrap_or(kind);
                level.placement(focus, current)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilegym_core::TileGrid;
    use tilegym_env::{Env, LevelConfig, RepresentationKind};

    use crate::stage::Stage;

    fn stage(rep: RepresentationKind) -> Stage<LevelEnv, ActionMap> {
        let mut level = LevelEnv::from_name(
            "coding-game",
            LevelConfig {
                representation: rep,
                ..Default::default()
            },
        )
        .unwrap();
        level
            .queue_initial_map(TileGrid::filled(14, 14, TileId(0)).unwrap())
            .unwrap();
        let mut s = Stage::new(level, ActionMap::new()).unwrap();
        s.reset().unwrap();
        s
    }

    fn index(x: usize, y: usize, kind: usize) -> usize {
        (y * 14 + x) * 5 + kind
    }

    #[test]
    fn unravel_is_row_major() {
        assert_eq!(ActionMap::unravel(0, 14, 5), (0, 0, 0));
        assert_eq!(ActionMap::unravel(index(3, 2, 4), 14, 5), (3, 2, 4));
        assert_eq!(ActionMap::unravel(14 * 14 * 5 - 1, 14, 5), (13, 13, 4));
    }

    #[test]
    fn wide_forwards_full_triple() {
        let mut s = stage(RepresentationKind::Wide);
        assert_eq!(s.action_space(), ActionSpace::Discrete(980));
        s.step(&Action::Discrete(index(6, 9, 3))).unwrap();
        assert_eq!(s.level().grid().get(Pos::new(6, 9)), Some(TileId(3)));
    }

    #[test]
    fn narrow_places_only_at_focus() {
        let mut s = stage(RepresentationKind::Narrow);
        let focus = s.level().focus().unwrap();
        let elsewhere = Pos::new((focus.x + 1) % 14, focus.y);
        s.step(&Action::Discrete(index(elsewhere.x, elsewhere.y, 1))).unwrap();
        assert_eq!(s.level().grid().count(TileId(1)), 0);
        assert_eq!(s.level().changes(), 0);

        let focus = s.level().focus().unwrap();
        s.step(&Action::Discrete(index(focus.x, focus.y, 2))).unwrap();
        assert_eq!(s.level().grid().get(focus), Some(TileId(2)));
    }

    #[test]
    fn turtle_places_at_focus_instead_of_moving() {
        let mut s = stage(RepresentationKind::Turtle);
        let focus = s.level().focus().unwrap();
        s.step(&Action::Discrete(index(focus.x, focus.y, 1))).unwrap();
        assert_eq!(s.level().grid().get(focus), Some(TileId(1)));
        assert_eq!(s.level().focus(), Some(focus));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut s = stage(RepresentationKind::Wide);
        assert!(matches!(
            s.step(&Action::Discrete(980)),
            Err(EnvError::InvalidAction { .. })
        ));
        assert!(s.step(&Action::multi(&[1, 1, 1])).is_err());
    }
}
