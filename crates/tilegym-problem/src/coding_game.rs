//! Key-and-door level: one player, one key, one door, all connected.

use tilegym_core::{Pos, Stats, TileCatalog, TileGrid, TileId};
use tilegym_space::{locate_tiles, region_count, shortest_path};

use crate::config::ProblemSettings;
use crate::error::ProblemError;
use crate::problem::Problem;
use crate::reward::RangeTarget;

/// Metric: number of player tiles.
pub const PLAYER: &str = "player";
/// Metric: number of key tiles.
pub const KEY: &str = "key";
/// Metric: number of door tiles.
pub const DOOR: &str = "door";
/// Metric: connected regions of walkable tiles.
pub const REGIONS: &str = "regions";
/// Metric: player → key → door walking distance.
pub const PATH_LENGTH: &str = "path-length";

/// The coding-game problem.
///
/// Tiles are `empty, solid, player, key, door`. A level is well formed when
/// each landmark appears once and the walkable tiles form one region; only
/// then is `path-length` measured, as the distance from the player to the key
/// plus the distance from the key to the door. The episode ends once that
/// distance reaches `target_path`.
#[derive(Clone, Debug)]
pub struct CodingGameProblem {
    catalog: TileCatalog,
    settings: ProblemSettings,
    empty: TileId,
    player: TileId,
    key: TileId,
    door: TileId,
}

impl CodingGameProblem {
    /// Registry name.
    pub const NAME: &'static str = "coding-game";

    /// A 14x14 problem with the default weights and `target_path = 8`.
    pub fn new() -> Result<Self, ProblemError> {
        let catalog = TileCatalog::new(["empty", "solid", "player", "key", "door"], "solid")?;
        let settings = ProblemSettings {
            width: 14,
            height: 14,
            probs: vec![0.5, 0.35, 0.05, 0.05, 0.05],
            target_path: 8,
            random_probs: true,
            weights: [
                (PLAYER, 3.0),
                (KEY, 3.0),
                (DOOR, 3.0),
                (REGIONS, 5.0),
                (PATH_LENGTH, 1.0),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        };
        Ok(Self {
            empty: catalog.require("empty")?,
            player: catalog.require("player")?,
            key: catalog.require("key")?,
            door: catalog.require("door")?,
            catalog,
            settings,
        })
    }

    /// Player → key over `{empty, key, player}`, then key → door over
    /// `{empty, player, key, door}`. `None` if either leg is unreachable.
    fn path_length(&self, grid: &TileGrid, player: Pos, key: Pos, door: Pos) -> Option<u32> {
        let to_key = shortest_path(player, grid, &[self.empty, self.key, self.player])
            .distance(key)?;
        let to_door = shortest_path(key, grid, &[self.empty, self.player, self.key, self.door])
            .distance(door)?;
        Some(to_key + to_door)
    }
}

impl Problem for CodingGameProblem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    fn settings(&self) -> &ProblemSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut ProblemSettings {
        &mut self.settings
    }

    fn compute_stats(&self, grid: &TileGrid) -> Stats {
        let found = locate_tiles(grid, &[self.player, self.key, self.door]);
        let players = &found[&self.player];
        let keys = &found[&self.key];
        let doors = &found[&self.door];
        let regions = region_count(grid, &[self.empty, self.player, self.key]);

        let mut path = 0;
        if let ([p], [k], [d], 1) = (players.as_slice(), keys.as_slice(), doors.as_slice(), regions) {
            path = self.path_length(grid, *p, *k, *d).unwrap_or(0);
        }

        let mut stats = Stats::new();
        stats.insert(PLAYER, players.len() as f64);
        stats.insert(KEY, keys.len() as f64);
        stats.insert(DOOR, doors.len() as f64);
        stats.insert(REGIONS, regions as f64);
        stats.insert(PATH_LENGTH, path as f64);
        stats
    }

    fn targets(&self) -> Vec<(&'static str, RangeTarget)> {
        vec![
            (PLAYER, RangeTarget::exactly(1.0)),
            (KEY, RangeTarget::exactly(1.0)),
            (DOOR, RangeTarget::exactly(1.0)),
            (REGIONS, RangeTarget::exactly(1.0)),
            (PATH_LENGTH, RangeTarget::unbounded()),
        ]
    }

    fn episode_over(&self, new: &Stats, _old: &Stats) -> bool {
        new.get(PATH_LENGTH) >= self.settings.target_path as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProblemParams;

    fn grid(rows: &[&str]) -> TileGrid {
        // '.' empty, '#' solid, 'P' player, 'K' key, 'D' door
        let h = rows.len();
        let w = rows[0].len();
        let cells = rows
            .iter()
            .flat_map(|r| {
                r.chars().map(|c| match c {
                    '#' => TileId(1),
                    'P' => TileId(2),
                    'K' => TileId(3),
                    'D' => TileId(4),
                    _ => TileId(0),
                })
            })
            .collect();
        TileGrid::from_cells(w, h, cells).unwrap()
    }

    #[test]
    fn well_formed_level_measures_both_legs() {
        let p = CodingGameProblem::new().unwrap();
        let g = grid(&[
            "P..K..D", //
            ".......",
        ]);
        let s = p.compute_stats(&g);
        assert_eq!(s.get(PLAYER), 1.0);
        assert_eq!(s.get(REGIONS), 1.0);
        assert_eq!(s.get(PATH_LENGTH), 6.0);
    }

    #[test]
    fn door_splits_walkable_regions() {
        // The key's only open neighbour is the door, which does not count
        // as walkable for region purposes.
        let p = CodingGameProblem::new().unwrap();
        let g = grid(&["P#K", ".#D", "..."]);
        let s = p.compute_stats(&g);
        assert_eq!(s.get(REGIONS), 2.0);
        assert_eq!(s.get(PATH_LENGTH), 0.0);
    }

    #[test]
    fn enclosed_door_degrades_path_to_zero() {
        let p = CodingGameProblem::new().unwrap();
        let g = grid(&[
            "P.K.#D", //
            "....##",
        ]);
        let s = p.compute_stats(&g);
        assert_eq!(s.get(REGIONS), 1.0);
        assert_eq!(s.get(PATH_LENGTH), 0.0);
    }

    #[test]
    fn duplicate_landmark_is_not_measured() {
        let p = CodingGameProblem::new().unwrap();
        let g = grid(&["P.K.D.K"]);
        let s = p.compute_stats(&g);
        assert_eq!(s.get(KEY), 2.0);
        assert_eq!(s.get(PATH_LENGTH), 0.0);
    }

    #[test]
    fn missing_landmarks_do_not_panic() {
        let p = CodingGameProblem::new().unwrap();
        let s = p.compute_stats(&grid(&["....", "####"]));
        assert_eq!(s.get(PLAYER), 0.0);
        assert_eq!(s.get(KEY), 0.0);
        assert_eq!(s.get(DOOR), 0.0);
        assert_eq!(s.get(PATH_LENGTH), 0.0);
        assert_eq!(p.reward(&s, &s), 0.0);
    }

    #[test]
    fn reward_weights_each_metric() {
        let p = CodingGameProblem::new().unwrap();
        let old: Stats = [
            (PLAYER, 0.0),
            (KEY, 1.0),
            (DOOR, 2.0),
            (REGIONS, 3.0),
            (PATH_LENGTH, 0.0),
        ]
        .into_iter()
        .collect();
        let new: Stats = [
            (PLAYER, 1.0),
            (KEY, 1.0),
            (DOOR, 1.0),
            (REGIONS, 1.0),
            (PATH_LENGTH, 5.0),
        ]
        .into_iter()
        .collect();
        // player +1*3, key 0, door +1*3, regions +2*5, path +5*1
        assert_eq!(p.reward(&new, &old), 3.0 + 3.0 + 10.0 + 5.0);
        assert_eq!(p.reward(&old, &new), -(3.0 + 3.0 + 10.0 + 5.0));
    }

    #[test]
    fn episode_over_at_target() {
        let mut p = CodingGameProblem::new().unwrap();
        let at = |v: f64| -> Stats { [(PATH_LENGTH, v)].into_iter().collect() };
        assert!(!p.episode_over(&at(7.0), &at(0.0)));
        assert!(p.episode_over(&at(8.0), &at(0.0)));
        p.adjust(&ProblemParams {
            target_path: Some(12),
            ..Default::default()
        })
        .unwrap();
        assert!(!p.episode_over(&at(8.0), &at(0.0)));
    }

    #[test]
    fn debug_info_projects_all_stats() {
        let p = CodingGameProblem::new().unwrap();
        let s = p.compute_stats(&grid(&["P.K.D"]));
        let info = p.debug_info(&s, &Stats::new());
        let keys: Vec<&str> = info.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, [PLAYER, KEY, DOOR, REGIONS, PATH_LENGTH]);
        assert_eq!(info.get(PATH_LENGTH), 4.0);
    }
}
