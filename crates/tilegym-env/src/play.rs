//! Design-then-play: a designer edits the level, then a player walks it.

use tilegym_core::{
    Action, ActionSpace, Info, ObsSpace, Observation, Pos, TileGrid, TileId, Transition,
};
use tilegym_space::{locate_tiles, Direction};
use tracing::debug;

use crate::env::Env;
use crate::error::{ConfigError, EnvError};
use crate::level::LevelEnv;

/// Starting cell when the level has no unique player tile.
pub const DEFAULT_START: Pos = Pos::new(3, 3);

/// Reward for the first step that reaches the goal in an episode.
pub const GOAL_REWARD: f64 = 1.0;

/// Which agent drives `step`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Agent {
    /// Edits the level through the wrapped environment's representation.
    #[default]
    Designer = 0,
    /// Moves the player tile.
    Player = 1,
}

impl Agent {
    /// Numeric id reported in step info.
    pub fn id(self) -> i64 {
        self as i64
    }
}

#[derive(Clone, Copy, Debug)]
struct Roles {
    empty: TileId,
    solid: TileId,
    player: TileId,
    goal: TileId,
}

/// Two-phase wrapper around a [`LevelEnv`].
///
/// The caller flips phases with [`set_active_agent`](Self::set_active_agent);
/// the environment only reports, through the `playable` info flag, whether
/// the current design supports play. Play steps never end the episode.
pub struct PlayEnv {
    level: LevelEnv,
    roles: Roles,
    active_agent: Agent,
    target_agent: Agent,
    player_pos: Option<Pos>,
    reward_granted: bool,
}

impl PlayEnv {
    /// Wrap `level`. Its catalog must name `empty`, `solid`, `player` and
    /// `key` tiles.
    pub fn new(level: LevelEnv) -> Result<Self, ConfigError> {
        let catalog = level.catalog();
        let roles = Roles {
            empty: catalog.require("empty")?,
            solid: catalog.require("solid")?,
            player: catalog.require("player")?,
            goal: catalog.require("key")?,
        };
        Ok(Self {
            level,
            roles,
            active_agent: Agent::Designer,
            target_agent: Agent::Designer,
            player_pos: None,
            reward_granted: false,
        })
    }

    /// The agent whose actions `step` interprets.
    pub fn active_agent(&self) -> Agent {
        self.active_agent
    }

    /// Switch the acting agent. The player is located afresh on the next
    /// play step.
    pub fn set_active_agent(&mut self, agent: Agent) {
        self.active_agent = agent;
        self.player_pos = None;
    }

    /// The agent reported as `trg_agent` when the design is playable.
    pub fn target_agent(&self) -> Agent {
        self.target_agent
    }

    /// Set the agent reported as `trg_agent`.
    pub fn set_target_agent(&mut self, agent: Agent) {
        self.target_agent = agent;
    }

    /// The player's position, once known. Cleared by designer steps.
    pub fn player_pos(&self) -> Option<Pos> {
        self.player_pos
    }

    /// Whether the goal reward was already paid this episode.
    pub fn reward_granted(&self) -> bool {
        self.reward_granted
    }

    /// Keep the current level as the starting level of the next episode.
    pub fn set_map(&mut self) -> Result<(), EnvError> {
        let grid = self.level.grid().clone();
        self.level.queue_initial_map(grid)?;
        Ok(())
    }

    /// Exactly one player and one connected region.
    pub fn is_playable(&self) -> bool {
        let stats = self.level.stats();
        stats.get("player") == 1.0 && stats.get("regions") == 1.0
    }

    fn locate_player(&mut self) -> Pos {
        if let Some(p) = self.player_pos {
            return p;
        }
        let grid = self.level.grid();
        let found = locate_tiles(grid, &[self.roles.player]);
        let start = match found.get(&self.roles.player).map(Vec::as_slice) {
            Some([only]) => *only,
            _ => Pos::new(
                DEFAULT_START.x.min(grid.width() - 1),
                DEFAULT_START.y.min(grid.height() - 1),
            ),
        };
        self.player_pos = Some(start);
        start
    }

    fn play(&mut self, action: &Action) -> Result<f64, EnvError> {
        let space = Self::player_action_space();
        let dir = match action.last().and_then(Direction::from_index) {
            Some(d) => d,
            None => {
                return Err(EnvError::InvalidAction {
                    action: action.clone(),
                    space,
                })
            }
        };

        let from = self.locate_player();
        let (dx, dy) = dir.offset();
        let grid = self.level.grid();
        let to = match from.offset(dx, dy) {
            Some(p) if p.x < grid.width() && p.y < grid.height() => p,
            _ => return Ok(0.0),
        };
        let tile = grid.get(to);
        if tile == Some(self.roles.solid) {
            return Ok(0.0);
        }

        let mut reward = 0.0;
        if tile == Some(self.roles.goal) && !self.reward_granted {
            self.reward_granted = true;
            reward = GOAL_REWARD;
            debug!(x = to.x, y = to.y, "player reached goal");
        }
        self.level.set_tile(from, self.roles.empty)?;
        self.level.set_tile(to, self.roles.player)?;
        self.player_pos = Some(to);
        Ok(reward)
    }

    /// Moves east, south, west, north.
    pub fn player_action_space() -> ActionSpace {
        ActionSpace::Discrete(Direction::ALL.len())
    }

    fn annotate(&self, info: &mut Info) {
        let playable = self.is_playable();
        info.insert("active_agent", self.active_agent.id());
        info.insert("playable", playable);
        if playable {
            info.insert("trg_agent", self.target_agent.id());
            info.insert("playable_map", self.level.grid().clone());
        }
    }

    /// A copy of the current level.
    pub fn snapshot(&self) -> TileGrid {
        self.level.grid().clone()
    }
}

impl Env for PlayEnv {
    fn reset(&mut self) -> Result<Observation, EnvError> {
        self.player_pos = None;
        self.reward_granted = false;
        self.level.reset()
    }

    fn step(&mut self, action: &Action) -> Result<Transition, EnvError> {
        let mut t = match self.active_agent {
            Agent::Designer => {
                let t = self.level.step(action)?;
                self.player_pos = None;
                t
            }
            Agent::Player => {
                let reward = self.play(action)?;
                let stats = self.level.stats();
                Transition {
                    obs: self.level.observation(),
                    reward,
                    done: false,
                    info: Info::from(&self.level.problem().debug_info(stats, stats)),
                }
            }
        };
        self.annotate(&mut t.info);
        Ok(t)
    }

    fn observation_space(&self) -> &ObsSpace {
        self.level.observation_space()
    }

    fn action_space(&self) -> ActionSpace {
        match self.active_agent {
            Agent::Designer => self.level.action_space(),
            Agent::Player => Self::player_action_space(),
        }
    }

    fn level(&self) -> &LevelEnv {
        &self.level
    }

    fn level_mut(&mut self) -> &mut LevelEnv {
        &mut self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LevelConfig;
    use crate::representation::RepresentationKind;
    use tilegym_core::InfoValue;

    const EMPTY: TileId = TileId(0);
    const SOLID: TileId = TileId(1);
    const PLAYER: TileId = TileId(2);
    const KEY: TileId = TileId(3);

    fn env_with(cells: &[(usize, usize, TileId)]) -> PlayEnv {
        let level = LevelEnv::from_name(
            "coding-game",
            LevelConfig {
                representation: RepresentationKind::Wide,
                ..Default::default()
            },
        )
        .unwrap();
        let mut env = PlayEnv::new(level).unwrap();
        let mut grid = TileGrid::filled(14, 14, EMPTY).unwrap();
        for &(x, y, t) in cells {
            grid.set(Pos::new(x, y), t).unwrap();
        }
        env.level_mut().queue_initial_map(grid).unwrap();
        env.reset().unwrap();
        env.set_active_agent(Agent::Player);
        env
    }

    #[test]
    fn binary_catalog_cannot_play() {
        let level = LevelEnv::from_name("binary", LevelConfig::default()).unwrap();
        assert!(matches!(PlayEnv::new(level), Err(ConfigError::Catalog(_))));
    }

    #[test]
    fn player_moves_and_leaves_empty_behind() {
        let mut env = env_with(&[(5, 5, PLAYER)]);
        let t = env.step(&Action::Discrete(0)).unwrap();
        assert_eq!(env.player_pos(), Some(Pos::new(6, 5)));
        assert_eq!(env.level().grid().get(Pos::new(5, 5)), Some(EMPTY));
        assert_eq!(env.level().grid().get(Pos::new(6, 5)), Some(PLAYER));
        assert_eq!(t.reward, 0.0);
        assert!(!t.done);
        assert_eq!(env.level().changes(), 0);
    }

    #[test]
    fn solid_and_edges_block() {
        let mut env = env_with(&[(0, 0, PLAYER), (1, 0, SOLID)]);
        env.step(&Action::Discrete(2)).unwrap();
        env.step(&Action::Discrete(3)).unwrap();
        env.step(&Action::Discrete(0)).unwrap();
        assert_eq!(env.player_pos(), Some(Pos::new(0, 0)));
        env.step(&Action::Discrete(1)).unwrap();
        assert_eq!(env.player_pos(), Some(Pos::new(0, 1)));
    }

    #[test]
    fn goal_rewards_once_per_episode() {
        let mut env = env_with(&[(2, 2, PLAYER), (3, 2, KEY)]);
        assert_eq!(env.step(&Action::Discrete(0)).unwrap().reward, 1.0);
        assert!(env.reward_granted());
        env.step(&Action::Discrete(2)).unwrap();
        assert_eq!(env.step(&Action::Discrete(0)).unwrap().reward, 0.0);

        env.reset().unwrap();
        assert!(!env.reward_granted());
        assert_eq!(env.player_pos(), None);
    }

    #[test]
    fn missing_player_starts_at_default() {
        let mut env = env_with(&[]);
        env.step(&Action::Discrete(1)).unwrap();
        assert_eq!(env.player_pos(), Some(Pos::new(3, 4)));
        assert_eq!(env.level().grid().get(Pos::new(3, 4)), Some(PLAYER));
    }

    #[test]
    fn player_action_space_depends_on_agent() {
        let mut env = env_with(&[]);
        assert_eq!(env.action_space(), ActionSpace::Discrete(4));
        assert!(env.step(&Action::Discrete(4)).is_err());
        env.set_active_agent(Agent::Designer);
        assert_eq!(env.action_space().size(), 14 * 14 * 5);
    }

    #[test]
    fn info_reports_playability() {
        let mut env = env_with(&[(2, 2, PLAYER)]);
        env.set_target_agent(Agent::Player);
        let t = env.step(&Action::Discrete(0)).unwrap();
        assert_eq!(t.info.get("playable"), Some(&InfoValue::Bool(true)));
        assert_eq!(t.info.get("active_agent"), Some(&InfoValue::Int(1)));
        assert_eq!(t.info.get("trg_agent"), Some(&InfoValue::Int(1)));
        let map = t.info.get("playable_map").and_then(InfoValue::as_grid).unwrap();
        assert_eq!(map, env.level().grid());

        let mut split = env_with(&[(2, 2, PLAYER), (1, 0, SOLID), (0, 1, SOLID)]);
        let t = split.step(&Action::Discrete(0)).unwrap();
        assert_eq!(t.info.get("playable"), Some(&InfoValue::Bool(false)));
        assert!(!t.info.contains("playable_map"));
    }

    #[test]
    fn designer_edits_relocate_player() {
        let mut env = env_with(&[(5, 5, PLAYER)]);
        env.step(&Action::Discrete(0)).unwrap();
        assert_eq!(env.player_pos(), Some(Pos::new(6, 5)));

        env.set_active_agent(Agent::Designer);
        env.step(&Action::multi(&[6, 5, 0])).unwrap();
        env.step(&Action::multi(&[10, 10, 2])).unwrap();
        assert_eq!(env.player_pos(), None);

        env.set_active_agent(Agent::Player);
        env.step(&Action::Discrete(0)).unwrap();
        let grid = env.level().grid();
        assert_eq!(env.player_pos(), Some(Pos::new(11, 10)));
        assert_eq!(grid.count(PLAYER), 1);
        assert_eq!(grid.get(Pos::new(10, 10)), Some(EMPTY));
        assert_eq!(grid.get(Pos::new(7, 5)), Some(EMPTY));
    }

    #[test]
    fn set_map_restores_design_once() {
        let mut env = env_with(&[(4, 4, PLAYER)]);
        env.set_active_agent(Agent::Designer);
        env.step(&Action::multi(&[7, 7, 3])).unwrap();
        let designed = env.snapshot();
        env.set_map().unwrap();
        env.reset().unwrap();
        assert_eq!(env.level().grid(), &designed);
        env.reset().unwrap();
        assert_ne!(env.level().grid(), &designed);
    }
}
