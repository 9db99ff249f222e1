//! In-place channel rewrites: normalize, invert, one-hot.

use smallvec::SmallVec;
use tilegym_core::{Array, BoxSpace, ObsSpace, Observation};
use tilegym_env::LevelEnv;

use crate::error::StageError;
use crate::stage::{require, Transform};

/// Map a channel from its declared `[low, high]` onto `[0, 1]`.
///
/// Values outside the declared range are clamped. A degenerate range
/// (`low == high`) maps everything to 0.
#[derive(Clone, Debug)]
pub struct Normalize {
    channel: String,
    low: f32,
    high: f32,
}

impl Normalize {
    /// Normalize `channel`.
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            low: 0.0,
            high: 0.0,
        }
    }
}

impl Transform for Normalize {
    fn name(&self) -> &'static str {
        "normalize"
    }

    fn contract(&mut self, upstream: &ObsSpace, _level: &LevelEnv) -> Result<ObsSpace, StageError> {
        let src = require(self.name(), upstream, &self.channel)?;
        self.low = src.low;
        self.high = src.high;
        let mut space = upstream.clone();
        space.insert(self.channel.clone(), BoxSpace::new(0.0, 1.0, &src.shape));
        Ok(space)
    }

    fn observe(&mut self, _level: &LevelEnv, obs: &mut Observation) {
        let (low, high) = (self.low, self.high);
        if let Some(arr) = obs.get_mut(&self.channel) {
            if high > low {
                arr.map_inplace(|v| ((v - low) / (high - low)).clamp(0.0, 1.0));
            } else {
                arr.map_inplace(|_| 0.0);
            }
        }
    }
}

/// Reflect a channel within its declared range: `v ↦ high - v + low`.
#[derive(Clone, Debug)]
pub struct Inverse {
    channel: String,
    low: f32,
    high: f32,
}

impl Inverse {
    /// Invert `channel`.
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            low: 0.0,
            high: 0.0,
        }
    }
}

impl Transform for Inverse {
    fn name(&self) -> &'static str {
        "inverse"
    }

    fn contract(&mut self, upstream: &ObsSpace, _level: &LevelEnv) -> Result<ObsSpace, StageError> {
        let src = require(self.name(), upstream, &self.channel)?;
        self.low = src.low;
        self.high = src.high;
        Ok(upstream.clone())
    }

    fn observe(&mut self, _level: &LevelEnv, obs: &mut Observation) {
        let (low, high) = (self.low, self.high);
        if let Some(arr) = obs.get_mut(&self.channel) {
            arr.map_inplace(|v| high - v + low);
        }
    }
}

/// Expand an integer channel with range `[min, max]` into a trailing
/// one-hot axis of size `max - min + 1`.
#[derive(Clone, Debug)]
pub struct OneHot {
    channel: String,
    min: f32,
    depth: usize,
}

impl OneHot {
    /// One-hot encode `channel`.
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            min: 0.0,
            depth: 0,
        }
    }

    /// Width of the trailing axis, once built.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Transform for OneHot {
    fn name(&self) -> &'static str {
        "one-hot"
    }

    fn contract(&mut self, upstream: &ObsSpace, _level: &LevelEnv) -> Result<ObsSpace, StageError> {
        let src = require(self.name(), upstream, &self.channel)?;
        let span = src.high - src.low;
        if !span.is_finite() || span < 0.0 || span.fract() != 0.0 {
            return Err(StageError::invalid(
                self.name(),
                format!(
                    "channel '{}' range [{}, {}] is not an integer range",
                    self.channel, src.low, src.high
                ),
            ));
        }
        self.min = src.low;
        self.depth = span as usize + 1;
        let mut shape: SmallVec<[usize; 4]> = src.shape.clone();
        shape.push(self.depth);
        let mut space = upstream.clone();
        space.insert(self.channel.clone(), BoxSpace::new(0.0, 1.0, &shape));
        Ok(space)
    }

    fn observe(&mut self, _level: &LevelEnv, obs: &mut Observation) {
        let Some(src) = obs.get(&self.channel) else {
            return;
        };
        let depth = self.depth;
        let mut shape: SmallVec<[usize; 4]> = SmallVec::from_slice(src.shape());
        shape.push(depth);
        let mut out = Array::zeros(&shape);
        let data = out.data_mut();
        for (i, v) in src.data().iter().enumerate() {
            let k = (v - self.min).round();
            if k >= 0.0 && (k as usize) < depth {
                data[i * depth + k as usize] = 1.0;
            }
        }
        obs.insert(self.channel.clone(), out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tilegym_core::{Pos, TileGrid, TileId};
    use tilegym_env::{Env, LevelConfig, RepresentationKind};

    use crate::stage::Stage;

    fn level(problem: &str) -> LevelEnv {
        LevelEnv::from_name(
            problem,
            LevelConfig {
                representation: RepresentationKind::Wide,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn normalize_heatmap_declares_unit_range() {
        let stage = Stage::new(level("coding-game"), Normalize::new("heatmap")).unwrap();
        let s = stage.observation_space().get("heatmap").unwrap();
        assert_eq!((s.low, s.high), (0.0, 1.0));
        assert_eq!(s.shape.as_slice(), &[14, 14]);
    }

    #[test]
    fn normalize_scales_and_clamps() {
        let mut t = Normalize {
            channel: "x".into(),
            low: 2.0,
            high: 6.0,
        };
        let lvl = level("binary");
        let mut obs = Observation::new();
        obs.insert("x", Array::new(&[4], vec![2.0, 4.0, 6.0, 9.0]).unwrap());
        t.observe(&lvl, &mut obs);
        assert_eq!(obs.get("x").unwrap().data(), &[0.0, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn degenerate_range_normalizes_to_zero() {
        let mut t = Normalize {
            channel: "x".into(),
            low: 3.0,
            high: 3.0,
        };
        let lvl = level("binary");
        let mut obs = Observation::new();
        obs.insert("x", Array::full(&[2], 3.0));
        t.observe(&lvl, &mut obs);
        assert_eq!(obs.get("x").unwrap().data(), &[0.0, 0.0]);
    }

    #[test]
    fn missing_channel_fails_at_construction() {
        assert!(matches!(
            Stage::new(level("binary"), Normalize::new("visits")),
            Err(StageError::MissingChannel { stage: "normalize", .. })
        ));
        assert!(matches!(
            Stage::new(level("binary"), OneHot::new("changes")),
            Err(StageError::MissingChannel { .. })
        ));
    }

    #[test]
    fn inverse_reflects_map() {
        let mut stage = Stage::new(level("coding-game"), Inverse::new("map")).unwrap();
        let mut grid = TileGrid::filled(14, 14, TileId(0)).unwrap();
        grid.set(Pos::new(1, 0), TileId(4)).unwrap();
        stage.level_mut().queue_initial_map(grid).unwrap();
        let obs = stage.reset().unwrap();
        let map = obs.get("map").unwrap();
        assert_eq!(map.get(&[0, 0]), Some(4.0));
        assert_eq!(map.get(&[0, 1]), Some(0.0));
    }

    #[test]
    fn one_hot_map_adds_trailing_axis() {
        let mut stage = Stage::new(level("coding-game"), OneHot::new("map")).unwrap();
        assert_eq!(stage.transform().depth(), 5);
        assert_eq!(
            stage.observation_space().get("map").unwrap().shape.as_slice(),
            &[14, 14, 5]
        );
        let mut grid = TileGrid::filled(14, 14, TileId(1)).unwrap();
        grid.set(Pos::new(3, 2), TileId(3)).unwrap();
        stage.level_mut().queue_initial_map(grid).unwrap();
        let obs = stage.reset().unwrap();
        let map = obs.get("map").unwrap();
        assert_eq!(map.get(&[2, 3, 3]), Some(1.0));
        assert_eq!(map.get(&[2, 3, 1]), Some(0.0));
        assert_eq!(map.get(&[0, 0, 1]), Some(1.0));
    }

    #[test]
    fn one_hot_rejects_fractional_range() {
        let lvl = level("binary");
        let mut space = ObsSpace::new();
        space.insert("x", BoxSpace::new(0.0, 0.5, &[3]));
        assert!(matches!(
            OneHot::new("x").contract(&space, &lvl),
            Err(StageError::InvalidParameter { .. })
        ));
    }

    proptest! {
        #[test]
        fn one_hot_sums_to_one_per_cell(
            values in prop::collection::vec(-2i32..=3, 1..40),
        ) {
            let lvl = level("binary");
            let mut space = ObsSpace::new();
            space.insert("x", BoxSpace::new(-2.0, 3.0, &[values.len()]));
            let mut t = OneHot::new("x");
            t.contract(&space, &lvl).unwrap();

            let mut obs = Observation::new();
            let data = values.iter().map(|&v| v as f32).collect();
            obs.insert("x", Array::new(&[values.len()], data).unwrap());
            t.observe(&lvl, &mut obs);

            let out = obs.get("x").unwrap();
            prop_assert_eq!(out.shape(), &[values.len(), 6][..]);
            for (i, v) in values.iter().enumerate() {
                let row = &out.data()[i * 6..(i + 1) * 6];
                prop_assert_eq!(row.iter().sum::<f32>(), 1.0);
                prop_assert_eq!(row[(v + 2) as usize], 1.0);
            }
        }
    }
}
