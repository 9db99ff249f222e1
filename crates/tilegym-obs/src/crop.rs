//! Focus-centred cropping.

use tilegym_core::{Array, BoxSpace, ObsSpace, Observation, Pos};
use tilegym_env::LevelEnv;

use crate::error::StageError;
use crate::stage::{require_2d, require_pos, Transform};

/// The `size × size` window of a 2D array centred on `focus`.
///
/// Equivalent to padding the source by `size / 2` cells of `fill` on every
/// side and cutting the window whose top-left is the padded cell at
/// `(focus.x, focus.y)`. The focus always lands on output cell
/// `(size / 2, size / 2)`.
pub fn crop_centered(src: &Array, focus: Pos, size: usize, fill: f32) -> Array {
    let mut out = Array::full(&[size, size], fill);
    let Some((h, w)) = src.spatial_extent() else {
        return out;
    };
    let pad = size / 2;
    let data = out.data_mut();
    for r in 0..size {
        let Some(sy) = (focus.y + r).checked_sub(pad).filter(|&y| y < h) else {
            continue;
        };
        for c in 0..size {
            if let Some(sx) = (focus.x + c).checked_sub(pad).filter(|&x| x < w) {
                data[r * size + c] = src.data()[sy * w + sx];
            }
        }
    }
    out
}

/// Replace a 2D channel by its [`crop_centered`] window around `pos`.
#[derive(Clone, Debug)]
pub struct Cropped {
    channel: String,
    size: usize,
    fill: f32,
}

impl Cropped {
    /// Crop `channel` to `size × size`, padding with `fill`.
    pub fn new(channel: impl Into<String>, size: usize, fill: f32) -> Self {
        Self {
            channel: channel.into(),
            size,
            fill,
        }
    }
}

impl Transform for Cropped {
    fn name(&self) -> &'static str {
        "cropped"
    }

    fn contract(&mut self, upstream: &ObsSpace, _level: &LevelEnv) -> Result<ObsSpace, StageError> {
        if self.size == 0 {
            return Err(StageError::invalid(self.name(), "crop size must be positive"));
        }
        require_pos(self.name(), upstream)?;
        let src = require_2d(self.name(), upstream, &self.channel)?;
        let cropped = BoxSpace::new(
            src.low.min(self.fill),
            src.high.max(self.fill),
            &[self.size, self.size],
        );
        let mut space = upstream.clone();
        space.insert(self.channel.clone(), cropped);
        Ok(space)
    }

    fn observe(&mut self, _level: &LevelEnv, obs: &mut Observation) {
        let Some(focus) = obs.pos() else {
            return;
        };
        if let Some(src) = obs.get(&self.channel) {
            let out = crop_centered(src, focus, self.size, self.fill);
            obs.insert(self.channel.clone(), out);
        }
    }
}
