//! Position channel as an image.

use tilegym_core::{Array, BoxSpace, ObsSpace, Observation};
use tilegym_env::LevelEnv;

use crate::error::StageError;
use crate::stage::{require, require_pos, Transform};

/// Replace the `[x, y]` `pos` channel with an `(h, w)` mask that is
/// non-zero in a `size × size` window around the focus.
///
/// The plain variant writes 1 inside the window. The Gaussian variant
/// writes `exp(-d² / 2σ²)`, where `d` is the distance to the focus.
#[derive(Clone, Debug)]
pub struct PosImage {
    size: usize,
    sigma: Option<f32>,
    extent: (usize, usize),
}

impl PosImage {
    /// A flat window of 1s.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            sigma: None,
            extent: (0, 0),
        }
    }

    /// A Gaussian-weighted window. `sigma` must be positive.
    pub fn gaussian(size: usize, sigma: f32) -> Self {
        Self {
            size,
            sigma: Some(sigma),
            extent: (0, 0),
        }
    }

    fn weight(&self, dx: usize, dy: usize) -> f32 {
        match self.sigma {
            Some(s) => {
                let d2 = (dx * dx + dy * dy) as f32;
                (-d2 / (2.0 * s * s)).exp()
            }
            None => 1.0,
        }
    }
}

impl Default for PosImage {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Transform for PosImage {
    fn name(&self) -> &'static str {
        if self.sigma.is_some() {
            "pos-gaussian-image"
        } else {
            "pos-image"
        }
    }

    fn contract(&mut self, upstream: &ObsSpace, level: &LevelEnv) -> Result<ObsSpace, StageError> {
        if self.size == 0 {
            return Err(StageError::invalid(self.name(), "window size must be positive"));
        }
        if let Some(s) = self.sigma {
            if !(s > 0.0 && s.is_finite()) {
                return Err(StageError::invalid(
                    self.name(),
                    format!("standard deviation must be positive, got {s}"),
                ));
            }
        }
        require_pos(self.name(), upstream)?;
        require(self.name(), upstream, "map")?;
        self.extent = (level.height(), level.width());
        let mut space = upstream.clone();
        space.insert("pos", BoxSpace::new(0.0, 1.0, &[self.extent.0, self.extent.1]));
        Ok(space)
    }

    fn observe(&mut self, _level: &LevelEnv, obs: &mut Observation) {
        let Some(focus) = obs.pos() else {
            return;
        };
        let (h, w) = self.extent;
        let pad = self.size / 2;
        let mut mask = Array::zeros(&[h, w]);
        let data = mask.data_mut();
        let ys = focus.y.saturating_sub(pad)..(focus.y + self.size - pad).min(h);
        for y in ys {
            let xs = focus.x.saturating_sub(pad)..(focus.x + self.size - pad).min(w);
            for x in xs {
                data[y * w + x] = self.weight(x.abs_diff(focus.x), y.abs_diff(focus.y));
            }
        }
        obs.insert("pos", mask);
    }
}
