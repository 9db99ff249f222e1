//! Ordered pipeline construction and the standard compositions.

use tilegym_env::Env;
use tracing::debug;

use crate::action_map::ActionMap;
use crate::channel::{Inverse, Normalize, OneHot};
use crate::crop::Cropped;
use crate::derive::{AddChanges, VisitedMap};
use crate::error::StageError;
use crate::position::PosImage;
use crate::reward::LateReward;
use crate::stage::{Stage, Transform};
use crate::tensor::{ToFlat, ToImage};

/// Builds a pipeline bottom-up. Each call wraps the current top stage and
/// validates it against the stage below before returning.
pub struct PipelineBuilder {
    env: Box<dyn Env>,
    stages: Vec<&'static str>,
}

impl PipelineBuilder {
    /// Start from any environment.
    pub fn new(env: impl Env + 'static) -> Self {
        Self {
            env: Box::new(env),
            stages: Vec::new(),
        }
    }

    /// Wrap the current top with `transform`.
    pub fn stage<T: Transform + 'static>(mut self, transform: T) -> Result<Self, StageError> {
        let name = transform.name();
        self.env = Box::new(Stage::new(self.env, transform)?);
        self.stages.push(name);
        Ok(self)
    }

    /// See [`Normalize`].
    pub fn normalize(self, channel: &str) -> Result<Self, StageError> {
        self.stage(Normalize::new(channel))
    }

    /// See [`Inverse`].
    pub fn inverse(self, channel: &str) -> Result<Self, StageError> {
        self.stage(Inverse::new(channel))
    }

    /// See [`OneHot`].
    pub fn one_hot(self, channel: &str) -> Result<Self, StageError> {
        self.stage(OneHot::new(channel))
    }

    /// See [`Cropped`].
    pub fn crop(self, channel: &str, size: usize, fill: f32) -> Result<Self, StageError> {
        self.stage(Cropped::new(channel, size, fill))
    }

    /// See [`AddChanges`].
    pub fn add_changes(self, is_map: bool) -> Result<Self, StageError> {
        self.stage(if is_map {
            AddChanges::map()
        } else {
            AddChanges::scalar()
        })
    }

    /// See [`VisitedMap`].
    pub fn visited_map(self) -> Result<Self, StageError> {
        self.stage(VisitedMap::new())
    }

    /// See [`PosImage`].
    pub fn pos_image(self, size: usize) -> Result<Self, StageError> {
        self.stage(PosImage::new(size))
    }

    /// See [`PosImage::gaussian`].
    pub fn pos_gaussian_image(self, size: usize, sigma: f32) -> Result<Self, StageError> {
        self.stage(PosImage::gaussian(size, sigma))
    }

    /// See [`LateReward`].
    pub fn late_reward(self) -> Result<Self, StageError> {
        self.stage(LateReward::new())
    }

    /// See [`ActionMap`].
    pub fn action_map(self) -> Result<Self, StageError> {
        self.stage(ActionMap::new())
    }

    /// Stage names applied so far, innermost first.
    pub fn stages(&self) -> &[&'static str] {
        &self.stages
    }

    /// The environment with named channels.
    pub fn build(self) -> Box<dyn Env> {
        debug!(stages = ?self.stages, "pipeline built");
        self.env
    }

    /// Finish with a [`ToImage`] over `names`.
    pub fn to_image<S: Into<String>>(
        self,
        names: impl IntoIterator<Item = S>,
    ) -> Result<ToImage<Box<dyn Env>>, StageError> {
        ToImage::new(self.build(), names)
    }

    /// Finish with a [`ToFlat`] over `names`.
    pub fn to_flat<S: Into<String>>(
        self,
        names: impl IntoIterator<Item = S>,
    ) -> Result<ToFlat<Box<dyn Env>>, StageError> {
        ToFlat::new(self.build(), names)
    }
}

/// Optional channels in the standard compositions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Include the normalized `heatmap`.
    pub add_heatmap: bool,
    /// Include the normalized `changes`.
    pub add_changes: bool,
    /// Include the normalized `visits`.
    pub add_visits: bool,
    /// Include the position (as an image or normalized coordinates).
    pub add_pos: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            add_heatmap: true,
            add_changes: true,
            add_visits: true,
            add_pos: true,
        }
    }
}

fn start(env: impl Env + 'static) -> Result<PipelineBuilder, StageError> {
    let multi_kind = env.level().catalog().len() > 2;
    let builder = PipelineBuilder::new(env);
    if multi_kind {
        builder.one_hot("map")
    } else {
        Ok(builder)
    }
}

/// Normalized heatmap, changes and visits on an uncropped level.
fn add_uncropped(
    mut b: PipelineBuilder,
    names: &mut Vec<&'static str>,
    options: PipelineOptions,
    spatial_changes: bool,
) -> Result<PipelineBuilder, StageError> {
    if options.add_heatmap {
        b = b.normalize("heatmap")?;
        names.push("heatmap");
    }
    if options.add_changes {
        b = b.add_changes(spatial_changes)?.normalize("changes")?;
        names.push("changes");
    }
    if options.add_visits {
        b = b.visited_map()?.normalize("visits")?;
        names.push("visits");
    }
    Ok(b)
}

/// Focus-centred image for narrow and turtle levels.
///
/// `map` is cropped to `crop_size` and padded with the border tile; the
/// heatmap, changes and visits channels are cropped the same way before
/// being normalized.
pub fn cropped_image(
    env: impl Env + 'static,
    crop_size: usize,
    options: PipelineOptions,
) -> Result<ToImage<Box<dyn Env>>, StageError> {
    let border = env.level().catalog().border().index() as f32;
    let multi_kind = env.level().catalog().len() > 2;
    let mut b = PipelineBuilder::new(env).crop("map", crop_size, border)?;
    if multi_kind {
        b = b.one_hot("map")?;
    }
    let mut names = vec!["map"];
    if options.add_heatmap {
        b = b.crop("heatmap", crop_size, 0.0)?.normalize("heatmap")?;
        names.push("heatmap");
    }
    if options.add_changes {
        b = b
            .add_changes(true)?
            .crop("changes", crop_size, 0.0)?
            .normalize("changes")?;
        names.push("changes");
    }
    if options.add_visits {
        b = b
            .visited_map()?
            .crop("visits", crop_size, 0.0)?
            .normalize("visits")?;
        names.push("visits");
    }
    b.to_image(names)
}

/// Whole-level image, ignoring the focus. Suited to wide levels.
pub fn image(
    env: impl Env + 'static,
    options: PipelineOptions,
) -> Result<ToImage<Box<dyn Env>>, StageError> {
    let mut names = vec!["map"];
    let b = add_uncropped(start(env)?, &mut names, options, true)?;
    b.to_image(names)
}

/// [`image`] driven by a single `(cell, kind)` index per step.
pub fn action_map_image(
    env: impl Env + 'static,
    options: PipelineOptions,
) -> Result<ToImage<Box<dyn Env>>, StageError> {
    let multi_kind = env.level().catalog().len() > 2;
    let mut b = PipelineBuilder::new(env).action_map()?;
    if multi_kind {
        b = b.one_hot("map")?;
    }
    let mut names = vec!["map"];
    let b = add_uncropped(b, &mut names, options, true)?;
    b.to_image(names)
}

/// Whole-level image with the focus drawn as a `pos_size` window. A
/// positive `sigma` weights the window with a Gaussian.
pub fn position_image(
    env: impl Env + 'static,
    pos_size: usize,
    sigma: f32,
    options: PipelineOptions,
) -> Result<ToImage<Box<dyn Env>>, StageError> {
    let mut names = vec!["map"];
    let mut b = add_uncropped(start(env)?, &mut names, options, true)?;
    if options.add_pos {
        b = if sigma > 0.0 {
            b.pos_gaussian_image(pos_size, sigma)?
        } else {
            b.pos_image(pos_size)?
        };
        names.push("pos");
    }
    b.to_image(names)
}

/// Everything flattened into one vector, for fully connected models.
pub fn flat(
    env: impl Env + 'static,
    options: PipelineOptions,
) -> Result<ToFlat<Box<dyn Env>>, StageError> {
    let has_pos = env.observation_space().contains("pos");
    let mut names = vec!["map"];
    let mut b = add_uncropped(start(env)?, &mut names, options, false)?;
    if options.add_pos && has_pos {
        b = b.normalize("pos")?;
        names.push("pos");
    }
    b.to_flat(names)
}
