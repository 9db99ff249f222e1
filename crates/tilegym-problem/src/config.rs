//! Tunable problem settings and the parameter overrides that adjust them.

use indexmap::IndexMap;
use tilegym_core::TileCatalog;

use crate::error::ProblemError;

/// Overrides for a problem's settings. `None`/empty fields leave the
/// current value untouched.
///
/// Probabilities and weights are merged key by key into the existing maps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProblemParams {
    /// Level width in cells.
    pub width: Option<usize>,
    /// Level height in cells.
    pub height: Option<usize>,
    /// Tile name → initial-map sampling weight.
    pub probs: IndexMap<String, f64>,
    /// Path length at which the episode is considered solved.
    pub target_path: Option<u32>,
    /// Draw fresh random tile probabilities at every reset.
    pub random_probs: Option<bool>,
    /// Metric name → reward weight.
    pub rewards: IndexMap<String, f64>,
}

/// The adjustable state every problem carries.
#[derive(Clone, Debug, PartialEq)]
pub struct ProblemSettings {
    /// Level width in cells.
    pub width: usize,
    /// Level height in cells.
    pub height: usize,
    /// Initial-map sampling weights, indexed by tile id.
    pub probs: Vec<f64>,
    /// Path length at which the episode is considered solved.
    pub target_path: u32,
    /// Draw fresh random tile probabilities at every reset.
    pub random_probs: bool,
    /// Metric name → reward weight. The key set is the problem's metric set.
    pub weights: IndexMap<String, f64>,
}

impl ProblemSettings {
    /// Validate `params` against `catalog` and apply them.
    ///
    /// Nothing is changed if any override is rejected.
    pub fn apply(&mut self, params: &ProblemParams, catalog: &TileCatalog) -> Result<(), ProblemError> {
        let mut next = self.clone();
        if let Some(w) = params.width {
            next.width = w;
        }
        if let Some(h) = params.height {
            next.height = h;
        }
        if next.width == 0 || next.height == 0 {
            return Err(ProblemError::InvalidExtent {
                width: next.width,
                height: next.height,
            });
        }

        for (name, &p) in &params.probs {
            let id = catalog.id(name).ok_or_else(|| ProblemError::UnknownTile {
                name: name.clone(),
            })?;
            next.probs[id.index()] = p;
        }
        validate_probs(&next.probs)?;

        for (name, &w) in &params.rewards {
            if !w.is_finite() {
                return Err(ProblemError::InvalidWeight {
                    name: name.clone(),
                    value: w,
                });
            }
            let slot = next
                .weights
                .get_mut(name)
                .ok_or_else(|| ProblemError::UnknownMetric { name: name.clone() })?;
            *slot = w;
        }

        if let Some(t) = params.target_path {
            next.target_path = t;
        }
        if let Some(r) = params.random_probs {
            next.random_probs = r;
        }
        *self = next;
        Ok(())
    }

    /// Weight of a metric, `0.0` if the problem does not weigh it.
    pub fn weight(&self, metric: &str) -> f64 {
        self.weights.get(metric).copied().unwrap_or(0.0)
    }
}

/// Check that sampling weights are usable.
pub fn validate_probs(probs: &[f64]) -> Result<(), ProblemError> {
    if let Some(p) = probs.iter().find(|p| !p.is_finite() || **p < 0.0) {
        return Err(ProblemError::InvalidProbabilities {
            reason: format!("weight {p} is negative or not finite"),
        });
    }
    if probs.iter().sum::<f64>() <= 0.0 {
        return Err(ProblemError::InvalidProbabilities {
            reason: "weights sum to zero".into(),
        });
    }
    Ok(())
}
