//! Error types for problem construction and configuration.

use std::error::Error;
use std::fmt;

use tilegym_core::CatalogError;

/// Errors from building or adjusting a [`Problem`](crate::Problem).
#[derive(Clone, Debug, PartialEq)]
pub enum ProblemError {
    /// No registered problem has this name.
    UnknownProblem {
        /// The requested name.
        name: String,
    },
    /// A tile probability names a kind outside the catalog.
    UnknownTile {
        /// The unknown tile name.
        name: String,
    },
    /// A reward weight names a metric the problem does not compute.
    UnknownMetric {
        /// The unknown metric name.
        name: String,
    },
    /// Width or height is zero.
    InvalidExtent {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
    /// Tile probabilities are negative, non-finite, or all zero.
    InvalidProbabilities {
        /// Description of the problem.
        reason: String,
    },
    /// A reward weight is not finite.
    InvalidWeight {
        /// The metric.
        name: String,
        /// The rejected weight.
        value: f64,
    },
    /// The built-in catalog failed to construct.
    Catalog(CatalogError),
}

impl fmt::Display for ProblemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProblem { name } => write!(f, "unknown problem '{name}'"),
            Self::UnknownTile { name } => write!(f, "probability given for unknown tile '{name}'"),
            Self::UnknownMetric { name } => write!(f, "weight given for unknown metric '{name}'"),
            Self::InvalidExtent { width, height } => {
                write!(f, "level extent {width}x{height} must be non-empty")
            }
            Self::InvalidProbabilities { reason } => {
                write!(f, "invalid tile probabilities: {reason}")
            }
            Self::InvalidWeight { name, value } => {
                write!(f, "reward weight for '{name}' must be finite, got {value}")
            }
            Self::Catalog(e) => write!(f, "catalog error: {e}"),
        }
    }
}

impl Error for ProblemError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Catalog(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CatalogError> for ProblemError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}
