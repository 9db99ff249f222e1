//! Error types for environment construction and stepping.

use std::error::Error;
use std::fmt;

use tilegym_core::{Action, ActionSpace, CatalogError, GridError};
use tilegym_problem::ProblemError;

/// Errors detected while configuring an environment.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The problem rejected its parameter overrides.
    Problem(ProblemError),
    /// `change_percentage` must lie in `(0, 1]`.
    InvalidChangePercentage {
        /// The rejected value.
        value: f64,
    },
    /// A tile kind the environment needs is missing from the catalog.
    Catalog(CatalogError),
    /// An unrecognised representation name.
    UnknownRepresentation {
        /// The rejected name.
        name: String,
    },
    /// The override would change an observation contract that a wrapping
    /// stage has already been built against.
    FrozenContract {
        /// The rejected parameter.
        param: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Problem(e) => write!(f, "problem configuration: {e}"),
            Self::InvalidChangePercentage { value } => {
                write!(f, "change_percentage must be in (0, 1], got {value}")
            }
            Self::Catalog(e) => write!(f, "catalog: {e}"),
            Self::UnknownRepresentation { name } => {
                write!(f, "unknown representation '{name}'")
            }
            Self::FrozenContract { param } => {
                write!(f, "cannot change {param} of a level wrapped by a stage")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Problem(e) => Some(e),
            Self::Catalog(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProblemError> for ConfigError {
    fn from(e: ProblemError) -> Self {
        Self::Problem(e)
    }
}

impl From<CatalogError> for ConfigError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}

/// Errors from `reset` or `step`.
#[derive(Debug)]
pub enum EnvError {
    /// The action is not a member of the current action space.
    InvalidAction {
        /// The rejected action.
        action: Action,
        /// The space it was checked against.
        space: ActionSpace,
    },
    /// A grid edit or seed map was rejected.
    Grid(GridError),
    /// A wrapping stage failed.
    Stage {
        /// Name of the failing stage.
        stage: &'static str,
        /// The underlying failure.
        source: Box<dyn Error + Send + Sync>,
    },
}

impl EnvError {
    /// Wrap a stage failure.
    pub fn stage(stage: &'static str, source: impl Error + Send + Sync + 'static) -> Self {
        Self::Stage {
            stage,
            source: Box::new(source),
        }
    }
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAction { action, space } => {
                write!(f, "action {action:?} is outside {space:?}")
            }
            Self::Grid(e) => write!(f, "grid error: {e}"),
            Self::Stage { stage, source } => write!(f, "stage '{stage}' failed: {source}"),
        }
    }
}

impl Error for EnvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            Self::Stage { source, .. } => Some(source.as_ref()),
            Self::InvalidAction { .. } => None,
        }
    }
}

impl From<GridError> for EnvError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}
