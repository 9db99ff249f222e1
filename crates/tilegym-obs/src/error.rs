//! Construction-time errors for pipeline stages.

use std::error::Error;
use std::fmt;

/// A stage rejected the contract of the stage beneath it.
#[derive(Clone, Debug, PartialEq)]
pub enum StageError {
    /// A channel the stage reads is not produced upstream.
    MissingChannel {
        /// The rejecting stage.
        stage: &'static str,
        /// The missing channel.
        channel: String,
    },
    /// A channel the stage treats as a 2D image is not spatial.
    NotSpatial {
        /// The rejecting stage.
        stage: &'static str,
        /// The offending channel.
        channel: String,
        /// Its declared shape.
        shape: Vec<usize>,
    },
    /// A channel's shape differs from what the stage needs.
    ShapeMismatch {
        /// The rejecting stage.
        stage: &'static str,
        /// The offending channel.
        channel: String,
        /// The shape the stage needs.
        expected: Vec<usize>,
        /// The declared shape.
        got: Vec<usize>,
    },
    /// A stage parameter is out of range.
    InvalidParameter {
        /// The rejecting stage.
        stage: &'static str,
        /// What is wrong.
        reason: String,
    },
}

impl StageError {
    pub(crate) fn missing(stage: &'static str, channel: &str) -> Self {
        Self::MissingChannel {
            stage,
            channel: channel.to_string(),
        }
    }

    pub(crate) fn invalid(stage: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            stage,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingChannel { stage, channel } => {
                write!(f, "{stage}: upstream has no '{channel}' channel")
            }
            Self::NotSpatial {
                stage,
                channel,
                shape,
            } => write!(f, "{stage}: channel '{channel}' with shape {shape:?} is not 2D"),
            Self::ShapeMismatch {
                stage,
                channel,
                expected,
                got,
            } => write!(
                f,
                "{stage}: channel '{channel}' has shape {got:?}, expected {expected:?}"
            ),
            Self::InvalidParameter { stage, reason } => write!(f, "{stage}: {reason}"),
        }
    }
}

impl Error for StageError {}
