//! Name → problem factory.

use std::fmt;
use std::str::FromStr;

use crate::binary::BinaryProblem;
use crate::coding_game::CodingGameProblem;
use crate::error::ProblemError;
use crate::problem::Problem;

/// The closed set of built-in problems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProblemKind {
    /// [`CodingGameProblem`].
    CodingGame,
    /// [`BinaryProblem`].
    Binary,
}

impl ProblemKind {
    /// Every registered kind.
    pub const ALL: [ProblemKind; 2] = [ProblemKind::CodingGame, ProblemKind::Binary];

    /// Registry name.
    pub fn name(self) -> &'static str {
        match self {
            Self::CodingGame => CodingGameProblem::NAME,
            Self::Binary => BinaryProblem::NAME,
        }
    }

    /// Construct a fresh problem with default settings.
    pub fn build(self) -> Result<Box<dyn Problem>, ProblemError> {
        Ok(match self {
            Self::CodingGame => Box::new(CodingGameProblem::new()?),
            Self::Binary => Box::new(BinaryProblem::new()?),
        })
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProblemKind {
    type Err = ProblemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| ProblemError::UnknownProblem { name: s.to_string() })
    }
}

/// Construct a registered problem by name.
pub fn make_problem(name: &str) -> Result<Box<dyn Problem>, ProblemError> {
    name.parse::<ProblemKind>()?.build()
}
