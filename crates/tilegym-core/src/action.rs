//! Actions and action spaces.

use smallvec::SmallVec;

/// An action submitted to an environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// A single discrete choice.
    Discrete(usize),
    /// One choice per dimension, e.g. `[x, y, kind]` for wide edits.
    Multi(SmallVec<[usize; 4]>),
}

impl Action {
    /// A multi-discrete action from a slice.
    pub fn multi(values: &[usize]) -> Self {
        Self::Multi(SmallVec::from_slice(values))
    }

    /// The last component: the value itself for discrete actions.
    pub fn last(&self) -> Option<usize> {
        match self {
            Self::Discrete(v) => Some(*v),
            Self::Multi(vs) => vs.last().copied(),
        }
    }
}

/// The set of actions an environment accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionSpace {
    /// `Discrete(n)` accepts `0..n`.
    Discrete(usize),
    /// One bound per dimension; component `i` accepts `0..dims[i]`.
    MultiDiscrete(SmallVec<[usize; 4]>),
}

impl ActionSpace {
    /// Whether `action` is a member of this space.
    pub fn contains(&self, action: &Action) -> bool {
        match (self, action) {
            (Self::Discrete(n), Action::Discrete(v)) => v < n,
            (Self::MultiDiscrete(dims), Action::Multi(vs)) => {
                dims.len() == vs.len() && dims.iter().zip(vs.iter()).all(|(d, v)| v < d)
            }
            _ => false,
        }
    }

    /// Number of distinct actions.
    pub fn size(&self) -> usize {
        match self {
            Self::Discrete(n) => *n,
            Self::MultiDiscrete(dims) => dims.iter().product(),
        }
    }
}
