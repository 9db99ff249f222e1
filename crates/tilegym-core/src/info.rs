//! Step metadata and the transition record returned by `step`.

use indexmap::IndexMap;

use crate::grid::TileGrid;
use crate::obs::Observation;
use crate::stats::Stats;

/// A single metadata value.
#[derive(Clone, Debug, PartialEq)]
pub enum InfoValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer counter.
    Int(i64),
    /// Real-valued metric.
    Float(f64),
    /// A snapshot of a level map.
    Grid(TileGrid),
}

impl InfoValue {
    /// The value as `f64` if numeric or boolean.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Grid(_) => None,
        }
    }

    /// The value as `i64` if it is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The value as `bool` if it is a flag.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as a grid if it is one.
    pub fn as_grid(&self) -> Option<&TileGrid> {
        match self {
            Self::Grid(g) => Some(g),
            _ => None,
        }
    }
}

impl From<bool> for InfoValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for InfoValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<usize> for InfoValue {
    fn from(v: usize) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for InfoValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<TileGrid> for InfoValue {
    fn from(v: TileGrid) -> Self {
        Self::Grid(v)
    }
}

/// Ordered step metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Info(IndexMap<String, InfoValue>);

impl Info {
    /// Empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<InfoValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// A value by key.
    pub fn get(&self, key: &str) -> Option<&InfoValue> {
        self.0.get(key)
    }

    /// Whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InfoValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&Stats> for Info {
    fn from(stats: &Stats) -> Self {
        Self(
            stats
                .iter()
                .map(|(k, v)| (k.to_string(), InfoValue::Float(v)))
                .collect(),
        )
    }
}

/// The result of one `step`.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition<O = Observation> {
    /// Observation after the step.
    pub obs: O,
    /// Scalar reward for the step.
    pub reward: f64,
    /// Whether the episode has ended.
    pub done: bool,
    /// Step metadata.
    pub info: Info,
}

impl<O> Transition<O> {
    /// Replace the observation, keeping reward, termination and info.
    pub fn map_obs<P>(self, f: impl FnOnce(O) -> P) -> Transition<P> {
        Transition {
            obs: f(self.obs),
            reward: self.reward,
            done: self.done,
            info: self.info,
        }
    }
}
