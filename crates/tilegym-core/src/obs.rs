//! Named-channel observations and their declared spaces.
//!
//! An [`Observation`] maps channel names (`"map"`, `"heatmap"`, `"pos"`, ...)
//! to dense row-major [`Array`]s. An [`ObsSpace`] is the matching contract:
//! the shape and value range each channel is guaranteed to have.

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::error::ShapeError;
use crate::grid::{Pos, TileGrid};

/// Array dimensions, outermost first.
pub type Shape = SmallVec<[usize; 4]>;

/// A dense row-major `f32` tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct Array {
    shape: Shape,
    data: Vec<f32>,
}

impl Array {
    /// Wrap a buffer, checking it fills `shape` exactly.
    pub fn new(shape: &[usize], data: Vec<f32>) -> Result<Self, ShapeError> {
        let expected = shape.iter().product::<usize>();
        if expected != data.len() {
            return Err(ShapeError {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            shape: Shape::from_slice(shape),
            data,
        })
    }

    /// An array of zeros.
    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, 0.0)
    }

    /// An array with every element set to `value`.
    pub fn full(shape: &[usize], value: f32) -> Self {
        Self {
            shape: Shape::from_slice(shape),
            data: vec![value; shape.iter().product()],
        }
    }

    /// A `(height, width)` array of tile ids.
    pub fn from_grid(grid: &TileGrid) -> Self {
        Self {
            shape: Shape::from_slice(&[grid.height(), grid.width()]),
            data: grid.cells().iter().map(|t| t.0 as f32).collect(),
        }
    }

    /// A `[2]` array holding `[x, y]`.
    pub fn from_pos(pos: Pos) -> Self {
        Self {
            shape: Shape::from_slice(&[2]),
            data: vec![pos.x as f32, pos.y as f32],
        }
    }

    /// Dimensions.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Flat element slice.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable flat element slice.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume into the flat buffer.
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `(height, width)` for arrays with at least two dimensions.
    pub fn spatial_extent(&self) -> Option<(usize, usize)> {
        (self.shape.len() >= 2).then(|| (self.shape[0], self.shape[1]))
    }

    /// Elements per spatial cell: the product of trailing dimensions.
    pub fn cell_depth(&self) -> usize {
        self.shape.iter().skip(2).product()
    }

    /// Flat offset of a multi-index, or `None` if out of range.
    pub fn offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut off = 0;
        for (&i, &d) in index.iter().zip(self.shape.iter()) {
            if i >= d {
                return None;
            }
            off = off * d + i;
        }
        Some(off)
    }

    /// Element at a multi-index.
    pub fn get(&self, index: &[usize]) -> Option<f32> {
        self.offset(index).map(|o| self.data[o])
    }

    /// Sum of all elements.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Apply `f` to every element in place.
    pub fn map_inplace(&mut self, f: impl Fn(f32) -> f32) {
        for v in &mut self.data {
            *v = f(*v);
        }
    }
}

/// The declared range and shape of one channel.
///
/// Bounds are scalar and apply to every element, matching how the
/// transform stages reason about normalisation and one-hot width.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxSpace {
    /// Inclusive lower bound.
    pub low: f32,
    /// Inclusive upper bound.
    pub high: f32,
    /// Channel shape.
    pub shape: Shape,
}

impl BoxSpace {
    /// Create a space.
    pub fn new(low: f32, high: f32, shape: &[usize]) -> Self {
        Self {
            low,
            high,
            shape: Shape::from_slice(shape),
        }
    }

    /// `(height, width)` for spaces with at least two dimensions.
    pub fn spatial_extent(&self) -> Option<(usize, usize)> {
        (self.shape.len() >= 2).then(|| (self.shape[0], self.shape[1]))
    }

    /// Elements per spatial cell.
    pub fn cell_depth(&self) -> usize {
        self.shape.iter().skip(2).product()
    }

    /// Total element count.
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    /// Whether `array` has this space's shape and all values in range.
    pub fn contains(&self, array: &Array) -> bool {
        array.shape() == self.shape.as_slice()
            && array
                .data()
                .iter()
                .all(|v| *v >= self.low && *v <= self.high)
    }
}

macro_rules! channel_map {
    ($(#[$meta:meta])* $name:ident, $value:ty) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq)]
        pub struct $name(IndexMap<String, $value>);

        impl $name {
            /// An empty mapping.
            pub fn new() -> Self {
                Self::default()
            }

            /// Insert or replace a channel, keeping its position if present.
            pub fn insert(&mut self, name: impl Into<String>, value: $value) {
                self.0.insert(name.into(), value);
            }

            /// A channel by name.
            pub fn get(&self, name: &str) -> Option<&$value> {
                self.0.get(name)
            }

            /// A mutable channel by name.
            pub fn get_mut(&mut self, name: &str) -> Option<&mut $value> {
                self.0.get_mut(name)
            }

            /// Remove a channel, preserving the order of the rest.
            pub fn remove(&mut self, name: &str) -> Option<$value> {
                self.0.shift_remove(name)
            }

            /// Whether a channel exists.
            pub fn contains(&self, name: &str) -> bool {
                self.0.contains_key(name)
            }

            /// Channel names in order.
            pub fn names(&self) -> impl Iterator<Item = &str> {
                self.0.keys().map(String::as_str)
            }

            /// Iterate channels in order.
            pub fn iter(&self) -> impl Iterator<Item = (&str, &$value)> {
                self.0.iter().map(|(k, v)| (k.as_str(), v))
            }

            /// Number of channels.
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Whether there are no channels.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl<K: Into<String>> FromIterator<(K, $value)> for $name {
            fn from_iter<T: IntoIterator<Item = (K, $value)>>(iter: T) -> Self {
                Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
            }
        }
    };
}

channel_map!(
    /// Channel name → array, as produced by an environment or stage.
    Observation,
    Array
);

channel_map!(
    /// Channel name → declared space: the observation contract.
    ObsSpace,
    BoxSpace
);

impl Observation {
    /// The focus coordinate from the `"pos"` channel, if present.
    pub fn pos(&self) -> Option<Pos> {
        let p = self.get("pos")?;
        match p.data() {
            [x, y] if *x >= 0.0 && *y >= 0.0 => Some(Pos::new(*x as usize, *y as usize)),
            _ => None,
        }
    }
}
