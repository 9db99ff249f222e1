//! Per-step stats records.

use indexmap::IndexMap;

/// Metric name → value, recomputed from the grid after every edit.
///
/// Metrics a problem did not compute read as `0.0`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stats(IndexMap<String, f64>);

impl Stats {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a metric.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    /// A metric's value, `0.0` if absent.
    pub fn get(&self, name: &str) -> f64 {
        self.0.get(name).copied().unwrap_or(0.0)
    }

    /// A metric's value, `None` if absent.
    pub fn try_get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Iterate metrics in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of metrics.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no metrics are recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Stats {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
