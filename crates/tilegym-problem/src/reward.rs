//! Range-reward shaping.

/// A target interval `[low, high]` for one metric.
///
/// Either bound may be infinite. `[∞, ∞]` means "more is always better".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeTarget {
    /// Inclusive lower bound.
    pub low: f64,
    /// Inclusive upper bound.
    pub high: f64,
}

impl RangeTarget {
    /// A target interval.
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// A single target value.
    pub const fn exactly(v: f64) -> Self {
        Self { low: v, high: v }
    }

    /// Unbounded growth: `[∞, ∞]`.
    pub const fn unbounded() -> Self {
        Self {
            low: f64::INFINITY,
            high: f64::INFINITY,
        }
    }

    /// Reward for moving from `old` to `new` relative to this interval.
    pub fn reward(&self, new: f64, old: f64) -> f64 {
        range_reward(new, old, self.low, self.high)
    }
}

/// Shaped reward for a metric moving from `old` to `new`.
///
/// Staying inside `[low, high]` earns 0. Below the interval, progress toward
/// `low` earns the distance gained; above it, progress toward `high` earns the
/// distance gained. Leaving the interval earns the matching negative amount.
/// Jumping clean across the interval, in either direction, is penalised by
/// the sum of both distances outside it.
pub fn range_reward(new: f64, old: f64, low: f64, high: f64) -> f64 {
    let inside = |v: f64| v >= low && v <= high;
    if inside(new) && inside(old) {
        0.0
    } else if old <= high && new <= high {
        new.min(low) - old.min(low)
    } else if old >= low && new >= low {
        old.max(high) - new.max(high)
    } else if new > high && old < low {
        high - new + old - low
    } else if new < low && old > high {
        high - old + new - low
    } else {
        0.0
    }
}
