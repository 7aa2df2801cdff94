//! Summary statistics over numeric pipelines.
//!
//! ## Purpose
//!
//! Accumulators collecting count, sum, min, max and average in one pass. Both
//! are mergeable so parallel evaluation can combine per-task partial results.
//!
//! ## Key concepts
//!
//! * **Float extrema**: [`float_min`] and [`float_max`] propagate NaN and
//!   order `-0.0` strictly below `0.0`.
//! * **Integer sum**: Accumulated as `i64`, so an `i32` pipeline's statistics
//!   do not overflow where its plain `sum` would wrap.
//!
//! ## Invariants
//!
//! * An empty accumulator reports `min = +inf`/`max = -inf` (floats) or
//!   `i32::MAX`/`i32::MIN` (ints), and an average of zero.

// External dependencies
use core::fmt::{Display, Formatter, Result};
use num_traits::Float;

// Internal dependencies
use crate::math::summation::CompensatedSum;

// ============================================================================
// Float Extremes
// ============================================================================

/// Minimum that propagates NaN and treats `-0.0 < 0.0`.
#[inline]
pub fn float_min<F: Float>(a: F, b: F) -> F {
    if a.is_nan() {
        a
    } else if b.is_nan() {
        b
    } else if a.is_zero() && b.is_zero() {
        if a.is_sign_negative() {
            a
        } else {
            b
        }
    } else if a <= b {
        a
    } else {
        b
    }
}

/// Maximum that propagates NaN and treats `-0.0 < 0.0`.
#[inline]
pub fn float_max<F: Float>(a: F, b: F) -> F {
    if a.is_nan() {
        a
    } else if b.is_nan() {
        b
    } else if a.is_zero() && b.is_zero() {
        if a.is_sign_negative() {
            b
        } else {
            a
        }
    } else if a >= b {
        a
    } else {
        b
    }
}

// ============================================================================
// Double Statistics
// ============================================================================

/// Count, compensated sum, min, max and average of `f64` values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleSummaryStatistics {
    count: u64,
    sum: CompensatedSum<f64>,
    min: f64,
    max: f64,
}

impl Default for DoubleSummaryStatistics {
    fn default() -> Self {
        Self {
            count: 0,
            sum: CompensatedSum::new(),
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl DoubleSummaryStatistics {
    /// Empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one value.
    pub fn accept(&mut self, value: f64) {
        self.count += 1;
        self.sum.add(value);
        self.min = float_min(self.min, value);
        self.max = float_max(self.max, value);
    }

    /// Fold in statistics gathered over other elements.
    pub fn combine(&mut self, other: &Self) {
        self.count += other.count;
        self.sum.merge(&other.sum);
        self.min = float_min(self.min, other.min);
        self.max = float_max(self.max, other.max);
    }

    /// Number of values recorded.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Compensated sum of the values.
    pub fn sum(&self) -> f64 {
        self.sum.value()
    }

    /// Smallest value, `+inf` when empty.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest value, `-inf` when empty.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Arithmetic mean, zero when empty.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum() / self.count as f64
        }
    }
}

impl Display for DoubleSummaryStatistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "DoubleSummaryStatistics{{count={}, sum={:.6}, min={:.6}, average={:.6}, max={:.6}}}",
            self.count,
            self.sum(),
            self.min,
            self.average(),
            self.max
        )
    }
}

// ============================================================================
// Int Statistics
// ============================================================================

/// Count, sum, min, max and average of `i32` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntSummaryStatistics {
    count: u64,
    sum: i64,
    min: i32,
    max: i32,
}

impl Default for IntSummaryStatistics {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0,
            min: i32::MAX,
            max: i32::MIN,
        }
    }
}

impl IntSummaryStatistics {
    /// Empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one value.
    pub fn accept(&mut self, value: i32) {
        self.count += 1;
        self.sum = self.sum.wrapping_add(i64::from(value));
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Fold in statistics gathered over other elements.
    pub fn combine(&mut self, other: &Self) {
        self.count += other.count;
        self.sum = self.sum.wrapping_add(other.sum);
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Number of values recorded.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sum of the values.
    pub fn sum(&self) -> i64 {
        self.sum
    }

    /// Smallest value, `i32::MAX` when empty.
    pub fn min(&self) -> i32 {
        self.min
    }

    /// Largest value, `i32::MIN` when empty.
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Arithmetic mean, zero when empty.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }
}

impl Display for IntSummaryStatistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "IntSummaryStatistics{{count={}, sum={}, min={}, average={:.6}, max={}}}",
            self.count,
            self.sum,
            self.min,
            self.average(),
            self.max
        )
    }
}
