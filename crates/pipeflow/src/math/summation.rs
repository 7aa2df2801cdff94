//! Compensated floating-point summation.
//!
//! ## Purpose
//!
//! This module provides [`CompensatedSum`], the accumulator behind `sum` and
//! `average` over floating-point pipelines. It bounds rounding error by
//! carrying a low-order correction term alongside the running sum.
//!
//! ## Design notes
//!
//! * **Triple state**: High-order sum, low-order compensation, and a plain
//!   running sum used only to recover same-signed infinite totals.
//! * **Neumaier update**: The compensation picks whichever operand is larger
//!   in magnitude, so a small addend absorbed by a large partial sum is still
//!   recovered when the large terms later cancel.
//! * **Mergeable**: Parallel partial sums fold both compensated terms and the
//!   plain sum independently.
//!
//! ## Key concepts
//!
//! * **Fallback**: If the compensated value is NaN while the plain sum is
//!   infinite, every input was an infinity of one sign; the plain sum is the
//!   correct answer.
//!
//! ## Invariants
//!
//! * `value()` of an empty accumulator is zero.
//! * Merging is order-sensitive only within floating-point tolerance.

// External dependencies
use num_traits::Float;

// ============================================================================
// Compensated Sum
// ============================================================================

/// Kahan/Neumaier compensated summation state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompensatedSum<F> {
    high: F,
    low: F,
    simple: F,
}

impl<F: Float> Default for CompensatedSum<F> {
    fn default() -> Self {
        Self {
            high: F::zero(),
            low: F::zero(),
            simple: F::zero(),
        }
    }
}

impl<F: Float> CompensatedSum<F> {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one value.
    #[inline]
    pub fn add(&mut self, value: F) {
        self.simple = self.simple + value;
        self.compensate(value);
    }

    #[inline]
    fn compensate(&mut self, value: F) {
        let total = self.high + value;
        if self.high.abs() >= value.abs() {
            self.low = self.low + ((self.high - total) + value);
        } else {
            self.low = self.low + ((value - total) + self.high);
        }
        self.high = total;
    }

    /// Fold a partial sum computed over later elements into this one.
    pub fn merge(&mut self, other: &Self) {
        self.compensate(other.high);
        self.compensate(other.low);
        self.simple = self.simple + other.simple;
    }

    /// The compensated total.
    pub fn value(&self) -> F {
        let total = self.high + self.low;
        if total.is_nan() && self.simple.is_infinite() {
            self.simple
        } else {
            total
        }
    }

    /// Uncompensated running sum.
    pub fn simple_sum(&self) -> F {
        self.simple
    }
}

impl<F: Float> Extend<F> for CompensatedSum<F> {
    fn extend<I: IntoIterator<Item = F>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<F: Float> FromIterator<F> for CompensatedSum<F> {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        let mut sum = Self::new();
        sum.extend(iter);
        sum
    }
}
