//! Relative-improvement termination criterion.
//!
//! The criterion keeps a window of the most recent objective values (at most
//! [`constants::TERMINATION_WINDOW`]). Each call pushes the current value and
//! reports the average improvement per iteration across the window,
//! relative to the current value:
//!
//! ```text
//! (oldest − current) / len / |current|
//! ```
//!
//! Until [`constants::TERMINATION_MIN_SAMPLES`] values are held it reports
//! `+∞`, so a run can never stop on its first few accepted steps. When the
//! current value is exactly zero the absolute average improvement is
//! reported instead.

use owlqn_core::types::{constants, Scalar};
use std::collections::VecDeque;

/// Windowed relative-improvement criterion.
#[derive(Debug, Clone)]
pub struct RelativeImprovementCriterion<T> {
    prev_vals: VecDeque<T>,
}

impl<T: Scalar> Default for RelativeImprovementCriterion<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> RelativeImprovementCriterion<T> {
    /// Creates an empty criterion.
    pub fn new() -> Self {
        Self {
            prev_vals: VecDeque::with_capacity(constants::TERMINATION_WINDOW + 1),
        }
    }

    /// Records `value` and returns the relative average improvement.
    pub fn get_value(&mut self, value: T) -> T {
        self.prev_vals.push_back(value);
        if self.prev_vals.len() > constants::TERMINATION_WINDOW {
            self.prev_vals.pop_front();
        }

        let len = self.prev_vals.len();
        if len < constants::TERMINATION_MIN_SAMPLES {
            return <T as num_traits::Float>::infinity();
        }

        let oldest = self.prev_vals.front().copied().unwrap_or(value);
        let average_improvement = (oldest - value) / <T as Scalar>::from_usize(len);

        if value == T::zero() {
            average_improvement
        } else {
            average_improvement / <T as num_traits::Float>::abs(value)
        }
    }

    /// Number of values currently held.
    pub fn len(&self) -> usize {
        self.prev_vals.len()
    }

    /// True when no value has been recorded since creation or the last reset.
    pub fn is_empty(&self) -> bool {
        self.prev_vals.is_empty()
    }

    /// Clears the window.
    pub fn reset(&mut self) {
        self.prev_vals.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sentinel_for_first_four_values() {
        let mut criterion = RelativeImprovementCriterion::<f64>::new();
        for value in [10.0, 9.0, 8.0, 7.0] {
            assert_eq!(criterion.get_value(value), f64::INFINITY);
        }
        // Fifth value: (10 − 6) / 5 / 6
        assert_relative_eq!(criterion.get_value(6.0), 4.0 / 5.0 / 6.0);
    }

    #[test]
    fn test_window_is_bounded() {
        let mut criterion = RelativeImprovementCriterion::<f64>::new();
        for k in 0..15 {
            criterion.get_value(f64::from(100 - k));
        }
        assert_eq!(criterion.len(), 10);

        // Window holds 95..=86 before this push; after it, 94..=85.
        assert_relative_eq!(criterion.get_value(85.0), (94.0 - 85.0) / 10.0 / 85.0);
    }

    #[test]
    fn test_zero_current_value() {
        let mut criterion = RelativeImprovementCriterion::<f32>::new();
        for value in [4.0, 3.0, 2.0, 1.0] {
            criterion.get_value(value);
        }
        let report = criterion.get_value(0.0);
        assert!(report.is_finite());
        assert_relative_eq!(report, 0.8);
    }

    #[test]
    fn test_reset() {
        let mut criterion = RelativeImprovementCriterion::<f64>::new();
        for value in [5.0, 4.0, 3.0, 2.0, 1.0] {
            criterion.get_value(value);
        }
        criterion.reset();
        assert!(criterion.is_empty());
        assert_eq!(criterion.get_value(1.0), f64::INFINITY);
    }

    #[test]
    fn test_stalled_objective_reports_zero() {
        let mut criterion = RelativeImprovementCriterion::<f64>::new();
        let mut report = f64::INFINITY;
        for _ in 0..6 {
            report = criterion.get_value(3.5);
        }
        assert_eq!(report, 0.0);
    }
}
