//! Backtracking line search with orthant projection.
//!
//! Starting from `α₀`, the search tries candidates
//!
//! ```text
//! x' = P(x + α·d),   P zeroes x'_i wherever x_i·x'_i < 0   (λ > 0 only)
//! ```
//!
//! and accepts the first one satisfying the Armijo condition
//! `F(x') ≤ F(x) + c₁·α·F'(x; d)`, shrinking `α` by a constant factor after
//! each rejection. Projection keeps every candidate in the orthant of the
//! current iterate, so coordinates may reach zero but never cross it in a
//! single step.
//!
//! On the first iteration no curvature information is available, so the
//! initial step is normalized to `α₀ = 1/‖d‖` and shrinks faster.

use crate::state::OptimizerState;
use num_traits::Float;
use owlqn_core::{
    cost_function::CostFunction,
    error::{OptimizerError, OptimizerResult},
    linalg,
    types::{constants, Scalar},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of the backtracking line search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LineSearchParams<T: Scalar> {
    /// Armijo parameter c₁ ∈ (0,1) for the sufficient decrease condition
    pub c1: T,

    /// Step reduction factor ∈ (0,1) after a rejected candidate
    pub backoff: T,

    /// Step reduction factor on the first iteration
    pub first_iteration_backoff: T,

    /// Maximum number of candidates tried before failing
    pub max_iterations: usize,

    /// Smallest step size tried before failing
    pub min_step_size: T,
}

impl<T: Scalar> Default for LineSearchParams<T> {
    fn default() -> Self {
        Self {
            c1: <T as Scalar>::from_f64(constants::ARMIJO_C1),
            backoff: <T as Scalar>::from_f64(constants::BACKOFF),
            first_iteration_backoff: <T as Scalar>::from_f64(constants::FIRST_ITERATION_BACKOFF),
            max_iterations: 50,
            min_step_size: <T as Scalar>::MIN_STEP_SIZE,
        }
    }
}

impl<T: Scalar> LineSearchParams<T> {
    /// Creates parameters with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Armijo constant.
    #[must_use]
    pub fn with_c1(mut self, c1: T) -> Self {
        self.c1 = c1;
        self
    }

    /// Sets the step reduction factor.
    #[must_use]
    pub fn with_backoff(mut self, backoff: T) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets the step reduction factor used on the first iteration.
    #[must_use]
    pub fn with_first_iteration_backoff(mut self, backoff: T) -> Self {
        self.first_iteration_backoff = backoff;
        self
    }

    /// Sets the maximum number of candidates.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the minimum step size.
    #[must_use]
    pub fn with_min_step_size(mut self, min_step_size: T) -> Self {
        self.min_step_size = min_step_size;
        self
    }

    /// Validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if:
    /// - `c1 ∉ (0, 1)`
    /// - either backoff factor `∉ (0, 1)`
    /// - `max_iterations` is zero
    /// - `min_step_size` is not positive and finite
    pub fn validate(&self) -> OptimizerResult<()> {
        let zero = T::zero();
        let one = T::one();

        if !(self.c1 > zero && self.c1 < one) {
            return Err(OptimizerError::invalid_configuration(
                "Armijo constant c1 must be in (0, 1)",
                "line_search.c1",
                self.c1.to_string(),
            ));
        }
        if !(self.backoff > zero && self.backoff < one) {
            return Err(OptimizerError::invalid_configuration(
                "Backoff factor must be in (0, 1)",
                "line_search.backoff",
                self.backoff.to_string(),
            ));
        }
        if !(self.first_iteration_backoff > zero && self.first_iteration_backoff < one) {
            return Err(OptimizerError::invalid_configuration(
                "First-iteration backoff factor must be in (0, 1)",
                "line_search.first_iteration_backoff",
                self.first_iteration_backoff.to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(OptimizerError::invalid_configuration(
                "Maximum line search iterations must be at least 1",
                "line_search.max_iterations",
                "0",
            ));
        }
        if !(self.min_step_size > zero && Float::is_finite(self.min_step_size)) {
            return Err(OptimizerError::invalid_configuration(
                "Minimum step size must be positive and finite",
                "line_search.min_step_size",
                self.min_step_size.to_string(),
            ));
        }
        Ok(())
    }
}

/// An accepted line search step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSearchStep<T> {
    /// Accepted step size
    pub step_size: T,
    /// Number of candidates evaluated, including the accepted one
    pub trials: usize,
    /// Objective value at the accepted candidate
    pub value: T,
}

impl<T: Scalar> OptimizerState<T> {
    /// Writes the projected candidate `P(x + α·dir)` into `new_x`.
    pub fn get_next_point(&mut self, alpha: T) -> OptimizerResult<()> {
        linalg::add_mult_into(&mut self.new_x, &self.x, &self.dir, alpha)?;
        if self.l1_weight > T::zero() {
            for (nx, &x) in self.new_x.iter_mut().zip(self.x.iter()) {
                if x * *nx < T::zero() {
                    *nx = T::zero();
                }
            }
        }
        Ok(())
    }

    /// Runs the backtracking search along `dir`.
    ///
    /// On success `new_x`, `new_grad` and `value` describe the accepted
    /// candidate; `x` and `grad` are untouched until [`OptimizerState::shift`].
    ///
    /// # Errors
    ///
    /// - `NonDescentDirection` when the directional derivative is not negative
    /// - `LineSearchFailed` when the trial budget or the minimum step is exhausted
    pub fn backtracking_line_search<C: CostFunction<T>>(
        &mut self,
        cost_fn: &C,
        params: &LineSearchParams<T>,
    ) -> OptimizerResult<LineSearchStep<T>> {
        let orig_dir_deriv = self.dir_deriv()?;
        if !(orig_dir_deriv < T::zero()) {
            return Err(OptimizerError::non_descent_direction(
                Scalar::to_f64(orig_dir_deriv),
                self.iter,
            ));
        }

        let (mut alpha, backoff) = if self.iter == 0 {
            (T::one() / linalg::norm(&self.dir), params.first_iteration_backoff)
        } else {
            (T::one(), params.backoff)
        };

        let old_value = self.value;
        let mut trials = 0;

        while trials < params.max_iterations && alpha >= params.min_step_size {
            trials += 1;
            self.get_next_point(alpha)?;
            let value = self.eval_l1(cost_fn)?;

            log::trace!(
                "line search trial {}: alpha = {:e}, value = {:e}",
                trials,
                Scalar::to_f64(alpha),
                Scalar::to_f64(value)
            );

            if Float::is_finite(value) && value <= old_value + params.c1 * orig_dir_deriv * alpha {
                self.value = value;
                return Ok(LineSearchStep {
                    step_size: alpha,
                    trials,
                    value,
                });
            }

            alpha *= backoff;
        }

        let reason = if trials >= params.max_iterations {
            format!("no sufficient decrease after {trials} trials")
        } else {
            format!(
                "step size {:e} fell below the minimum {:e}",
                Scalar::to_f64(alpha),
                Scalar::to_f64(params.min_step_size)
            )
        };

        Err(OptimizerError::line_search_failed(
            reason,
            trials,
            Scalar::to_f64(alpha),
            Scalar::to_f64(old_value),
        ))
    }
}
