//! Optimizer trait and result types.
//!
//! An optimization run either terminates normally, reported through an
//! [`OptimizationResult`] whose [`TerminationReason`] says why it stopped,
//! or fails with an [`OptimizerError`](crate::error::OptimizerError).

use crate::{
    cost_function::CostFunction,
    error::OptimizerResult,
    types::{DVector, Scalar},
};
use std::fmt::{self, Debug};
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of a terminated optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult<T: Scalar> {
    /// The returned point (the last accepted candidate)
    pub point: DVector<T>,

    /// Objective value `f(x) + λ·‖x‖₁` at the returned point
    pub value: T,

    /// Norm of the pseudo-gradient at the last point where it was computed
    pub pseudo_gradient_norm: Option<T>,

    /// Number of accepted steps
    pub iterations: usize,

    /// Total number of cost-function evaluations
    pub function_evaluations: usize,

    /// Number of non-zero coordinates in the returned point
    pub nonzero_count: usize,

    /// Wall-clock time elapsed during the run
    pub duration: Duration,

    /// Why the run stopped
    pub termination_reason: TerminationReason,

    /// True if the run stopped because the convergence test passed
    pub converged: bool,
}

impl<T: Scalar> OptimizationResult<T> {
    /// Result with zero evaluations counted; see [`Self::with_function_evaluations`].
    pub fn new(
        point: DVector<T>,
        value: T,
        iterations: usize,
        duration: Duration,
        termination_reason: TerminationReason,
    ) -> Self {
        let nonzero_count = crate::linalg::count_nonzero(&point);
        Self {
            point,
            value,
            pseudo_gradient_norm: None,
            iterations,
            function_evaluations: 0,
            nonzero_count,
            duration,
            termination_reason,
            converged: termination_reason == TerminationReason::Converged,
        }
    }

    /// Sets the pseudo-gradient norm.
    #[must_use]
    pub fn with_pseudo_gradient_norm(mut self, norm: T) -> Self {
        self.pseudo_gradient_norm = Some(norm);
        self
    }

    /// Records how many times the smooth part was evaluated.
    #[must_use]
    pub fn with_function_evaluations(mut self, count: usize) -> Self {
        self.function_evaluations = count;
        self
    }

    /// Fraction of coordinates that are exactly zero.
    pub fn sparsity(&self) -> f64 {
        if self.point.is_empty() {
            return 0.0;
        }
        let zeros = self.point.len() - self.nonzero_count;
        zeros as f64 / self.point.len() as f64
    }
}

/// Reasons for normal termination of an optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TerminationReason {
    /// Relative improvement fell below the tolerance, or the current point
    /// is stationary for the regularized objective
    Converged,
    /// The configured iteration cap was reached
    MaxIterations,
    /// A callback requested early termination
    CallbackRequest,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converged => write!(f, "converged"),
            Self::MaxIterations => write!(f, "maximum iterations reached"),
            Self::CallbackRequest => write!(f, "stopped by callback"),
        }
    }
}

/// Interface for optimizers of `f(x) + λ·‖x‖₁`.
pub trait Optimizer<T: Scalar>: Debug {
    /// Returns a human-readable name identifying the algorithm.
    fn name(&self) -> &str;

    /// Minimizes the objective starting from `initial_point`.
    ///
    /// # Errors
    ///
    /// Returns errors for invalid configuration, dimension mismatches,
    /// cost-function failures and unrecoverable numerical conditions.
    fn minimize<C: CostFunction<T>>(
        &mut self,
        cost_fn: &C,
        initial_point: &DVector<T>,
    ) -> OptimizerResult<OptimizationResult<T>>;
}
