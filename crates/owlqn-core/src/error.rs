//! Error types for OWL-QN optimization.
//!
//! This module defines the error types used throughout the workspace:
//! [`ObjectiveError`] for vector primitives and cost-function evaluation, and
//! [`OptimizerError`] for failures of the optimization run itself.

use thiserror::Error;

/// Errors that can occur while evaluating vectors or cost functions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObjectiveError {
    /// Two vectors that must share a length do not.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Length required by the operation
        expected: String,
        /// Length that was supplied
        actual: String,
    },

    /// The point or a parameter lies outside the cost function's domain.
    #[error("Invalid point: {reason}")]
    InvalidPoint {
        /// What was wrong with it
        reason: String,
    },

    /// Numerical failure inside a cost function (NaN, overflow, ...).
    #[error("Numerical error: {reason}")]
    NumericalError {
        /// Quantity that went bad
        reason: String,
    },

    /// A cost function does not provide the requested capability.
    #[error("Feature not implemented: {feature}")]
    NotImplemented {
        /// Missing capability, e.g. `hessian`
        feature: String,
    },
}

impl ObjectiveError {
    /// Length mismatch between `expected` and `actual`.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Point outside the domain.
    pub fn invalid_point<S: Into<String>>(reason: S) -> Self {
        Self::InvalidPoint {
            reason: reason.into(),
        }
    }

    /// NaN, infinity or overflow inside a cost function.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }

    /// Unsupported capability.
    pub fn not_implemented<S: Into<String>>(feature: S) -> Self {
        Self::NotImplemented {
            feature: feature.into(),
        }
    }
}

/// Failures of an OWL-QN run.
///
/// A run that ends normally is reported through
/// [`TerminationReason`](crate::optimizer::TerminationReason); everything
/// here aborts it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerError {
    /// The search direction does not decrease the objective.
    ///
    /// This signals an inconsistent cost-function gradient or a defect in the
    /// direction computation. It is never retried.
    #[error(
        "Non-descent direction at iteration {iteration}: directional derivative {directional_derivative} >= 0"
    )]
    NonDescentDirection {
        /// Directional derivative of the regularized objective along the direction
        directional_derivative: f64,
        /// Iteration at which the direction was computed
        iteration: usize,
    },

    /// Backtracking ran out of trials or of step size before the
    /// sufficient-decrease condition held.
    #[error("Line search failed: {reason}")]
    LineSearchFailed {
        /// Which budget was exhausted
        reason: String,
        /// Candidates evaluated
        iterations: usize,
        /// Step size after the final reduction
        last_step_size: f64,
        /// Objective at the point the search started from
        initial_value: f64,
    },

    /// A configuration value is out of range; reported before any evaluation.
    #[error("Invalid optimizer configuration: {reason}")]
    InvalidConfiguration {
        /// Constraint that was violated
        reason: String,
        /// Dotted parameter path, e.g. `line_search.c1`
        parameter: String,
        /// Rejected value, formatted
        value: String,
    },

    /// Curvature information is unusable.
    ///
    /// Raised when a curvature pair has a non-positive or non-finite
    /// product and the run is configured to report it.
    #[error("Numeric instability at iteration {iteration}: {reason}")]
    NumericInstability {
        /// Offending quantity
        reason: String,
        /// Iteration at which the instability was detected
        iteration: usize,
    },

    /// Propagated vector or cost-function error.
    #[error("Objective evaluation failed: {0}")]
    Objective(#[from] ObjectiveError),
}

impl OptimizerError {
    /// Direction with a non-negative directional derivative.
    pub fn non_descent_direction(directional_derivative: f64, iteration: usize) -> Self {
        Self::NonDescentDirection {
            directional_derivative,
            iteration,
        }
    }

    /// Line search failure with the state it stopped in.
    pub fn line_search_failed<S: Into<String>>(
        reason: S,
        iterations: usize,
        last_step_size: f64,
        initial_value: f64,
    ) -> Self {
        Self::LineSearchFailed {
            reason: reason.into(),
            iterations,
            last_step_size,
            initial_value,
        }
    }

    /// Rejected configuration value.
    pub fn invalid_configuration<S1, S2, S3>(reason: S1, parameter: S2, value: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::InvalidConfiguration {
            reason: reason.into(),
            parameter: parameter.into(),
            value: value.into(),
        }
    }

    /// Unusable curvature detected at `iteration`.
    pub fn numeric_instability<S: Into<String>>(reason: S, iteration: usize) -> Self {
        Self::NumericInstability {
            reason: reason.into(),
            iteration,
        }
    }

    /// [`ObjectiveError::DimensionMismatch`] lifted into an optimizer error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::Objective(ObjectiveError::dimension_mismatch(expected, actual))
    }

    /// Returns true if this error reports mismatched vector lengths.
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(
            self,
            Self::Objective(ObjectiveError::DimensionMismatch { .. })
        )
    }
}

/// Result of vector primitives and cost-function evaluation.
pub type Result<T> = std::result::Result<T, ObjectiveError>;

/// Result of an optimization run or one of its steps.
pub type OptimizerResult<T> = std::result::Result<T, OptimizerError>;
