//! The scalar bound, the vector alias and numeric defaults.

use nalgebra::{Dyn, OVector, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Floating-point element of points, gradients and objective values.
///
/// Implemented for `f32` and `f64`. Everything generic in the workspace is
/// written against this bound, so both precisions share one code path.
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Machine epsilon.
    const EPSILON: Self;

    /// Default relative-improvement tolerance for convergence.
    const DEFAULT_TOLERANCE: Self;

    /// Smallest step size a line search may try.
    const MIN_STEP_SIZE: Self;

    /// Lossy conversion of a literal or configuration constant.
    ///
    /// # Panics
    ///
    /// Only if the target type cannot represent any finite `f64`, which does
    /// not happen for `f32` or `f64`. Parsers use [`Scalar::try_from_f64`].
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("scalar type cannot represent f64 constant")
    }

    /// Checked variant of [`Scalar::from_f64`].
    fn try_from_f64(v: f64) -> Option<Self> {
        <Self as FromPrimitive>::from_f64(v)
    }

    /// Widening used by log lines and error payloads.
    fn to_f64(self) -> f64 {
        num_traits::cast(self).expect("scalar value does not fit in f64")
    }

    /// Window lengths and counts as scalars.
    fn from_usize(v: usize) -> Self {
        <Self as FromPrimitive>::from_usize(v).expect("count does not fit in scalar type")
    }
}

impl Scalar for f32 {
    const EPSILON: Self = f32::EPSILON;
    const DEFAULT_TOLERANCE: Self = 1e-4;
    const MIN_STEP_SIZE: Self = 1e-20;
}

impl Scalar for f64 {
    const EPSILON: Self = f64::EPSILON;
    const DEFAULT_TOLERANCE: Self = 1e-6;
    const MIN_STEP_SIZE: Self = 1e-20;
}

/// Heap-allocated vector of run length.
///
/// Every point, gradient and search direction in a run shares one length,
/// fixed when the run starts.
pub type DVector<T> = OVector<T, Dyn>;

/// Defaults of the line search and the termination window.
pub mod constants {
    /// Armijo sufficient-decrease constant.
    pub const ARMIJO_C1: f64 = 1e-4;

    /// Backtracking factor after the first iteration.
    pub const BACKOFF: f64 = 0.5;

    /// Backtracking factor on the first iteration, where no curvature
    /// information is available yet.
    pub const FIRST_ITERATION_BACKOFF: f64 = 0.1;

    /// Number of objective values that must be held before the
    /// relative-improvement criterion reports a finite value.
    pub const TERMINATION_MIN_SAMPLES: usize = 5;

    /// Maximum number of objective values held by the termination window.
    pub const TERMINATION_WINDOW: usize = 10;
}
