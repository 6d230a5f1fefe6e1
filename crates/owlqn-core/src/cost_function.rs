//! Cost function interface for OWL-QN.
//!
//! A cost function supplies the smooth part `f` of the objective
//! `F(x) = f(x) + λ·‖x‖₁`. The optimizer adds the L1 term itself, so
//! implementations must never include it.
//!
//! The interface is a single in-place evaluation: given a point, return the
//! value and write the gradient into a caller-owned buffer. The optimizer
//! allocates its gradient buffers once per run and reuses them.
//!
//! # Examples
//!
//! ```rust
//! use owlqn_core::cost_function::{CostFunction, QuadraticCost};
//! use owlqn_core::types::DVector;
//!
//! let cost = QuadraticCost::<f64>::simple(3);
//! let point = DVector::from_vec(vec![1.0, 2.0, 3.0]);
//! let mut gradient = DVector::zeros(3);
//!
//! let value = cost.evaluate(&point, &mut gradient).unwrap();
//! assert_eq!(value, 7.0);
//! assert_eq!(gradient, point);
//! ```

use crate::{
    error::{ObjectiveError, Result},
    linalg,
    types::{DVector, Scalar},
};
use num_traits::Float;
use std::cell::Cell;
use std::fmt::{self, Debug};

/// Trait for the differentiable part of an OWL-QN objective.
pub trait CostFunction<T: Scalar>: Debug {
    /// Evaluates the cost at `point` and writes its gradient into `gradient`.
    ///
    /// `gradient` has the same length as `point`; its previous contents are
    /// unspecified and must be fully overwritten.
    fn evaluate(&self, point: &DVector<T>, gradient: &mut DVector<T>) -> Result<T>;

    /// Evaluates the cost only.
    ///
    /// The default implementation allocates a scratch gradient.
    fn cost(&self, point: &DVector<T>) -> Result<T> {
        let mut scratch = linalg::zeros(point.len());
        self.evaluate(point, &mut scratch)
    }

    /// Dimension of the domain, if the cost function knows it.
    ///
    /// The optimizer rejects initial points of a different length up front.
    fn dimension(&self) -> Option<usize> {
        None
    }

    /// Approximates the gradient with central finite differences.
    fn gradient_fd(&self, point: &DVector<T>) -> Result<DVector<T>> {
        let n = point.len();
        let h = <T as Float>::sqrt(<T as Scalar>::EPSILON);
        let two_h = h + h;
        let mut gradient = linalg::zeros(n);
        let mut probe = point.clone();

        for i in 0..n {
            let saved = probe[i];
            probe[i] = saved + h;
            let f_plus = self.cost(&probe)?;
            probe[i] = saved - h;
            let f_minus = self.cost(&probe)?;
            probe[i] = saved;

            gradient[i] = (f_plus - f_minus) / two_h;
        }

        Ok(gradient)
    }
}

impl<T: Scalar, C: CostFunction<T> + ?Sized> CostFunction<T> for &C {
    fn evaluate(&self, point: &DVector<T>, gradient: &mut DVector<T>) -> Result<T> {
        (**self).evaluate(point, gradient)
    }

    fn cost(&self, point: &DVector<T>) -> Result<T> {
        (**self).cost(point)
    }

    fn dimension(&self) -> Option<usize> {
        (**self).dimension()
    }
}

fn check_point<T: Scalar>(
    expected: usize,
    point: &DVector<T>,
    gradient: &DVector<T>,
) -> Result<()> {
    if point.len() != expected {
        return Err(ObjectiveError::dimension_mismatch(expected, point.len()));
    }
    if gradient.len() != expected {
        return Err(ObjectiveError::dimension_mismatch(expected, gradient.len()));
    }
    Ok(())
}

/// A separable quadratic around a target point.
///
/// Computes `f(x) = 0.5 · Σ_i scales_i · (x_i − target_i)²`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticCost<T: Scalar> {
    /// Per-coordinate curvature (should be positive)
    pub scales: DVector<T>,
    /// Minimizer of the unregularized cost
    pub target: DVector<T>,
}

impl<T: Scalar> QuadraticCost<T> {
    /// `0.5·Σ scale_i·(x_i − target_i)²`; scales must be positive.
    pub fn new(scales: DVector<T>, target: DVector<T>) -> Result<Self> {
        if scales.len() != target.len() {
            return Err(ObjectiveError::dimension_mismatch(
                target.len(),
                scales.len(),
            ));
        }
        Ok(Self { scales, target })
    }

    /// Unit curvature around `target`: `f(x) = 0.5 · ‖x − target‖²`.
    pub fn with_target(target: DVector<T>) -> Self {
        Self {
            scales: DVector::from_element(target.len(), T::one()),
            target,
        }
    }

    /// Creates a simple quadratic centered at the origin: `f(x) = 0.5 · ‖x‖²`.
    pub fn simple(dim: usize) -> Self {
        Self::with_target(linalg::zeros(dim))
    }
}

impl<T: Scalar> CostFunction<T> for QuadraticCost<T> {
    fn evaluate(&self, point: &DVector<T>, gradient: &mut DVector<T>) -> Result<T> {
        check_point(self.target.len(), point, gradient)?;

        let half = <T as Scalar>::from_f64(0.5);
        let mut value = T::zero();
        for i in 0..point.len() {
            let diff = point[i] - self.target[i];
            gradient[i] = self.scales[i] * diff;
            value += half * self.scales[i] * diff * diff;
        }
        Ok(value)
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.target.len())
    }
}

/// A cost function backed by a closure.
///
/// The closure receives the point and the gradient buffer and returns the
/// value, mirroring [`CostFunction::evaluate`].
pub struct FnCost<F> {
    func: F,
    dimension: Option<usize>,
}

impl<F> FnCost<F> {
    /// Wraps a closure as a cost function with unknown dimension.
    pub fn new(func: F) -> Self {
        Self {
            func,
            dimension: None,
        }
    }

    /// Declares the dimension of the closure's domain.
    #[must_use]
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }
}

impl<F> Debug for FnCost<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCost")
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl<T, F> CostFunction<T> for FnCost<F>
where
    T: Scalar,
    F: Fn(&DVector<T>, &mut DVector<T>) -> T,
{
    fn evaluate(&self, point: &DVector<T>, gradient: &mut DVector<T>) -> Result<T> {
        if let Some(dim) = self.dimension {
            check_point(dim, point, gradient)?;
        } else if gradient.len() != point.len() {
            return Err(ObjectiveError::dimension_mismatch(
                point.len(),
                gradient.len(),
            ));
        }
        Ok((self.func)(point, gradient))
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

/// Adds a ridge penalty `0.5 · weight · ‖x‖²` to an inner cost function.
#[derive(Debug, Clone)]
pub struct L2Regularized<C> {
    /// Smooth part being wrapped
    pub inner: C,
    /// Ridge weight (non-negative)
    pub weight: f64,
}

impl<C> L2Regularized<C> {
    /// Wraps `inner` with a ridge penalty of the given weight.
    pub fn new(inner: C, weight: f64) -> Result<Self> {
        if !(weight >= 0.0 && weight.is_finite()) {
            return Err(ObjectiveError::invalid_point(format!(
                "L2 weight must be finite and non-negative, got {weight}"
            )));
        }
        Ok(Self { inner, weight })
    }
}

impl<T: Scalar, C: CostFunction<T>> CostFunction<T> for L2Regularized<C> {
    fn evaluate(&self, point: &DVector<T>, gradient: &mut DVector<T>) -> Result<T> {
        let mut value = self.inner.evaluate(point, gradient)?;
        if self.weight > 0.0 {
            let weight = <T as Scalar>::from_f64(self.weight);
            let half = <T as Scalar>::from_f64(0.5);
            value += half * weight * linalg::dot(point, point)?;
            linalg::add_mult(gradient, point, weight)?;
        }
        Ok(value)
    }

    fn dimension(&self) -> Option<usize> {
        self.inner.dimension()
    }
}

/// Wrapper to count evaluations for testing and debugging.
#[derive(Debug)]
pub struct CountingCostFunction<C> {
    /// The underlying cost function
    pub inner: C,
    evaluations: Cell<usize>,
}

impl<C> CountingCostFunction<C> {
    /// Wraps `inner` with a zeroed counter.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            evaluations: Cell::new(0),
        }
    }

    /// Number of evaluations since creation or the last reset.
    pub fn evaluations(&self) -> usize {
        self.evaluations.get()
    }

    /// Resets the counter to zero.
    pub fn reset_count(&self) {
        self.evaluations.set(0);
    }
}

impl<T: Scalar, C: CostFunction<T>> CostFunction<T> for CountingCostFunction<C> {
    fn evaluate(&self, point: &DVector<T>, gradient: &mut DVector<T>) -> Result<T> {
        self.evaluations.set(self.evaluations.get() + 1);
        self.inner.evaluate(point, gradient)
    }

    fn dimension(&self) -> Option<usize> {
        self.inner.dimension()
    }
}

/// Utilities for checking gradient implementations.
pub struct DerivativeChecker;

impl DerivativeChecker {
    /// Checks if the analytic gradient matches central finite differences.
    ///
    /// # Returns
    ///
    /// A tuple of (passes, max_error) where max_error is the largest
    /// component-wise absolute difference.
    pub fn check_gradient<T: Scalar>(
        cost_fn: &impl CostFunction<T>,
        point: &DVector<T>,
        tol: T,
    ) -> Result<(bool, T)> {
        let mut analytical = linalg::zeros(point.len());
        cost_fn.evaluate(point, &mut analytical)?;
        let numerical = cost_fn.gradient_fd(point)?;

        let max_error = analytical
            .iter()
            .zip(numerical.iter())
            .map(|(&a, &b)| <T as Float>::abs(a - b))
            .fold(T::zero(), <T as Float>::max);

        Ok((max_error < tol, max_error))
    }
}
