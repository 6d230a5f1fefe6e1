//! Limited-memory curvature history.
//!
//! The history holds the `m` most recent curvature pairs `(s, y)` with
//! `s = x_{k+1} − x_k`, `y = ∇f(x_{k+1}) − ∇f(x_k)` and `ro = s·y`. It is a
//! fixed-capacity ring: push `k` lands in slot `k mod m` and only the
//! `min(pushes, m)` most recent slots are valid. All buffers are allocated
//! once when the run starts.

use owlqn_core::{
    error::{OptimizerError, OptimizerResult, Result},
    linalg,
    types::{DVector, Scalar},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What to do with a curvature pair whose product `s·y` is not safely positive.
///
/// A pair is rejected when `ro` is not finite or `ro ≤ ε·(y·y)`, `ε` being
/// the machine epsilon of the scalar type. Storing it would make the
/// inverse-Hessian approximation indefinite or divide by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CurvaturePolicy {
    /// Commit the step without storing the pair and log a warning.
    #[default]
    Skip,
    /// Fail the run with `NumericInstability`.
    Error,
}

/// Result of offering a curvature pair to the history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairUpdate<T> {
    /// The pair was stored with the given curvature product.
    Stored(T),
    /// The pair was rejected; the curvature product is reported.
    Rejected(T),
}

/// Fixed-capacity ring of curvature pairs.
#[derive(Debug, Clone)]
pub struct CurvatureHistory<T: Scalar> {
    pub(crate) s: Vec<DVector<T>>,
    pub(crate) y: Vec<DVector<T>>,
    pub(crate) ro: Vec<T>,
    pub(crate) alpha: Vec<T>,
    s_scratch: DVector<T>,
    y_scratch: DVector<T>,
    len: usize,
    next: usize,
}

impl<T: Scalar> CurvatureHistory<T> {
    /// Allocates a history of `capacity` pairs for vectors of length `dim`.
    ///
    /// A zero `capacity` is rejected with `InvalidConfiguration`.
    pub fn new(dim: usize, capacity: usize) -> OptimizerResult<Self> {
        if capacity == 0 {
            return Err(OptimizerError::invalid_configuration(
                "Memory size must be positive",
                "memory_size",
                "0",
            ));
        }
        Ok(Self {
            s: vec![linalg::zeros(dim); capacity],
            y: vec![linalg::zeros(dim); capacity],
            ro: vec![T::zero(); capacity],
            alpha: vec![T::zero(); capacity],
            s_scratch: linalg::zeros(dim),
            y_scratch: linalg::zeros(dim),
            len: 0,
            next: 0,
        })
    }

    /// Maximum number of stored pairs.
    pub fn capacity(&self) -> usize {
        self.ro.len()
    }

    /// Number of valid pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no pair has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Ring slot of the `k`-th most recent pair (`k = 0` is the newest).
    pub fn slot(&self, k: usize) -> usize {
        debug_assert!(k < self.len);
        let cap = self.capacity();
        (self.next + cap - 1 - k) % cap
    }

    /// Slot indices from newest to oldest.
    pub fn newest_first(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).map(move |k| self.slot(k))
    }

    /// Curvature product stored in `slot`.
    pub fn ro(&self, slot: usize) -> T {
        self.ro[slot]
    }

    /// Position difference stored in `slot`.
    pub fn s(&self, slot: usize) -> &DVector<T> {
        &self.s[slot]
    }

    /// Gradient difference stored in `slot`.
    pub fn y(&self, slot: usize) -> &DVector<T> {
        &self.y[slot]
    }

    /// Forms the pair from two consecutive iterates and stores it if its
    /// curvature is safely positive.
    ///
    /// A rejected pair leaves every stored pair untouched.
    pub fn push(
        &mut self,
        x: &DVector<T>,
        new_x: &DVector<T>,
        grad: &DVector<T>,
        new_grad: &DVector<T>,
    ) -> Result<PairUpdate<T>> {
        linalg::sub_into(&mut self.s_scratch, new_x, x)?;
        linalg::sub_into(&mut self.y_scratch, new_grad, grad)?;

        let ro = linalg::dot(&self.s_scratch, &self.y_scratch)?;
        let yy = linalg::dot(&self.y_scratch, &self.y_scratch)?;

        if !num_traits::Float::is_finite(ro) || ro <= <T as Scalar>::EPSILON * yy {
            return Ok(PairUpdate::Rejected(ro));
        }

        let slot = self.next;
        std::mem::swap(&mut self.s[slot], &mut self.s_scratch);
        std::mem::swap(&mut self.y[slot], &mut self.y_scratch);
        self.ro[slot] = ro;
        self.next = (slot + 1) % self.capacity();
        self.len = (self.len + 1).min(self.capacity());

        Ok(PairUpdate::Stored(ro))
    }

    /// Forgets every stored pair without releasing memory.
    pub fn clear(&mut self) {
        self.len = 0;
        self.next = 0;
    }
}
