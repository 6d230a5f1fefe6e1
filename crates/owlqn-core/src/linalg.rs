//! Checked vector primitives.
//!
//! Thin wrappers over nalgebra's BLAS-style vector operations. Every
//! function here verifies that its operands share a length and returns
//! [`ObjectiveError::DimensionMismatch`] instead of panicking.
//!
//! # Examples
//!
//! ```rust
//! use owlqn_core::linalg;
//! use owlqn_core::types::DVector;
//!
//! let a = DVector::from_vec(vec![1.0_f64, 2.0, 3.0]);
//! let mut b = DVector::from_vec(vec![1.0_f64, 1.0, 1.0]);
//!
//! assert_eq!(linalg::dot(&a, &b).unwrap(), 6.0);
//!
//! linalg::add_mult(&mut b, &a, 2.0).unwrap();
//! assert_eq!(b.as_slice(), &[3.0, 5.0, 7.0]);
//! ```

use crate::error::{ObjectiveError, Result};
use crate::types::{DVector, Scalar};

#[inline]
fn check_len<T: Scalar>(expected: &DVector<T>, actual: &DVector<T>) -> Result<()> {
    if expected.len() == actual.len() {
        Ok(())
    } else {
        Err(ObjectiveError::dimension_mismatch(
            expected.len(),
            actual.len(),
        ))
    }
}

/// Allocates a zero vector of length `dim`.
pub fn zeros<T: Scalar>(dim: usize) -> DVector<T> {
    DVector::from_element(dim, T::zero())
}

/// Inner product `Σ a_i·b_i`.
pub fn dot<T: Scalar>(a: &DVector<T>, b: &DVector<T>) -> Result<T> {
    check_len(a, b)?;
    Ok(a.dot(b))
}

/// Euclidean norm `√(a·a)`.
pub fn norm<T: Scalar>(a: &DVector<T>) -> T {
    a.norm()
}

/// L1 norm `Σ |a_i|`.
pub fn l1_norm<T: Scalar>(a: &DVector<T>) -> T {
    a.lp_norm(1)
}

/// Number of coordinates that are not exactly zero.
pub fn count_nonzero<T: Scalar>(a: &DVector<T>) -> usize {
    a.iter().filter(|&&ai| ai != T::zero()).count()
}

/// `a ← a + c·b`.
pub fn add_mult<T: Scalar>(a: &mut DVector<T>, b: &DVector<T>, c: T) -> Result<()> {
    check_len(a, b)?;
    a.axpy(c, b, T::one());
    Ok(())
}

/// `out ← a + c·b`.
pub fn add_mult_into<T: Scalar>(
    out: &mut DVector<T>,
    a: &DVector<T>,
    b: &DVector<T>,
    c: T,
) -> Result<()> {
    check_len(a, b)?;
    check_len(a, out)?;
    out.copy_from(a);
    out.axpy(c, b, T::one());
    Ok(())
}

/// `out ← a − b`.
pub fn sub_into<T: Scalar>(out: &mut DVector<T>, a: &DVector<T>, b: &DVector<T>) -> Result<()> {
    check_len(a, b)?;
    check_len(a, out)?;
    out.copy_from(a);
    out.axpy(-T::one(), b, T::one());
    Ok(())
}

/// `a ← c·a`.
pub fn scale<T: Scalar>(a: &mut DVector<T>, c: T) {
    a.scale_mut(c);
}

/// `out ← c·a`.
pub fn scale_into<T: Scalar>(out: &mut DVector<T>, a: &DVector<T>, c: T) -> Result<()> {
    check_len(a, out)?;
    out.copy_from(a);
    out.scale_mut(c);
    Ok(())
}

/// `dst ← src`.
pub fn copy_into<T: Scalar>(dst: &mut DVector<T>, src: &DVector<T>) -> Result<()> {
    check_len(src, dst)?;
    dst.copy_from(src);
    Ok(())
}
