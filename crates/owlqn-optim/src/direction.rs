//! Search direction for OWL-QN.
//!
//! The direction is built in three steps:
//!
//! 1. **Pseudo-gradient.** The steepest descent direction of
//!    `F(x) = f(x) + λ·‖x‖₁`, which is well defined even where `F` is not
//!    differentiable:
//!
//!    ```text
//!    x_i < 0              : d_i = −(g_i − λ)
//!    x_i > 0              : d_i = −(g_i + λ)
//!    x_i = 0, g_i < −λ    : d_i = −(g_i + λ)
//!    x_i = 0, g_i >  λ    : d_i = −(g_i − λ)
//!    x_i = 0, otherwise   : d_i = 0
//!    ```
//!
//! 2. **Two-loop recursion.** The pseudo-gradient is mapped through the
//!    L-BFGS approximation of the inverse Hessian built from the stored
//!    curvature pairs.
//!
//! 3. **Sign projection.** Every coordinate whose sign disagrees with the
//!    pseudo-gradient is zeroed, keeping the step inside the orthant the
//!    pseudo-gradient points into.
//!
//! With `λ = 0` the first step is `d = −g` and the projection is skipped, so
//! the method reduces to plain L-BFGS.

use crate::state::OptimizerState;
use owlqn_core::{error::OptimizerResult, linalg, types::Scalar};

impl<T: Scalar> OptimizerState<T> {
    /// Computes the full search direction into `dir`.
    pub fn update_dir(&mut self) -> OptimizerResult<()> {
        self.make_steepest_desc_dir()?;
        self.map_dir_by_inverse_hessian()?;
        self.fix_dir_signs();
        Ok(())
    }

    /// Writes the pseudo-gradient into `dir` and saves a copy of it.
    pub fn make_steepest_desc_dir(&mut self) -> OptimizerResult<()> {
        let l1 = self.l1_weight;
        if l1 == T::zero() {
            for (d, &g) in self.dir.iter_mut().zip(self.grad.iter()) {
                *d = -g;
            }
        } else {
            for ((d, &g), &x) in self
                .dir
                .iter_mut()
                .zip(self.grad.iter())
                .zip(self.x.iter())
            {
                *d = pseudo_gradient_coordinate(x, g, l1);
            }
        }
        linalg::copy_into(&mut self.steepest_desc_dir, &self.dir)?;
        Ok(())
    }

    /// Applies the two-loop recursion to `dir` in place.
    ///
    /// Does nothing while the history is empty.
    pub fn map_dir_by_inverse_hessian(&mut self) -> OptimizerResult<()> {
        let count = self.history.len();
        if count == 0 {
            return Ok(());
        }

        let history = &mut self.history;

        for k in 0..count {
            let slot = history.slot(k);
            let alpha = -linalg::dot(&history.s[slot], &self.dir)? / history.ro[slot];
            history.alpha[slot] = alpha;
            linalg::add_mult(&mut self.dir, &history.y[slot], alpha)?;
        }

        let newest = history.slot(0);
        let y_last = &history.y[newest];
        let gamma = history.ro[newest] / linalg::dot(y_last, y_last)?;
        linalg::scale(&mut self.dir, gamma);

        for k in (0..count).rev() {
            let slot = history.slot(k);
            let beta = linalg::dot(&history.y[slot], &self.dir)? / history.ro[slot];
            linalg::add_mult(&mut self.dir, &history.s[slot], -history.alpha[slot] - beta)?;
        }

        Ok(())
    }

    /// Zeroes every coordinate of `dir` whose sign disagrees with the
    /// pseudo-gradient. A no-op when `λ = 0`.
    pub fn fix_dir_signs(&mut self) {
        if self.l1_weight > T::zero() {
            for (d, &v) in self.dir.iter_mut().zip(self.steepest_desc_dir.iter()) {
                if *d * v <= T::zero() {
                    *d = T::zero();
                }
            }
        }
    }

    /// Directional derivative of `F` at `x` along `dir`.
    ///
    /// For `λ > 0` the one-sided derivative of `|x_i|` is taken in the
    /// direction of `dir_i`, so coordinates at zero contribute `+λ·|dir_i|`.
    pub fn dir_deriv(&self) -> OptimizerResult<T> {
        let l1 = self.l1_weight;
        if l1 == T::zero() {
            return Ok(linalg::dot(&self.dir, &self.grad)?);
        }

        let mut value = T::zero();
        for ((&d, &g), &x) in self
            .dir
            .iter()
            .zip(self.grad.iter())
            .zip(self.x.iter())
        {
            if d != T::zero() {
                let zero = T::zero();
                if x < zero || (x == zero && d < zero) {
                    value += d * (g - l1);
                } else {
                    value += d * (g + l1);
                }
            }
        }
        Ok(value)
    }

    /// True when the pseudo-gradient is exactly zero, i.e. `x` is a
    /// stationary point of `F`.
    pub fn is_stationary(&self) -> bool {
        self.steepest_desc_dir.iter().all(|&v| v == T::zero())
    }

    /// Euclidean norm of the pseudo-gradient.
    pub fn steepest_desc_norm(&self) -> T {
        linalg::norm(&self.steepest_desc_dir)
    }
}

/// One coordinate of the pseudo-gradient direction for `λ > 0`.
#[inline]
fn pseudo_gradient_coordinate<T: Scalar>(x: T, g: T, l1: T) -> T {
    let zero = T::zero();
    if x < zero {
        -(g - l1)
    } else if x > zero {
        -(g + l1)
    } else if g < -l1 {
        -(g + l1)
    } else if g > l1 {
        -(g - l1)
    } else {
        zero
    }
}
