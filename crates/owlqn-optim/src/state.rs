//! Mutable state of one OWL-QN run.
//!
//! The state owns every buffer the run needs: the current iterate and its
//! gradient, the candidate produced by the line search and its gradient, the
//! search direction, a separate copy of the pseudo-gradient, and the
//! curvature history. It is created once per minimize call and mutated in
//! place.
//!
//! Direction computation lives in [`crate::direction`] and the line search in
//! [`crate::line_search`]; both extend this type.

use crate::history::{CurvatureHistory, CurvaturePolicy, PairUpdate};
use owlqn_core::{
    cost_function::CostFunction,
    error::{OptimizerError, OptimizerResult},
    linalg,
    types::{DVector, Scalar},
};

/// Outcome of committing an accepted step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftOutcome {
    /// The curvature pair was stored.
    Stored,
    /// The curvature pair was rejected and the step committed without it.
    Skipped,
}

/// Buffers and scalars of an OWL-QN run.
#[derive(Debug, Clone)]
pub struct OptimizerState<T: Scalar> {
    pub(crate) x: DVector<T>,
    pub(crate) grad: DVector<T>,
    pub(crate) new_x: DVector<T>,
    pub(crate) new_grad: DVector<T>,
    pub(crate) dir: DVector<T>,
    pub(crate) steepest_desc_dir: DVector<T>,
    pub(crate) history: CurvatureHistory<T>,
    pub(crate) value: T,
    pub(crate) iter: usize,
    pub(crate) l1_weight: T,
    pub(crate) function_evaluations: usize,
}

impl<T: Scalar> OptimizerState<T> {
    /// Allocates the state and evaluates the objective at `initial_point`.
    ///
    /// A zero `memory_size` or an `l1_weight` that is negative or not finite
    /// is rejected with `InvalidConfiguration` before any evaluation.
    pub fn new<C: CostFunction<T>>(
        cost_fn: &C,
        initial_point: &DVector<T>,
        memory_size: usize,
        l1_weight: T,
    ) -> OptimizerResult<Self> {
        if !(l1_weight >= T::zero() && num_traits::Float::is_finite(l1_weight)) {
            return Err(OptimizerError::invalid_configuration(
                "L1 weight must be non-negative and finite",
                "l1_weight",
                l1_weight.to_string(),
            ));
        }
        let history = CurvatureHistory::new(initial_point.len(), memory_size)?;

        let dim = initial_point.len();
        if let Some(expected) = cost_fn.dimension() {
            if expected != dim {
                return Err(OptimizerError::dimension_mismatch(expected, dim));
            }
        }

        let mut state = Self {
            x: initial_point.clone(),
            grad: linalg::zeros(dim),
            new_x: initial_point.clone(),
            new_grad: linalg::zeros(dim),
            dir: linalg::zeros(dim),
            steepest_desc_dir: linalg::zeros(dim),
            history,
            value: T::zero(),
            iter: 0,
            l1_weight,
            function_evaluations: 0,
        };

        state.value = state.eval_l1(cost_fn)?;
        linalg::copy_into(&mut state.grad, &state.new_grad)?;

        Ok(state)
    }

    /// Evaluates `F(new_x) = f(new_x) + λ·‖new_x‖₁`, writing `∇f(new_x)`
    /// into `new_grad`.
    pub(crate) fn eval_l1<C: CostFunction<T>>(&mut self, cost_fn: &C) -> OptimizerResult<T> {
        self.function_evaluations += 1;
        let value = cost_fn.evaluate(&self.new_x, &mut self.new_grad)?;
        if self.l1_weight > T::zero() {
            Ok(value + self.l1_weight * linalg::l1_norm(&self.new_x))
        } else {
            Ok(value)
        }
    }

    /// Commits the accepted candidate.
    ///
    /// The curvature pair `(new_x − x, new_grad − grad)` is offered to the
    /// history; then `x ← new_x`, `grad ← new_grad` and `iter` increments.
    /// Under [`CurvaturePolicy::Error`] a rejected pair fails the run before
    /// anything is committed.
    pub fn shift(&mut self, policy: CurvaturePolicy) -> OptimizerResult<ShiftOutcome> {
        let update = self
            .history
            .push(&self.x, &self.new_x, &self.grad, &self.new_grad)?;

        let outcome = match update {
            PairUpdate::Stored(_) => ShiftOutcome::Stored,
            PairUpdate::Rejected(ro) => match policy {
                CurvaturePolicy::Skip => {
                    log::warn!(
                        "iteration {}: skipping curvature pair with s·y = {:e}",
                        self.iter,
                        Scalar::to_f64(ro)
                    );
                    ShiftOutcome::Skipped
                }
                CurvaturePolicy::Error => {
                    return Err(OptimizerError::numeric_instability(
                        format!("curvature product s·y = {} is not safely positive", ro),
                        self.iter,
                    ));
                }
            },
        };

        linalg::copy_into(&mut self.x, &self.new_x)?;
        linalg::copy_into(&mut self.grad, &self.new_grad)?;
        self.iter += 1;

        Ok(outcome)
    }

    /// Current iterate.
    pub fn x(&self) -> &DVector<T> {
        &self.x
    }

    /// Gradient of the smooth part at the current iterate.
    pub fn grad(&self) -> &DVector<T> {
        &self.grad
    }

    /// Last candidate evaluated by the line search.
    pub fn new_x(&self) -> &DVector<T> {
        &self.new_x
    }

    /// Gradient of the smooth part at the last candidate.
    pub fn new_grad(&self) -> &DVector<T> {
        &self.new_grad
    }

    /// Current search direction.
    pub fn dir(&self) -> &DVector<T> {
        &self.dir
    }

    /// Pseudo-gradient (steepest descent direction of `F`) at the current iterate.
    pub fn steepest_desc_dir(&self) -> &DVector<T> {
        &self.steepest_desc_dir
    }

    /// Curvature history.
    pub fn history(&self) -> &CurvatureHistory<T> {
        &self.history
    }

    /// Objective value of the last accepted point.
    pub fn value(&self) -> T {
        self.value
    }

    /// Number of accepted steps.
    pub fn iter(&self) -> usize {
        self.iter
    }

    /// L1 regularization weight.
    pub fn l1_weight(&self) -> T {
        self.l1_weight
    }

    /// Dimension of the problem.
    pub fn dim(&self) -> usize {
        self.x.len()
    }

    /// Number of cost-function evaluations so far.
    pub fn function_evaluations(&self) -> usize {
        self.function_evaluations
    }
}
