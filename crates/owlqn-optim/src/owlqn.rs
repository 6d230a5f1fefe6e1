//! Orthant-Wise Limited-memory Quasi-Newton optimizer.
//!
//! OWL-QN minimizes `F(x) = f(x) + λ·‖x‖₁` for convex differentiable `f`.
//! It is L-BFGS restricted, at every iteration, to the orthant selected by
//! the pseudo-gradient, which lets coordinates reach exactly zero and stay
//! there. With `λ = 0` it is plain L-BFGS with a backtracking line search.
//!
//! # Iteration
//!
//! ```text
//! evaluate F(x₀)
//! loop:
//!     v = pseudo-gradient at x            (stop if v = 0)
//!     d = two-loop(v), zero d_i where d_i·v_i ≤ 0
//!     backtrack along d with orthant projection until Armijo holds
//!     stop if the windowed relative improvement < tol
//!     store (s, y), commit the step        (stop at max_iterations)
//! ```
//!
//! # References
//!
//! - Andrew & Gao, "Scalable Training of L1-Regularized Log-Linear Models" (2007)
//! - Nocedal & Wright, "Numerical Optimization" (2006)
//!
//! # Examples
//!
//! ```rust
//! use owlqn_core::prelude::*;
//! use owlqn_optim::{OWLQNConfig, OWLQN};
//!
//! let cost = QuadraticCost::with_target(DVector::from_vec(vec![2.0, 0.3, -1.0]));
//! let optimizer = OWLQN::new(OWLQNConfig::<f64>::new().with_l1_weight(0.5));
//!
//! let result = optimizer
//!     .minimize_with_callback(&cost, &DVector::from_element(3, 1.0), &mut NoOpCallback)
//!     .unwrap();
//! assert_eq!(result.point[1], 0.0);
//! ```

use crate::{
    history::CurvaturePolicy,
    line_search::LineSearchParams,
    state::{OptimizerState, ShiftOutcome},
    termination::RelativeImprovementCriterion,
};
use num_traits::Float;
use owlqn_core::{
    callback::{CallbackInfo, FinalInfo, NoOpCallback, OptimizationCallback},
    cost_function::CostFunction,
    error::{OptimizerError, OptimizerResult},
    linalg,
    optimizer::{OptimizationResult, Optimizer, TerminationReason},
    types::{DVector, Scalar},
};
use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the OWL-QN optimizer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OWLQNConfig<T: Scalar> {
    /// L1 regularization weight λ ≥ 0
    pub l1_weight: T,
    /// Stop when the relative average improvement falls below this value
    pub tolerance: T,
    /// Number of curvature pairs to store (m > 0)
    pub memory_size: usize,
    /// Iteration cap; `None` runs until convergence or failure
    pub max_iterations: Option<usize>,
    /// Backtracking line search parameters
    pub line_search: LineSearchParams<T>,
    /// Handling of curvature pairs with non-positive `s·y`
    pub curvature_policy: CurvaturePolicy,
    /// Suppresses the per-run header log line
    pub quiet: bool,
    /// Compares the analytic directional derivative with a finite
    /// difference on every iteration and logs both at `debug` level
    pub check_directional_derivative: bool,
}

impl<T: Scalar> Default for OWLQNConfig<T> {
    fn default() -> Self {
        Self {
            l1_weight: T::zero(),
            tolerance: <T as Scalar>::DEFAULT_TOLERANCE,
            memory_size: 10,
            max_iterations: Some(1000),
            line_search: LineSearchParams::default(),
            curvature_policy: CurvaturePolicy::default(),
            quiet: false,
            check_directional_derivative: false,
        }
    }
}

impl<T: Scalar> OWLQNConfig<T> {
    /// Default configuration: no L1 term, memory 10, at most 1000 iterations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the L1 regularization weight.
    #[must_use]
    pub fn with_l1_weight(mut self, l1_weight: T) -> Self {
        self.l1_weight = l1_weight;
        self
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: T) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the memory size (number of curvature pairs to store).
    #[must_use]
    pub fn with_memory_size(mut self, memory_size: usize) -> Self {
        self.memory_size = memory_size;
        self
    }

    /// Sets the iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Removes the iteration cap.
    #[must_use]
    pub fn without_max_iterations(mut self) -> Self {
        self.max_iterations = None;
        self
    }

    /// Replaces the backtracking parameters.
    #[must_use]
    pub fn with_line_search(mut self, line_search: LineSearchParams<T>) -> Self {
        self.line_search = line_search;
        self
    }

    /// Sets the curvature pair policy.
    #[must_use]
    pub fn with_curvature_policy(mut self, policy: CurvaturePolicy) -> Self {
        self.curvature_policy = policy;
        self
    }

    /// Enables or disables the per-run header log line.
    #[must_use]
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Enables or disables the finite-difference directional derivative check.
    #[must_use]
    pub fn with_directional_derivative_check(mut self, enabled: bool) -> Self {
        self.check_directional_derivative = enabled;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> OptimizerResult<()> {
        if self.memory_size == 0 {
            return Err(OptimizerError::invalid_configuration(
                "Memory size must be positive",
                "memory_size",
                "0",
            ));
        }
        if !(self.tolerance > T::zero() && Float::is_finite(self.tolerance)) {
            return Err(OptimizerError::invalid_configuration(
                "Tolerance must be positive and finite",
                "tolerance",
                self.tolerance.to_string(),
            ));
        }
        if !(self.l1_weight >= T::zero() && Float::is_finite(self.l1_weight)) {
            return Err(OptimizerError::invalid_configuration(
                "L1 weight must be non-negative and finite",
                "l1_weight",
                self.l1_weight.to_string(),
            ));
        }
        if self.max_iterations == Some(0) {
            return Err(OptimizerError::invalid_configuration(
                "Maximum iterations must be at least 1",
                "max_iterations",
                "0",
            ));
        }
        self.line_search.validate()
    }
}

/// OWL-QN optimizer.
///
/// # Examples
///
/// ```rust
/// use owlqn_optim::{OWLQNConfig, OWLQN};
///
/// // L1-regularized run with a small history
/// let owlqn = OWLQN::new(
///     OWLQNConfig::<f32>::new()
///         .with_l1_weight(0.01)
///         .with_memory_size(5)
///         .with_tolerance(1e-4),
/// );
/// assert_eq!(owlqn.config().memory_size, 5);
/// ```
#[derive(Debug, Clone)]
pub struct OWLQN<T: Scalar> {
    config: OWLQNConfig<T>,
}

impl<T: Scalar> Default for OWLQN<T> {
    fn default() -> Self {
        Self::new(OWLQNConfig::default())
    }
}

impl<T: Scalar> OWLQN<T> {
    /// Creates a new optimizer with the given configuration.
    pub fn new(config: OWLQNConfig<T>) -> Self {
        Self { config }
    }

    /// Configuration this optimizer runs with.
    pub fn config(&self) -> &OWLQNConfig<T> {
        &self.config
    }

    /// Minimizes `f + λ·‖·‖₁` from `initial_point` and writes the optimized
    /// point into `result`.
    ///
    /// `result` must have the same length as `initial_point`. It is left
    /// untouched when the run fails.
    pub fn minimize_into<C: CostFunction<T>>(
        &self,
        cost_fn: &C,
        initial_point: &DVector<T>,
        result: &mut DVector<T>,
    ) -> OptimizerResult<OptimizationResult<T>> {
        if result.len() != initial_point.len() {
            return Err(OptimizerError::dimension_mismatch(
                initial_point.len(),
                result.len(),
            ));
        }
        let outcome = self.minimize_with_callback(cost_fn, initial_point, &mut NoOpCallback)?;
        linalg::copy_into(result, &outcome.point)?;
        Ok(outcome)
    }

    /// Minimizes `f + λ·‖·‖₁` from `initial_point`, reporting progress to
    /// `callback`.
    pub fn minimize_with_callback<C, CB>(
        &self,
        cost_fn: &C,
        initial_point: &DVector<T>,
        callback: &mut CB,
    ) -> OptimizerResult<OptimizationResult<T>>
    where
        C: CostFunction<T>,
        CB: OptimizationCallback<T> + ?Sized,
    {
        let start_time = Instant::now();
        let config = &self.config;
        config.validate()?;

        let mut state = OptimizerState::new(
            cost_fn,
            initial_point,
            config.memory_size,
            config.l1_weight,
        )?;

        if !config.quiet {
            log::info!(
                "OWL-QN: dimension {}, l1 weight {}, memory {}, tolerance {:e}, initial value {:e}",
                state.dim(),
                config.l1_weight,
                config.memory_size,
                Scalar::to_f64(config.tolerance),
                Scalar::to_f64(state.value())
            );
        }
        callback.on_optimization_start(state.value())?;

        let mut termination = RelativeImprovementCriterion::new();

        let (reason, iterations) = loop {
            state.make_steepest_desc_dir()?;
            if state.is_stationary() {
                log::debug!("iteration {}: pseudo-gradient vanished", state.iter());
                break (TerminationReason::Converged, state.iter());
            }
            state.map_dir_by_inverse_hessian()?;
            state.fix_dir_signs();

            if config.check_directional_derivative {
                check_directional_derivative(&mut state, cost_fn)?;
            }

            let step = state.backtracking_line_search(cost_fn, &config.line_search)?;
            let improvement = termination.get_value(step.value);

            log::debug!(
                "iteration {}: value = {:e}, step = {:e} ({} trials), improvement = {:e}, nonzeros = {}",
                state.iter() + 1,
                Scalar::to_f64(step.value),
                Scalar::to_f64(step.step_size),
                step.trials,
                Scalar::to_f64(improvement),
                linalg::count_nonzero(state.new_x())
            );

            // A converged step is reported but not committed to the history.
            let converged = improvement < config.tolerance;
            if !converged && state.shift(config.curvature_policy)? == ShiftOutcome::Skipped {
                log::debug!("iteration {}: history unchanged", state.iter());
            }

            let (iteration, point) = if converged {
                (state.iter() + 1, state.new_x())
            } else {
                (state.iter(), state.x())
            };
            let info = CallbackInfo {
                iteration,
                point,
                value: state.value(),
                step_size: step.step_size,
                relative_improvement: improvement,
                nonzero_count: linalg::count_nonzero(point),
                elapsed: start_time.elapsed(),
            };
            let keep_going = callback.on_iteration_end(&info)?;

            if converged {
                break (TerminationReason::Converged, iteration);
            }
            if !keep_going {
                break (TerminationReason::CallbackRequest, iteration);
            }

            if let Some(max_iterations) = config.max_iterations {
                if state.iter() >= max_iterations {
                    break (TerminationReason::MaxIterations, state.iter());
                }
            }
        };

        // `new_x` is the accepted candidate, or equals `x` when the loop
        // stopped after a shift or at a stationary point.
        let point = state.new_x().clone();

        let result = OptimizationResult::new(
            point,
            state.value(),
            iterations,
            start_time.elapsed(),
            reason,
        )
        .with_function_evaluations(state.function_evaluations())
        .with_pseudo_gradient_norm(state.steepest_desc_norm());

        log::info!(
            "OWL-QN {} after {} iterations: value {:e}, {} of {} coordinates non-zero",
            reason,
            iterations,
            Scalar::to_f64(result.value),
            result.nonzero_count,
            result.point.len()
        );

        callback.on_optimization_end(&FinalInfo {
            point: &result.point,
            value: result.value,
            iterations,
            termination_reason: reason,
            elapsed: result.duration,
        })?;

        Ok(result)
    }
}

/// Logs the analytic directional derivative next to a forward difference.
///
/// Uses `new_x`/`new_grad` as scratch; `x`, `grad` and `dir` are unchanged.
fn check_directional_derivative<T, C>(
    state: &mut OptimizerState<T>,
    cost_fn: &C,
) -> OptimizerResult<()>
where
    T: Scalar,
    C: CostFunction<T>,
{
    let dir_norm = linalg::norm(state.dir());
    if dir_norm == T::zero() {
        return Ok(());
    }
    let eps = Float::sqrt(<T as Scalar>::EPSILON) / dir_norm;
    state.get_next_point(eps)?;
    let shifted = state.eval_l1(cost_fn)?;
    let numerical = (shifted - state.value()) / eps;
    let analytic = state.dir_deriv()?;

    log::debug!(
        "directional derivative check at iteration {}: numerical {:e}, analytic {:e}",
        state.iter(),
        Scalar::to_f64(numerical),
        Scalar::to_f64(analytic)
    );
    Ok(())
}

impl<T: Scalar> Optimizer<T> for OWLQN<T> {
    fn name(&self) -> &str {
        "OWL-QN"
    }

    fn minimize<C: CostFunction<T>>(
        &mut self,
        cost_fn: &C,
        initial_point: &DVector<T>,
    ) -> OptimizerResult<OptimizationResult<T>> {
        self.minimize_with_callback(cost_fn, initial_point, &mut NoOpCallback)
    }
}

/// Minimizes `f + l1_weight·‖·‖₁` from `initial_point` into `result` with
/// default settings for everything else.
pub fn minimize<T, C>(
    cost_fn: &C,
    initial_point: &DVector<T>,
    result: &mut DVector<T>,
    l1_weight: T,
    tolerance: T,
    memory_size: usize,
) -> OptimizerResult<OptimizationResult<T>>
where
    T: Scalar,
    C: CostFunction<T>,
{
    let config = OWLQNConfig::new()
        .with_l1_weight(l1_weight)
        .with_tolerance(tolerance)
        .with_memory_size(memory_size);
    OWLQN::new(config).minimize_into(cost_fn, initial_point, result)
}
