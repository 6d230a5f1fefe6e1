//! Callback support for optimization runs.
//!
//! This module provides traits and types for implementing callbacks that can
//! monitor and control an optimization run.

use crate::error::OptimizerResult;
use crate::optimizer::TerminationReason;
use crate::types::{DVector, Scalar};
use std::time::Duration;

/// Information passed to callbacks after each committed step.
#[derive(Clone, Debug)]
pub struct CallbackInfo<'a, T: Scalar> {
    /// Number of accepted steps so far
    pub iteration: usize,

    /// The accepted point
    pub point: &'a DVector<T>,

    /// Objective value `f(x) + λ·‖x‖₁` at the accepted point
    pub value: T,

    /// Step size chosen by the line search
    pub step_size: T,

    /// Relative improvement reported by the termination criterion
    pub relative_improvement: T,

    /// Number of non-zero coordinates in the accepted point
    pub nonzero_count: usize,

    /// Elapsed time since the run started
    pub elapsed: Duration,
}

/// Summary passed to callbacks when a run terminates normally.
#[derive(Clone, Debug)]
pub struct FinalInfo<'a, T: Scalar> {
    /// The returned point
    pub point: &'a DVector<T>,

    /// Objective value at the returned point
    pub value: T,

    /// Number of accepted steps
    pub iterations: usize,

    /// Why the run stopped
    pub termination_reason: TerminationReason,

    /// Elapsed time since the run started
    pub elapsed: Duration,
}

/// Trait for optimization callbacks.
///
/// Callbacks allow monitoring and controlling the optimization run.
/// They can be used for logging, recording traces, early stopping, etc.
pub trait OptimizationCallback<T: Scalar> {
    /// Called once the initial point has been evaluated.
    fn on_optimization_start(&mut self, initial_value: T) -> OptimizerResult<()> {
        let _ = initial_value;
        Ok(())
    }

    /// Called after each accepted step, including the one that meets the
    /// convergence test.
    ///
    /// Returns `true` to continue optimization, `false` to stop early. A
    /// stop request on the converging step is ignored and the run still
    /// reports `Converged`. A run that stops at a stationary point takes no
    /// step there, so that point arrives only through
    /// [`on_optimization_end`](Self::on_optimization_end).
    fn on_iteration_end(&mut self, info: &CallbackInfo<'_, T>) -> OptimizerResult<bool> {
        let _ = info;
        Ok(true)
    }

    /// Called when the run terminates without error.
    fn on_optimization_end(&mut self, info: &FinalInfo<'_, T>) -> OptimizerResult<()> {
        let _ = info;
        Ok(())
    }
}

/// A no-op callback that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl<T: Scalar> OptimizationCallback<T> for NoOpCallback {}

/// A callback that reports progress through the `log` facade at `info` level.
#[derive(Debug, Clone)]
pub struct LoggingCallback {
    log_every: usize,
}

impl LoggingCallback {
    /// Creates a callback that logs every `log_every` iterations.
    ///
    /// A period of zero is treated as one.
    pub fn new(log_every: usize) -> Self {
        Self {
            log_every: log_every.max(1),
        }
    }
}

impl Default for LoggingCallback {
    fn default() -> Self {
        Self::new(1)
    }
}

impl<T: Scalar> OptimizationCallback<T> for LoggingCallback {
    fn on_optimization_start(&mut self, initial_value: T) -> OptimizerResult<()> {
        log::info!(
            "starting optimization, initial value {:.6e}",
            Scalar::to_f64(initial_value)
        );
        Ok(())
    }

    fn on_iteration_end(&mut self, info: &CallbackInfo<'_, T>) -> OptimizerResult<bool> {
        if info.iteration % self.log_every == 0 {
            log::info!(
                "iteration {}: value = {:.6e}, step = {:.3e}, improvement = {:.3e}, nonzeros = {}/{}",
                info.iteration,
                Scalar::to_f64(info.value),
                Scalar::to_f64(info.step_size),
                Scalar::to_f64(info.relative_improvement),
                info.nonzero_count,
                info.point.len()
            );
        }
        Ok(true)
    }

    fn on_optimization_end(&mut self, info: &FinalInfo<'_, T>) -> OptimizerResult<()> {
        log::info!(
            "optimization finished after {} iterations ({}), final value {:.6e}",
            info.iterations,
            info.termination_reason,
            Scalar::to_f64(info.value)
        );
        Ok(())
    }
}
