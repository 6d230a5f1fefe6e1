//! Core traits and types for OWL-QN optimization.
//!
//! This crate provides the building blocks shared by the OWL-QN optimizer and
//! the objectives it minimizes: the scalar abstraction, checked vector
//! primitives, the cost-function capability, callbacks and result types.
//!
//! # Key Concepts
//!
//! - **Objective**: `F(x) = f(x) + λ·‖x‖₁` where `f` is convex and differentiable
//! - **Cost function**: supplies `f` and its gradient; never the L1 term
//! - **Termination**: a run ends `Converged`, at `MaxIterations`, on a
//!   `CallbackRequest`, or with an error
//!
//! # Modules
//!
//! - [`callback`]: Monitoring and early stopping
//! - [`cost_function`]: Cost function interface and stock objectives
//! - [`error`]: Error types for objectives and optimizers
//! - [`linalg`]: Checked vector primitives
//! - [`optimizer`]: Optimizer trait and result types
//! - [`types`]: Scalar trait, vector alias and numerical constants

pub mod callback;
pub mod cost_function;
pub mod error;
pub mod linalg;
pub mod optimizer;
pub mod types;

// Re-export commonly used items at the crate root
pub use error::{ObjectiveError, OptimizerError, OptimizerResult, Result};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use owlqn_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::callback::{
        CallbackInfo, FinalInfo, LoggingCallback, NoOpCallback, OptimizationCallback,
    };
    pub use crate::cost_function::{
        CostFunction, CountingCostFunction, DerivativeChecker, FnCost, L2Regularized,
        QuadraticCost,
    };
    pub use crate::error::{ObjectiveError, OptimizerError, OptimizerResult, Result};
    pub use crate::optimizer::{OptimizationResult, Optimizer, TerminationReason};
    pub use crate::types::{constants, DVector, Scalar};
}
