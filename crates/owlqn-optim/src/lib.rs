//! OWL-QN optimization engine.
//!
//! This crate implements the Orthant-Wise Limited-memory Quasi-Newton method
//! for minimizing `f(x) + λ·‖x‖₁`, where `f` is convex and differentiable.
//!
//! # Components
//!
//! - [`state`]: buffers and scalars of one run, history shift
//! - [`history`]: fixed-capacity ring of curvature pairs
//! - [`direction`]: pseudo-gradient, two-loop recursion, sign projection
//! - [`line_search`]: backtracking Armijo search with orthant projection
//! - [`termination`]: windowed relative-improvement criterion
//! - [`owlqn`]: configuration and driver loop
//!
//! # Examples
//!
//! ```rust
//! use owlqn_core::cost_function::QuadraticCost;
//! use owlqn_core::types::DVector;
//!
//! // 0.5·‖x − c‖² + 0.5·‖x‖₁ is minimized by soft-thresholding c.
//! let cost = QuadraticCost::with_target(DVector::from_vec(vec![2.0, 0.3, -1.0]));
//! let init = DVector::from_element(3, 1.0);
//! let mut result: DVector<f64> = DVector::zeros(3);
//!
//! let outcome = owlqn_optim::minimize(&cost, &init, &mut result, 0.5, 1e-6, 5).unwrap();
//! assert!(outcome.converged);
//! assert_eq!(result[1], 0.0);
//! assert!((result[0] - 1.5).abs() < 1e-12);
//! ```

pub mod direction;
pub mod history;
pub mod line_search;
pub mod owlqn;
pub mod state;
pub mod termination;

// Re-export main items for convenience
pub use history::{CurvatureHistory, CurvaturePolicy};
pub use line_search::{LineSearchParams, LineSearchStep};
pub use owlqn::{minimize, OWLQNConfig, OWLQN};
pub use state::{OptimizerState, ShiftOutcome};
pub use termination::RelativeImprovementCriterion;
