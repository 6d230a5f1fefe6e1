//! # OWL-QN
//!
//! Orthant-Wise Limited-memory Quasi-Newton optimization of
//! `f(x) + λ·‖x‖₁` for convex differentiable `f`.
//!
//! This crate re-exports the workspace:
//!
//! - [`owlqn_core`]: scalar trait, vector primitives, cost functions, callbacks, errors
//! - [`owlqn_optim`]: the OWL-QN optimizer and its building blocks
//! - `owlqn_logreg`: sparse datasets and the logistic regression objective
//!   (feature `logreg`, on by default)
//!
//! ## Quick Start
//!
//! ```rust
//! use owlqn::prelude::*;
//!
//! let cost = QuadraticCost::with_target(DVector::from_vec(vec![2.0, 0.3, -1.0]));
//! let optimizer = OWLQN::new(OWLQNConfig::new().with_l1_weight(0.5));
//!
//! let result = optimizer
//!     .minimize_with_callback(&cost, &DVector::from_element(3, 1.0), &mut NoOpCallback)
//!     .unwrap();
//!
//! assert!(result.converged);
//! assert_eq!(result.point[1], 0.0);
//! ```

pub use owlqn_core;
pub use owlqn_optim;

#[cfg(feature = "logreg")]
pub use owlqn_logreg;

pub use nalgebra;

pub use owlqn_core::error::{ObjectiveError, OptimizerError, OptimizerResult};
pub use owlqn_optim::{minimize, OWLQNConfig, OWLQN};

/// Commonly used items.
pub mod prelude {
    pub use owlqn_core::prelude::*;
    pub use owlqn_optim::{
        minimize, CurvaturePolicy, LineSearchParams, OWLQNConfig, RelativeImprovementCriterion,
        OWLQN,
    };

    #[cfg(feature = "logreg")]
    pub use owlqn_logreg::{DatasetError, LogisticRegressionObjective, SparseDataset};
}
