//! Sparse logistic regression for OWL-QN.
//!
//! This crate provides a binary-label dataset in compressed sparse row form,
//! a loader for the line-oriented `label index:value ...` text format, and
//! the logistic loss as a [`CostFunction`](owlqn_core::cost_function::CostFunction).
//! Pairing the objective with an L1 weight in the optimizer yields sparse
//! L1-regularized logistic regression.
//!
//! # Examples
//!
//! ```rust
//! use owlqn_core::cost_function::CostFunction;
//! use owlqn_logreg::{LogisticRegressionObjective, SparseDataset};
//!
//! let text = "1\t1:1.0\t3:0.5\n0\t2:2.0\n";
//! let dataset = SparseDataset::<f32>::parse_str(text, 3).unwrap();
//! assert_eq!(dataset.num_instances(), 2);
//!
//! let objective = LogisticRegressionObjective::new(dataset, 0.0).unwrap();
//! assert_eq!(objective.dimension(), Some(3));
//! ```

pub mod dataset;
pub mod error;
pub mod objective;

pub use dataset::SparseDataset;
pub use error::{DatasetError, Result};
pub use objective::LogisticRegressionObjective;
