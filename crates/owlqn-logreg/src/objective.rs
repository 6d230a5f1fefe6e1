//! Logistic regression loss over a sparse dataset.
//!
//! The objective is
//!
//! ```text
//! f(w) = 1 + Σ_i log(1 + exp(−score_i(w))) + 0.5·l2·‖w‖²
//! ```
//!
//! where `score_i` is the label-signed margin from
//! [`SparseDataset::score_of`]. The L1 term is left to the optimizer. The
//! constant 1 keeps the objective strictly positive, so the relative
//! improvement used for termination never divides by zero.

use crate::dataset::SparseDataset;
use crate::error::{DatasetError, Result};
use num_traits::Float;
use owlqn_core::{
    cost_function::CostFunction,
    error::{ObjectiveError, Result as ObjectiveResult},
    linalg,
    types::{DVector, Scalar},
};

/// Beyond this absolute score the per-instance loss is linearized.
const SATURATION_SCORE: f64 = 30.0;

/// Logistic loss with optional ridge term, for use with OWL-QN.
///
/// # Examples
///
/// ```rust
/// use owlqn_core::prelude::*;
/// use owlqn_logreg::{LogisticRegressionObjective, SparseDataset};
///
/// let dataset = SparseDataset::<f64>::parse_str("1 1:1.0\n0 1:-1.0\n", 1).unwrap();
/// let objective = LogisticRegressionObjective::new(dataset, 0.0).unwrap();
///
/// let value = objective.cost(&DVector::zeros(1)).unwrap();
/// assert!((value - (1.0 + 2.0 * 2f64.ln())).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LogisticRegressionObjective<T: Scalar> {
    dataset: SparseDataset<T>,
    l2_weight: T,
}

impl<T: Scalar> LogisticRegressionObjective<T> {
    /// Creates the objective over `dataset` with ridge weight `l2_weight`.
    pub fn new(dataset: SparseDataset<T>, l2_weight: T) -> Result<Self> {
        if !(l2_weight >= T::zero() && Float::is_finite(l2_weight)) {
            return Err(DatasetError::InvalidRegularization {
                weight: Scalar::to_f64(l2_weight),
            });
        }
        Ok(Self { dataset, l2_weight })
    }

    /// The training data.
    pub fn dataset(&self) -> &SparseDataset<T> {
        &self.dataset
    }

    /// Ridge weight.
    pub fn l2_weight(&self) -> T {
        self.l2_weight
    }

    /// Model probability that instance `i` has label 1.
    pub fn predict_probability(&self, i: usize, weights: &DVector<T>) -> T {
        let margin = self.dataset.margin(i, weights);
        T::one() / (T::one() + Float::exp(-margin))
    }

    /// Fraction of instances whose thresholded prediction matches the label.
    ///
    /// Returns zero for an empty dataset.
    pub fn accuracy(&self, weights: &DVector<T>) -> T {
        let n = self.dataset.num_instances();
        if n == 0 {
            return T::zero();
        }
        let threshold = <T as Scalar>::from_f64(0.5);
        let correct = (0..n)
            .filter(|&i| {
                (self.predict_probability(i, weights) >= threshold) == self.dataset.label(i)
            })
            .count();
        <T as Scalar>::from_usize(correct) / <T as Scalar>::from_usize(n)
    }
}

impl<T: Scalar> CostFunction<T> for LogisticRegressionObjective<T> {
    fn evaluate(&self, point: &DVector<T>, gradient: &mut DVector<T>) -> ObjectiveResult<T> {
        let n = self.dataset.num_features();
        if point.len() != n {
            return Err(ObjectiveError::dimension_mismatch(n, point.len()));
        }
        if gradient.len() != n {
            return Err(ObjectiveError::dimension_mismatch(n, gradient.len()));
        }

        gradient.fill(T::zero());
        let mut loss = T::one();

        if self.l2_weight > T::zero() {
            let half = <T as Scalar>::from_f64(0.5);
            loss += half * self.l2_weight * linalg::dot(point, point)?;
            linalg::add_mult(gradient, point, self.l2_weight)?;
        }

        let limit = <T as Scalar>::from_f64(SATURATION_SCORE);
        for i in 0..self.dataset.num_instances() {
            let score = self.dataset.score_of(i, point);
            if Float::is_nan(score) {
                return Err(ObjectiveError::numerical_error(format!(
                    "score of instance {i} is NaN"
                )));
            }

            let (instance_loss, instance_prob) = if score < -limit {
                (-score, T::zero())
            } else if score > limit {
                (T::zero(), T::one())
            } else {
                let temp = T::one() + Float::exp(-score);
                (Float::ln(temp), T::one() / temp)
            };

            loss += instance_loss;
            self.dataset.add_mult_to(i, T::one() - instance_prob, gradient);
        }

        Ok(loss)
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dataset.num_features())
    }
}
