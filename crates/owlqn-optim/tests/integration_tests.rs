//! Integration tests for owlqn-optim
//!
//! These tests run complete optimizations on quadratic and logistic
//! objectives and check the returned points, termination reasons and
//! callback traffic.

use approx::assert_relative_eq;
use owlqn_core::prelude::*;
use owlqn_logreg::{LogisticRegressionObjective, SparseDataset};
use owlqn_optim::{minimize, CurvaturePolicy, OWLQNConfig, OWLQN};
use pretty_assertions::assert_eq;

/// Records every value the optimizer reports.
#[derive(Debug, Default)]
struct Recorder {
    initial: Option<f64>,
    values: Vec<f64>,
    iterations: Vec<usize>,
    final_reason: Option<TerminationReason>,
    stop_after: Option<usize>,
}

impl OptimizationCallback<f64> for Recorder {
    fn on_optimization_start(&mut self, initial_value: f64) -> OptimizerResult<()> {
        self.initial = Some(initial_value);
        Ok(())
    }

    fn on_iteration_end(&mut self, info: &CallbackInfo<'_, f64>) -> OptimizerResult<bool> {
        self.values.push(info.value);
        self.iterations.push(info.iteration);
        Ok(self.stop_after.map_or(true, |stop| info.iteration < stop))
    }

    fn on_optimization_end(&mut self, info: &FinalInfo<'_, f64>) -> OptimizerResult<()> {
        self.final_reason = Some(info.termination_reason);
        Ok(())
    }
}

fn separable_logistic() -> LogisticRegressionObjective<f64> {
    let dataset = SparseDataset::parse_str(
        "1\t1:1.0\t2:0.5\n1\t1:2.0\t2:1.5\n0\t1:-1.0\t2:-0.5\n0\t1:-1.5\t2:-2.0\n",
        2,
    )
    .unwrap();
    LogisticRegressionObjective::new(dataset, 0.0).unwrap()
}

fn soft_threshold_problem() -> QuadraticCost<f64> {
    QuadraticCost::with_target(DVector::from_vec(vec![2.0, 0.3, -1.0]))
}

#[test]
fn test_unregularized_quadratic_f64() {
    let cost = QuadraticCost::<f64>::simple(2);
    let init = DVector::from_vec(vec![3.0, -4.0]);
    let mut result = DVector::zeros(2);

    let outcome = minimize(&cost, &init, &mut result, 0.0, 1e-6, 10).unwrap();

    assert!(outcome.converged);
    assert_eq!(outcome.termination_reason, TerminationReason::Converged);
    assert!(result.norm() < 1e-10);
    assert!(outcome.value < 1e-20);
    assert!(outcome.iterations <= 5);
}

#[test]
fn test_unregularized_quadratic_f32() {
    let cost = QuadraticCost::<f32>::simple(2);
    let init = DVector::from_vec(vec![3.0, -4.0]);
    let mut result = DVector::zeros(2);

    let outcome = minimize(&cost, &init, &mut result, 0.0, 1e-4, 10).unwrap();

    assert!(outcome.converged);
    assert!(result.norm() < 1e-5);
}

fn assert_strictly_decreasing(recorder: &Recorder) {
    let mut previous = recorder.initial.unwrap();
    for &value in &recorder.values {
        assert!(value < previous, "{value} did not improve on {previous}");
        previous = value;
    }
}

#[test]
fn test_half_squared_norm_from_ones() {
    let optimizer = OWLQN::new(
        OWLQNConfig::new()
            .with_l1_weight(0.0)
            .with_tolerance(1e-6)
            .with_memory_size(5),
    );
    let mut recorder = Recorder::default();

    let outcome = optimizer
        .minimize_with_callback(
            &QuadraticCost::<f64>::simple(3),
            &DVector::from_element(3, 1.0),
            &mut recorder,
        )
        .unwrap();

    assert_eq!(outcome.termination_reason, TerminationReason::Converged);
    assert!(outcome.iterations <= 3);
    assert!(outcome.point.norm() < 1e-12);
    assert_eq!(recorder.initial, Some(1.5));
    assert_strictly_decreasing(&recorder);
}

#[test]
fn test_half_squared_norm_with_l1_lands_on_origin() {
    let optimizer = OWLQN::new(
        OWLQNConfig::new()
            .with_l1_weight(0.5)
            .with_tolerance(1e-6)
            .with_memory_size(5),
    );
    let mut recorder = Recorder::default();

    let outcome = optimizer
        .minimize_with_callback(
            &QuadraticCost::<f64>::simple(3),
            &DVector::from_element(3, 1.0),
            &mut recorder,
        )
        .unwrap();

    // The second step overshoots every coordinate and is snapped to zero.
    assert!(outcome.converged);
    assert_eq!(outcome.iterations, 2);
    assert_eq!(outcome.point, DVector::zeros(3));
    assert_eq!(outcome.nonzero_count, 0);
    assert_eq!(outcome.value, 0.0);
    assert_eq!(recorder.initial, Some(3.0));
    assert_eq!(recorder.iterations, vec![1, 2]);
    assert_strictly_decreasing(&recorder);
}

#[test]
fn test_soft_thresholding_yields_exact_zero() {
    let cost = soft_threshold_problem();
    let init = DVector::from_element(3, 1.0);

    for memory_size in [5, 10] {
        let mut result = DVector::zeros(3);
        let outcome = minimize(&cost, &init, &mut result, 0.5, 1e-6, memory_size).unwrap();

        assert!(outcome.converged);
        assert_eq!(result[1], 0.0);
        assert_relative_eq!(result[0], 1.5, epsilon = 1e-9);
        assert_relative_eq!(result[2], -0.5, epsilon = 1e-9);
        assert_relative_eq!(outcome.value, 1.295, epsilon = 1e-9);
        assert_eq!(outcome.nonzero_count, 2);
        assert_eq!(outcome.point, result);
    }
}

#[test]
fn test_soft_thresholding_f32() {
    let cost = QuadraticCost::with_target(DVector::from_vec(vec![2.0f32, 0.3, -1.0]));
    let init = DVector::from_element(3, 1.0);
    let mut result = DVector::zeros(3);

    let outcome = minimize(&cost, &init, &mut result, 0.5, 1e-4, 5).unwrap();

    assert!(outcome.converged);
    assert_eq!(result[1], 0.0);
    assert_relative_eq!(result[0], 1.5, epsilon = 1e-4);
    assert_relative_eq!(result[2], -0.5, epsilon = 1e-4);
}

#[test]
fn test_sparse_logistic_regression() {
    let objective = separable_logistic();
    let optimizer = OWLQN::new(
        OWLQNConfig::new()
            .with_l1_weight(0.01)
            .with_memory_size(5)
            .with_tolerance(1e-4),
    );
    let mut recorder = Recorder::default();

    let outcome = optimizer
        .minimize_with_callback(&objective, &DVector::zeros(2), &mut recorder)
        .unwrap();

    assert!(outcome.converged);
    assert!(outcome.point.iter().all(|w| w.is_finite()));
    assert!(outcome.point[0] > 1.0);
    assert_eq!(outcome.point[1], 0.0);
    assert_relative_eq!(objective.accuracy(&outcome.point), 1.0);

    // Initial value is 1 + 4·ln 2 at the origin.
    let initial = recorder.initial.unwrap();
    assert_relative_eq!(initial, 1.0 + 4.0 * 2f64.ln(), epsilon = 1e-12);

    assert_strictly_decreasing(&recorder);

    // The converging step reaches the callback too.
    assert_eq!(recorder.iterations.last(), Some(&outcome.iterations));
    assert_eq!(recorder.values.last(), Some(&outcome.value));
    assert_eq!(recorder.final_reason, Some(TerminationReason::Converged));
}

#[test]
fn test_iteration_cap() {
    let optimizer = OWLQN::new(
        OWLQNConfig::new()
            .with_l1_weight(0.01)
            .with_memory_size(5)
            .with_tolerance(1e-4)
            .with_max_iterations(3),
    );
    let mut recorder = Recorder::default();

    let outcome = optimizer
        .minimize_with_callback(&separable_logistic(), &DVector::zeros(2), &mut recorder)
        .unwrap();

    assert_eq!(outcome.termination_reason, TerminationReason::MaxIterations);
    assert!(!outcome.converged);
    assert_eq!(outcome.iterations, 3);
    assert_eq!(recorder.iterations, vec![1, 2, 3]);
    assert_eq!(outcome.value, *recorder.values.last().unwrap());
}

#[test]
fn test_callback_stop_request() {
    let optimizer = OWLQN::new(OWLQNConfig::new().with_l1_weight(0.01));
    let mut recorder = Recorder {
        stop_after: Some(2),
        ..Recorder::default()
    };

    let outcome = optimizer
        .minimize_with_callback(&separable_logistic(), &DVector::zeros(2), &mut recorder)
        .unwrap();

    assert_eq!(outcome.termination_reason, TerminationReason::CallbackRequest);
    assert_eq!(outcome.iterations, 2);
    assert_eq!(recorder.values.len(), 2);
    assert_eq!(
        recorder.final_reason,
        Some(TerminationReason::CallbackRequest)
    );
}

#[test]
fn test_stop_request_on_converging_step_is_ignored() {
    let optimizer = OWLQN::new(OWLQNConfig::new().with_l1_weight(0.01).with_memory_size(5));
    let full = optimizer
        .minimize_with_callback(&separable_logistic(), &DVector::zeros(2), &mut NoOpCallback)
        .unwrap();
    assert!(full.converged);

    let mut recorder = Recorder {
        stop_after: Some(full.iterations),
        ..Recorder::default()
    };
    let outcome = optimizer
        .minimize_with_callback(&separable_logistic(), &DVector::zeros(2), &mut recorder)
        .unwrap();

    // The stop request comes on the final step, which already converged.
    assert_eq!(outcome.termination_reason, TerminationReason::Converged);
    assert_eq!(outcome.iterations, full.iterations);
    assert_eq!(outcome.point, full.point);
}

#[test]
fn test_runs_are_deterministic() {
    let objective = separable_logistic();
    let optimizer = OWLQN::new(OWLQNConfig::new().with_l1_weight(0.01).with_memory_size(5));
    let init = DVector::from_vec(vec![0.5, -0.25]);

    let first = optimizer
        .minimize_with_callback(&objective, &init, &mut NoOpCallback)
        .unwrap();
    let second = optimizer
        .minimize_with_callback(&objective, &init, &mut NoOpCallback)
        .unwrap();

    assert_eq!(first.point, second.point);
    assert_eq!(first.value, second.value);
    assert_eq!(first.iterations, second.iterations);
    assert_eq!(first.function_evaluations, second.function_evaluations);
}

#[test]
fn test_function_evaluations_are_counted() {
    let cost = CountingCostFunction::new(soft_threshold_problem());
    let optimizer = OWLQN::new(OWLQNConfig::new().with_l1_weight(0.5));

    let outcome = optimizer
        .minimize_with_callback(&cost, &DVector::from_element(3, 1.0), &mut NoOpCallback)
        .unwrap();

    assert_eq!(cost.evaluations(), outcome.function_evaluations);
    assert!(outcome.function_evaluations > outcome.iterations);
}

#[test]
fn test_dimension_mismatch_with_declared_dimension() {
    let cost = soft_threshold_problem();
    let err = OWLQN::<f64>::default()
        .minimize_with_callback(&cost, &DVector::zeros(4), &mut NoOpCallback)
        .unwrap_err();
    assert!(err.is_dimension_mismatch());
}

#[test]
fn test_closure_cost_with_ridge() {
    // f(x) = 0.5·(x₀ − 1)² + 0.5·(x₁ + 3)², plus 0.5·‖x‖² from the wrapper.
    let cost = FnCost::new(|x: &DVector<f64>, g: &mut DVector<f64>| {
        g[0] = x[0] - 1.0;
        g[1] = x[1] + 3.0;
        0.5 * (g[0] * g[0] + g[1] * g[1])
    })
    .with_dimension(2);
    let cost = L2Regularized::new(cost, 1.0).unwrap();

    let mut result = DVector::zeros(2);
    let outcome = minimize(&cost, &DVector::zeros(2), &mut result, 0.0, 1e-8, 10).unwrap();

    assert!(outcome.converged);
    assert_relative_eq!(result[0], 0.5, epsilon = 1e-6);
    assert_relative_eq!(result[1], -1.5, epsilon = 1e-6);
}

#[test]
fn test_strict_curvature_policy_accepts_convex_problem() {
    let optimizer = OWLQN::new(
        OWLQNConfig::new()
            .with_l1_weight(0.01)
            .with_curvature_policy(CurvaturePolicy::Error),
    );
    let outcome = optimizer
        .minimize_with_callback(&separable_logistic(), &DVector::zeros(2), &mut NoOpCallback)
        .unwrap();
    assert!(outcome.converged);
}

#[test]
fn test_large_l1_weight_keeps_origin() {
    let cost = soft_threshold_problem();
    let mut result = DVector::from_element(3, 7.0);
    let outcome = minimize(&cost, &DVector::zeros(3), &mut result, 5.0, 1e-6, 10).unwrap();

    assert!(outcome.converged);
    assert_eq!(outcome.iterations, 0);
    assert_eq!(result, DVector::zeros(3));
    assert_eq!(outcome.pseudo_gradient_norm, Some(0.0));
}

#[test]
fn test_logging_callback_runs() {
    let optimizer = OWLQN::new(OWLQNConfig::new().with_l1_weight(0.5).with_quiet(true));
    let outcome = optimizer
        .minimize_with_callback(
            &soft_threshold_problem(),
            &DVector::from_element(3, 1.0),
            &mut LoggingCallback::new(2),
        )
        .unwrap();
    assert!(outcome.converged);
}

#[cfg(feature = "serde")]
#[test]
fn test_config_from_json() {
    let config: OWLQNConfig<f64> = serde_json::from_str(
        r#"{ "l1_weight": 0.25, "memory_size": 7, "curvature_policy": "Error",
             "line_search": { "backoff": 0.3 } }"#,
    )
    .unwrap();

    assert_eq!(config.l1_weight, 0.25);
    assert_eq!(config.memory_size, 7);
    assert_eq!(config.curvature_policy, CurvaturePolicy::Error);
    assert_eq!(config.line_search.backoff, 0.3);
    assert_eq!(config.line_search.max_iterations, 50);
    assert_eq!(config.max_iterations, Some(1000));
    assert!(config.validate().is_ok());

    let round_trip: OWLQNConfig<f64> =
        serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
    assert_eq!(round_trip, config);
}
