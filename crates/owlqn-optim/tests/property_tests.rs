//! Randomized invariants of the OWL-QN iteration.

use owlqn_core::linalg;
use owlqn_core::prelude::*;
use owlqn_optim::{CurvaturePolicy, LineSearchParams, OWLQNConfig, OptimizerState, OWLQN};
use proptest::prelude::*;

fn quadratic_problem(dim: usize) -> impl Strategy<Value = (QuadraticCost<f64>, DVector<f64>)> {
    (
        prop::collection::vec(0.1..10.0f64, dim),
        prop::collection::vec(-5.0..5.0f64, dim),
        prop::collection::vec(-5.0..5.0f64, dim),
    )
        .prop_map(|(scales, target, init)| {
            let cost =
                QuadraticCost::new(DVector::from_vec(scales), DVector::from_vec(target)).unwrap();
            (cost, DVector::from_vec(init))
        })
}

/// Runs direction and line search; returns false at a stationary point.
fn prepare_step(
    state: &mut OptimizerState<f64>,
    cost: &QuadraticCost<f64>,
    params: &LineSearchParams<f64>,
) -> bool {
    state.make_steepest_desc_dir().unwrap();
    if state.is_stationary() {
        return false;
    }
    state.map_dir_by_inverse_hessian().unwrap();
    state.fix_dir_signs();
    state.backtracking_line_search(cost, params).unwrap();
    true
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_candidates_stay_in_orthant(
        (cost, init) in quadratic_problem(5),
        l1_weight in 0.01..3.0f64,
    ) {
        let params = LineSearchParams::default();
        let mut state = OptimizerState::new(&cost, &init, 3, l1_weight).unwrap();

        for _ in 0..6 {
            if !prepare_step(&mut state, &cost, &params) {
                break;
            }
            for (&x, &nx) in state.x().iter().zip(state.new_x().iter()) {
                prop_assert!(x * nx >= 0.0, "x = {x}, new_x = {nx}");
            }
            state.shift(CurvaturePolicy::Skip).unwrap();
        }
    }

    #[test]
    fn prop_shift_commits_candidate(
        (cost, init) in quadratic_problem(4),
        l1_weight in 0.0..1.0f64,
    ) {
        let params = LineSearchParams::default();
        let mut state = OptimizerState::new(&cost, &init, 2, l1_weight).unwrap();

        for k in 1..=4 {
            if !prepare_step(&mut state, &cost, &params) {
                break;
            }
            let candidate = state.new_x().clone();
            let candidate_grad = state.new_grad().clone();
            state.shift(CurvaturePolicy::Skip).unwrap();

            prop_assert_eq!(state.x(), &candidate);
            prop_assert_eq!(state.grad(), &candidate_grad);
            prop_assert_eq!(state.iter(), k);
            prop_assert!(state.history().len() <= 2);
        }
    }

    #[test]
    fn prop_unregularized_sign_fix_is_vacuous(
        (cost, init) in quadratic_problem(4),
    ) {
        let params = LineSearchParams::default();
        let mut state = OptimizerState::new(&cost, &init, 5, 0.0).unwrap();

        for _ in 0..3 {
            state.make_steepest_desc_dir().unwrap();
            if state.is_stationary() {
                break;
            }
            state.map_dir_by_inverse_hessian().unwrap();
            let before = state.dir().clone();
            state.fix_dir_signs();
            prop_assert_eq!(state.dir(), &before);

            let plain = linalg::dot(state.dir(), state.grad()).unwrap();
            prop_assert_eq!(state.dir_deriv().unwrap(), plain);

            state.backtracking_line_search(&cost, &params).unwrap();
            state.shift(CurvaturePolicy::Skip).unwrap();
        }
    }

    #[test]
    fn prop_first_direction_is_pseudo_gradient(
        (cost, init) in quadratic_problem(6),
        l1_weight in 0.0..2.0f64,
    ) {
        let mut state = OptimizerState::new(&cost, &init, 4, l1_weight).unwrap();
        state.make_steepest_desc_dir().unwrap();
        state.map_dir_by_inverse_hessian().unwrap();
        prop_assert_eq!(state.dir(), state.steepest_desc_dir());

        state.fix_dir_signs();
        prop_assert_eq!(state.dir(), state.steepest_desc_dir());
    }

    #[test]
    fn prop_objective_never_increases(
        (cost, init) in quadratic_problem(5),
        l1_weight in 0.0..2.0f64,
    ) {
        let mut values = Vec::new();
        let mut recorder = |value: f64| values.push(value);

        struct Trace<'a, F: FnMut(f64)>(&'a mut F);
        impl<F: FnMut(f64)> OptimizationCallback<f64> for Trace<'_, F> {
            fn on_optimization_start(&mut self, initial_value: f64) -> OptimizerResult<()> {
                (self.0)(initial_value);
                Ok(())
            }
            fn on_iteration_end(&mut self, info: &CallbackInfo<'_, f64>) -> OptimizerResult<bool> {
                (self.0)(info.value);
                Ok(true)
            }
        }

        let optimizer = OWLQN::new(
            OWLQNConfig::new()
                .with_l1_weight(l1_weight)
                .with_memory_size(3)
                .with_max_iterations(25)
                .with_quiet(true),
        );
        let result = optimizer
            .minimize_with_callback(&cost, &init, &mut Trace(&mut recorder))
            .unwrap();

        for pair in values.windows(2) {
            prop_assert!(pair[1] <= pair[0], "{} increased to {}", pair[0], pair[1]);
        }
        if let Some(&last) = values.last() {
            prop_assert!(result.value <= last);
        }
    }
}
