//! Loading datasets from disk and evaluating the objective on them.

use approx::assert_relative_eq;
use owlqn_core::cost_function::{CostFunction, DerivativeChecker};
use owlqn_core::types::DVector;
use owlqn_logreg::{DatasetError, LogisticRegressionObjective, SparseDataset};
use proptest::prelude::*;
use std::fs;
use std::path::PathBuf;

fn write_temp(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("owlqn-logreg-{}-{name}", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_from_file() {
    let path = write_temp(
        "train.txt",
        "1\t1:1.0\t2:0.5\n1\t1:2.0\t2:1.5\n\n0\t1:-1.0\t2:-0.5\n0\t1:-1.5\t2:-2.0\n",
    );
    let dataset = SparseDataset::<f64>::from_path(&path, 2).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(dataset.num_instances(), 4);
    assert_eq!(dataset.num_nonzeros(), 8);
    assert!(dataset.label(1));
    assert!(!dataset.label(2));
    assert_eq!(dataset.instance(3), (&[0, 1][..], &[-1.5, -2.0][..]));
}

#[test]
fn test_bad_file_reports_line() {
    let path = write_temp("bad.txt", "1 1:1.0\n0 1:0.5\n-1 1:2.0\n");
    let err = SparseDataset::<f32>::from_path(&path, 1).unwrap_err();
    fs::remove_file(&path).unwrap();

    match err {
        DatasetError::InvalidLabel { line, label } => {
            assert_eq!(line, 3);
            assert_eq!(label, "-1");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_file_and_memory_construction_agree() {
    let text = "0 2:1.5 3:-0.25\n1 1:4\n";
    let parsed = SparseDataset::<f64>::parse_str(text, 3).unwrap();

    let mut built = SparseDataset::new(3);
    built.add_instance(&[1, 2], &[1.5, -0.25], false).unwrap();
    built.add_instance(&[0], &[4.0], true).unwrap();

    assert_eq!(parsed, built);
}

#[test]
fn test_single_precision_objective() {
    let dataset = SparseDataset::<f32>::parse_str("1 1:1.0\n0 1:-1.0\n0 2:1.0\n", 2).unwrap();
    let objective = LogisticRegressionObjective::new(dataset, 0.0).unwrap();
    let value = objective.cost(&DVector::zeros(2)).unwrap();
    assert_relative_eq!(value, 1.0 + 3.0 * 2f32.ln(), epsilon = 1e-6);
}

fn instance_strategy() -> impl Strategy<Value = (Vec<usize>, Vec<f64>, bool)> {
    prop::collection::vec((0..4usize, -2.0..2.0f64), 0..4).prop_flat_map(|pairs| {
        let (indices, values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        (Just(indices), Just(values), any::<bool>())
    })
}

proptest! {
    #[test]
    fn prop_objective_gradient_is_consistent(
        instances in prop::collection::vec(instance_strategy(), 1..8),
        weights in prop::collection::vec(-3.0..3.0f64, 4),
    ) {
        let mut dataset = SparseDataset::new(4);
        for (indices, values, label) in &instances {
            dataset.add_instance(indices, values, *label).unwrap();
        }
        let objective = LogisticRegressionObjective::new(dataset, 0.05).unwrap();
        let point = DVector::from_vec(weights);

        let value = objective.cost(&point).unwrap();
        prop_assert!(value >= 1.0);

        let (passes, max_error) =
            DerivativeChecker::check_gradient(&objective, &point, 1e-5).unwrap();
        prop_assert!(passes, "max gradient error {:e}", max_error);
    }
}
