//! Example: sparse logistic regression with OWL-QN.
//!
//! Trains an L1-regularized logistic regression model on a dataset in the
//! `label index:value ...` text format and reports how many weights survive.
//!
//! Usage:
//!
//! ```text
//! cargo run --example sparse_logistic -- <train-file> <num-features> [l1-weight]
//! ```
//!
//! Without arguments a small built-in dataset is used.

use owlqn::prelude::*;
use std::env;
use std::error::Error;

const BUILTIN: &str = "\
1\t1:1.0\t2:0.5\t4:0.1
1\t1:2.0\t2:1.5
1\t1:0.7\t3:-0.2
0\t1:-1.0\t2:-0.5\t4:0.1
0\t1:-1.5\t2:-2.0
0\t1:-0.3\t3:0.4
";

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().skip(1).collect();

    let (dataset, l1_weight) = match args.as_slice() {
        [] => (SparseDataset::<f64>::parse_str(BUILTIN, 4)?, 0.05),
        [path, num_features, rest @ ..] => {
            let l1_weight = rest.first().map_or(Ok(1.0), |w| w.parse())?;
            (SparseDataset::from_path(path, num_features.parse()?)?, l1_weight)
        }
        _ => return Err("usage: sparse_logistic <train-file> <num-features> [l1-weight]".into()),
    };

    println!(
        "Loaded {} instances over {} features",
        dataset.num_instances(),
        dataset.num_features()
    );

    let num_features = dataset.num_features();
    let objective = LogisticRegressionObjective::new(dataset, 0.0)?;
    let optimizer = OWLQN::new(
        OWLQNConfig::new()
            .with_l1_weight(l1_weight)
            .with_memory_size(10)
            .with_tolerance(1e-4),
    );

    let result = optimizer.minimize_with_callback(
        &objective,
        &DVector::zeros(num_features),
        &mut LoggingCallback::new(10),
    )?;

    println!("\nOptimization Results:");
    println!("  Termination: {}", result.termination_reason);
    println!("  Iterations: {}", result.iterations);
    println!("  Function evaluations: {}", result.function_evaluations);
    println!("  Final objective: {:.6}", result.value);
    println!(
        "  Non-zero weights: {} of {} ({:.1}% sparse)",
        result.nonzero_count,
        num_features,
        100.0 * result.sparsity()
    );
    println!("  Training accuracy: {:.3}", objective.accuracy(&result.point));

    for (index, weight) in result.point.iter().enumerate() {
        if *weight != 0.0 {
            println!("    w[{}] = {:.6}", index + 1, weight);
        }
    }

    Ok(())
}
