//! Integration test: retraining laboratory

use calprice::experiment;
use calprice::prelude::*;

#[test]
fn test_default_experiment_runs() {
    let data = Dataset::reference().unwrap();
    let result = experiment::run(&data, &ExperimentConfig::default()).unwrap();

    assert!(result.r2 <= 1.0);
    assert_eq!(result.pairs.len(), result.n_test);
    assert_eq!(result.n_train + result.n_test, data.n_rows());
}

#[test]
fn test_identical_configs_identical_scores() {
    let data = Dataset::reference().unwrap();
    let config = ExperimentConfig::default().with_trees(20).with_max_depth(6);

    let first = experiment::run(&data, &config).unwrap();
    let second = experiment::run(&data, &config).unwrap();

    assert_eq!(first.r2, second.r2);
    for (a, b) in first.pairs.iter().zip(second.pairs.iter()) {
        assert_eq!(a.actual, b.actual);
        assert_eq!(a.predicted, b.predicted);
    }
}

#[test]
fn test_different_hyperparameters_change_the_model() {
    let data = Dataset::reference().unwrap();

    let shallow = experiment::run(
        &data,
        &ExperimentConfig::default().with_trees(10).with_max_depth(1),
    )
    .unwrap();
    let deep = experiment::run(
        &data,
        &ExperimentConfig::default().with_trees(40).with_max_depth(12),
    )
    .unwrap();

    // Depth-1 stumps should not match a real forest
    assert_ne!(shallow.r2, deep.r2);
}

#[test]
fn test_hyperparameter_bounds() {
    let data = Dataset::reference().unwrap();

    for config in [
        ExperimentConfig::default().with_trees(9),
        ExperimentConfig::default().with_trees(101),
        ExperimentConfig::default().with_max_depth(0),
        ExperimentConfig::default().with_max_depth(21),
    ] {
        let result = experiment::run(&data, &config);
        assert!(
            matches!(result, Err(CalpriceError::InvalidParameter { .. })),
            "config {:?} should be rejected",
            config
        );
    }

    // Boundary values are valid
    assert!(experiment::run(
        &data,
        &ExperimentConfig::default().with_trees(10).with_max_depth(1)
    )
    .is_ok());
    assert!(experiment::run(
        &data,
        &ExperimentConfig::default().with_trees(100).with_max_depth(20)
    )
    .is_ok());
}

#[test]
fn test_pairs_are_in_dataset_units() {
    let data = Dataset::reference().unwrap();
    let result = experiment::run(&data, &ExperimentConfig::default()).unwrap();

    // Reference prices live in (0, 5] $100k; predictions are tree-leaf means
    // of those targets so they stay inside the same range.
    for pair in &result.pairs {
        assert!(pair.actual > 0.0 && pair.actual <= 5.0);
        assert!(pair.predicted > 0.0 && pair.predicted <= 5.0);
    }
}
