//! Regression models
//!
//! Decision-tree and random-forest regressors plus evaluation metrics.
//! The forest is the model family used both by the serving predictor and
//! the retraining laboratory.

pub mod forest;
pub mod metrics;
pub mod tree;

pub use forest::RandomForest;
pub use metrics::RegressionMetrics;
pub use tree::{DecisionTree, TreeNode};
