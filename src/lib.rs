//! calprice - California housing price estimation
//!
//! An interactive estimator around one pre-trained random-forest regression
//! model, plus a retraining laboratory.
//!
//! # Modules
//!
//! - [`schema`] - Typed feature schema shared between training and serving
//! - [`dataset`] - Bundled reference data, CSV loading, seeded splits
//! - [`model`] - Decision tree / random forest regressors and metrics
//! - [`predictor`] - Artifact loading and price estimation
//! - [`experiment`] - Live retraining laboratory
//! - [`report`] - Terminal rendering (charts, map, scatter)
//! - [`cli`] - Command-line interface

pub mod error;

pub mod dataset;
pub mod experiment;
pub mod model;
pub mod predictor;
pub mod report;
pub mod schema;

pub mod cli;

pub use error::{CalpriceError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::dataset::{train_test_split, Dataset};
    pub use crate::error::{CalpriceError, Result};
    pub use crate::experiment::{ExperimentConfig, ExperimentResult, PredictionPair};
    pub use crate::model::{DecisionTree, RandomForest, RegressionMetrics};
    pub use crate::predictor::{
        Predictor, PredictorConfig, PriceEstimate, PriceModel, PRICE_UNIT, REFERENCE_AVG_PRICE,
    };
    pub use crate::schema::{HousingFeatures, COLUMNS, FEATURE_LABELS, TARGET};
}
