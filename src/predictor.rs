//! Serving-side price prediction
//!
//! Wraps one pre-trained [`RandomForest`] artifact. The artifact is loaded
//! once per process ([`shared`]) and is read-only afterwards; a missing or
//! incompatible artifact is a fatal startup condition, not a per-request
//! error.

use crate::dataset::{self, Dataset};
use crate::error::{CalpriceError, Result};
use crate::model::{RandomForest, RegressionMetrics};
use crate::schema::{HousingFeatures, COLUMNS, FEATURE_LABELS};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

/// Dataset prices are encoded in $100k units.
pub const PRICE_UNIT: f64 = 100_000.0;

/// Historical California median reference, for the delta display.
pub const REFERENCE_AVG_PRICE: f64 = 206_855.0;

/// Default location of the trained artifact.
pub const DEFAULT_MODEL_PATH: &str = "models/california_rf.json";

/// Predictor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Path to the serde-JSON model artifact
    pub model_path: PathBuf,
    /// Reference average price for the delta display, in dollars
    pub reference_price: f64,
    /// Dollars per model output unit
    pub price_unit: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            reference_price: REFERENCE_AVG_PRICE,
            price_unit: PRICE_UNIT,
        }
    }
}

impl PredictorConfig {
    /// Override the artifact path
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }
}

/// Training provenance stored inside the artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    pub n_trees: usize,
    pub max_depth: usize,
    pub seed: u64,
    pub holdout_r2: f64,
    pub n_train: usize,
}

/// A trained price model plus the schema it was trained against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceModel {
    columns: Vec<String>,
    forest: RandomForest,
    pub provenance: Provenance,
}

impl PriceModel {
    /// Train a model on the given dataset.
    ///
    /// Fits on an 80/20 split of the data and records the held-out R² in
    /// the artifact provenance.
    pub fn train(data: &Dataset, n_trees: usize, max_depth: usize, seed: u64) -> Result<Self> {
        let x = data.features()?;
        let y = data.target()?;
        let (x_train, x_test, y_train, y_test) = dataset::train_test_split(&x, &y, 0.2, seed)?;

        info!(
            n_trees,
            max_depth,
            n_train = x_train.nrows(),
            "training price model"
        );

        let mut forest = RandomForest::new(n_trees)
            .with_max_depth(max_depth)
            .with_random_state(seed);
        forest.fit(&x_train, &y_train)?;

        let y_pred = forest.predict(&x_test)?;
        let metrics = RegressionMetrics::compute(&y_test, &y_pred);
        info!(r2 = metrics.r2, "holdout evaluation");

        Ok(Self {
            columns: COLUMNS.iter().map(|s| s.to_string()).collect(),
            forest,
            provenance: Provenance {
                n_trees,
                max_depth,
                seed,
                holdout_r2: metrics.r2,
                n_train: x_train.nrows(),
            },
        })
    }

    /// Write the artifact as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "saved model artifact");
        Ok(())
    }

    /// Read an artifact from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            CalpriceError::ModelError(format!(
                "cannot read model artifact {}: {} (run `calprice train` to create it)",
                path.display(),
                e
            ))
        })?;
        let model: Self = serde_json::from_str(&json)?;
        debug!(path = %path.display(), "loaded model artifact");
        Ok(model)
    }

    /// Predict the price in model units ($100k).
    pub fn predict(&self, features: &HousingFeatures) -> Result<f64> {
        let row = features.to_row();
        let prediction = self.forest.predict(&row)?;
        Ok(prediction[0])
    }

    /// Per-feature importances, same order as [`COLUMNS`].
    pub fn feature_importances(&self) -> Result<&Array1<f64>> {
        self.forest
            .feature_importances()
            .ok_or(CalpriceError::ModelNotFitted)
    }

    /// Columns the model was trained against.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// One price estimate, scaled to dollars.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceEstimate {
    /// Estimated price in dollars
    pub price: f64,
    /// Difference against the configured reference average, in dollars
    pub delta: f64,
}

/// The serving predictor: one loaded artifact, read-only.
#[derive(Debug)]
pub struct Predictor {
    model: PriceModel,
    config: PredictorConfig,
}

impl Predictor {
    /// Load the artifact named by `config`, validating schema compatibility.
    pub fn load(config: PredictorConfig) -> Result<Self> {
        let model = PriceModel::load(&config.model_path)?;

        let schema_matches = model.columns().len() == COLUMNS.len()
            && model.columns().iter().zip(COLUMNS.iter()).all(|(a, &b)| a == b);
        if !schema_matches {
            return Err(CalpriceError::ModelError(format!(
                "artifact column mismatch: trained on {:?}, expected {:?}",
                model.columns(),
                COLUMNS
            )));
        }

        Ok(Self { model, config })
    }

    /// Estimate the price for one feature vector.
    pub fn estimate(&self, features: &HousingFeatures) -> Result<PriceEstimate> {
        let price = self.model.predict(features)? * self.config.price_unit;
        // Delta shares the exact unrounded price; rounding happens at render time only
        let delta = price - self.config.reference_price;
        Ok(PriceEstimate { price, delta })
    }

    /// Feature importances paired with labels, sorted descending.
    pub fn ranked_importances(&self) -> Result<Vec<(&'static str, f64)>> {
        let importances = self.model.feature_importances()?;
        let mut ranked: Vec<(&'static str, f64)> = FEATURE_LABELS
            .iter()
            .zip(importances.iter())
            .map(|(&label, &value)| (label, value))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(ranked)
    }

    /// The artifact behind this predictor.
    pub fn model(&self) -> &PriceModel {
        &self.model
    }

    /// Active configuration.
    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }
}

static SHARED: OnceLock<Predictor> = OnceLock::new();

/// Process-wide predictor, loaded on first use from the default artifact
/// path and reused for the session lifetime.
pub fn shared() -> Result<&'static Predictor> {
    if let Some(predictor) = SHARED.get() {
        return Ok(predictor);
    }
    let predictor = Predictor::load(PredictorConfig::default())?;
    Ok(SHARED.get_or_init(|| predictor))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_model() -> PriceModel {
        let data = Dataset::reference().unwrap();
        PriceModel::train(&data, 10, 6, 42).unwrap()
    }

    #[test]
    fn test_estimate_is_finite_and_non_negative() {
        let model = small_model();
        let predictor = Predictor {
            model,
            config: PredictorConfig::default(),
        };

        let estimate = predictor.estimate(&HousingFeatures::default()).unwrap();
        assert!(estimate.price.is_finite());
        assert!(estimate.price >= 0.0);
    }

    #[test]
    fn test_delta_consistent_with_price() {
        let model = small_model();
        let predictor = Predictor {
            model,
            config: PredictorConfig::default(),
        };

        let estimate = predictor.estimate(&HousingFeatures::default()).unwrap();
        assert_eq!(estimate.delta, estimate.price - REFERENCE_AVG_PRICE);
    }

    #[test]
    fn test_repeated_estimates_identical() {
        let model = small_model();
        let predictor = Predictor {
            model,
            config: PredictorConfig::default(),
        };

        let features = HousingFeatures::default();
        let first = predictor.estimate(&features).unwrap();
        let second = predictor.estimate(&features).unwrap();
        assert_eq!(first.price, second.price);
    }

    #[test]
    fn test_ranked_importances_descending_and_normalized() {
        let model = small_model();
        let predictor = Predictor {
            model,
            config: PredictorConfig::default(),
        };

        let ranked = predictor.ranked_importances().unwrap();
        assert_eq!(ranked.len(), COLUMNS.len());

        let sum: f64 = ranked.iter().map(|(_, v)| v).sum();
        assert!((sum - 1.0).abs() < 1e-9, "importance sum: {}", sum);

        for pair in ranked.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn test_missing_artifact_is_fatal() {
        let config = PredictorConfig::default().with_model_path("/nonexistent/model.json");
        assert!(matches!(
            Predictor::load(config),
            Err(CalpriceError::ModelError(_))
        ));
    }

    #[test]
    fn test_artifact_round_trip() {
        let model = small_model();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        model.save(&path).unwrap();
        let loaded = PriceModel::load(&path).unwrap();

        let features = HousingFeatures::default();
        assert_eq!(
            model.predict(&features).unwrap(),
            loaded.predict(&features).unwrap()
        );
    }
}
