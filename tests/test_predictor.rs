//! Integration test: serving predictor end-to-end

use calprice::prelude::*;

fn trained_artifact(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let data = Dataset::reference().unwrap();
    let model = PriceModel::train(&data, 15, 8, 42).unwrap();
    let path = dir.path().join("california_rf.json");
    model.save(&path).unwrap();
    path
}

fn load_predictor(path: &std::path::Path) -> Predictor {
    let config = PredictorConfig::default().with_model_path(path);
    Predictor::load(config).unwrap()
}

#[test]
fn test_price_is_finite_and_non_negative() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = load_predictor(&trained_artifact(&dir));

    let estimate = predictor.estimate(&HousingFeatures::default()).unwrap();
    assert!(estimate.price.is_finite());
    assert!(estimate.price >= 0.0);
}

#[test]
fn test_price_scaled_by_unit() {
    let dir = tempfile::tempdir().unwrap();
    let path = trained_artifact(&dir);
    let predictor = load_predictor(&path);
    let model = PriceModel::load(&path).unwrap();

    let features = HousingFeatures::default();
    let raw = model.predict(&features).unwrap();
    let estimate = predictor.estimate(&features).unwrap();

    assert_eq!(estimate.price, raw * PRICE_UNIT);
}

#[test]
fn test_delta_has_no_rounding_drift() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = load_predictor(&trained_artifact(&dir));

    let estimate = predictor.estimate(&HousingFeatures::default()).unwrap();
    assert_eq!(estimate.delta, estimate.price - REFERENCE_AVG_PRICE);
}

#[test]
fn test_fixed_vector_repeatable() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = load_predictor(&trained_artifact(&dir));

    let features = HousingFeatures {
        med_inc: 5.0,
        house_age: 20.0,
        ave_rooms: 6.0,
        ave_bedrms: 1.0,
        population: 1000.0,
        ave_occup: 3.0,
        latitude: 37.7,
        longitude: -122.4,
    };

    let first = predictor.estimate(&features).unwrap();
    for _ in 0..5 {
        let again = predictor.estimate(&features).unwrap();
        assert_eq!(first.price, again.price);
        assert_eq!(first.delta, again.delta);
    }
}

#[test]
fn test_importances_ordered_and_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = load_predictor(&trained_artifact(&dir));

    let ranked = predictor.ranked_importances().unwrap();
    assert_eq!(ranked.len(), COLUMNS.len());

    let sum: f64 = ranked.iter().map(|(_, v)| v).sum();
    assert!((sum - 1.0).abs() < 1e-9, "sum was {}", sum);

    for window in ranked.windows(2) {
        assert!(
            window[0].1 >= window[1].1,
            "{} before {}",
            window[0].1,
            window[1].1
        );
    }
}

#[test]
fn test_missing_artifact_fails_startup() {
    let config = PredictorConfig::default().with_model_path("/does/not/exist.json");
    let result = Predictor::load(config);
    assert!(matches!(result, Err(CalpriceError::ModelError(_))));
}

#[test]
fn test_corrupt_artifact_fails_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "not a model").unwrap();

    let config = PredictorConfig::default().with_model_path(&path);
    assert!(Predictor::load(config).is_err());
}

#[test]
fn test_artifact_round_trip_predictions_identical() {
    let data = Dataset::reference().unwrap();
    let model = PriceModel::train(&data, 10, 6, 7).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    model.save(&path).unwrap();
    let reloaded = PriceModel::load(&path).unwrap();

    let probes = [
        HousingFeatures::default(),
        HousingFeatures {
            med_inc: 8.5,
            house_age: 5.0,
            ave_rooms: 7.0,
            ave_bedrms: 1.1,
            population: 2500.0,
            ave_occup: 2.4,
            latitude: 34.05,
            longitude: -118.24,
        },
    ];

    for features in &probes {
        assert_eq!(
            model.predict(features).unwrap(),
            reloaded.predict(features).unwrap()
        );
    }
}
