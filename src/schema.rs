//! Typed feature schema shared between training and serving
//!
//! The trained model is keyed by column name and order. [`COLUMNS`] is the
//! single source of truth: dataset extraction, artifact validation and
//! serving-row construction all go through it, so the two sides cannot
//! drift apart silently.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Feature column names, in training order.
pub const COLUMNS: [&str; 8] = [
    "MedInc",
    "HouseAge",
    "AveRooms",
    "AveBedrms",
    "Population",
    "AveOccup",
    "Latitude",
    "Longitude",
];

/// Human-readable labels, same order as [`COLUMNS`].
pub const FEATURE_LABELS: [&str; 8] = [
    "Median income ($10k)",
    "House age (years)",
    "Average rooms",
    "Average bedrooms",
    "Block population",
    "Average occupants",
    "Latitude",
    "Longitude",
];

/// Target column name in the reference dataset (price in $100k units).
pub const TARGET: &str = "MedHouseVal";

/// One neighborhood's feature values, field per column in [`COLUMNS`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HousingFeatures {
    pub med_inc: f64,
    pub house_age: f64,
    pub ave_rooms: f64,
    pub ave_bedrms: f64,
    pub population: f64,
    pub ave_occup: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for HousingFeatures {
    /// A typical San Francisco block, matching the interactive prompt defaults.
    fn default() -> Self {
        Self {
            med_inc: 5.0,
            house_age: 20.0,
            ave_rooms: 6.0,
            ave_bedrms: 1.0,
            population: 1000.0,
            ave_occup: 3.0,
            latitude: 37.7,
            longitude: -122.4,
        }
    }
}

impl HousingFeatures {
    /// Values in [`COLUMNS`] order.
    pub fn values(&self) -> [f64; 8] {
        [
            self.med_inc,
            self.house_age,
            self.ave_rooms,
            self.ave_bedrms,
            self.population,
            self.ave_occup,
            self.latitude,
            self.longitude,
        ]
    }

    /// Single-row feature matrix for model input.
    pub fn to_row(&self) -> Array2<f64> {
        let values = self.values();
        Array2::from_shape_fn((1, values.len()), |(_, c)| values[c])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_follow_column_order() {
        let features = HousingFeatures {
            med_inc: 1.0,
            house_age: 2.0,
            ave_rooms: 3.0,
            ave_bedrms: 4.0,
            population: 5.0,
            ave_occup: 6.0,
            latitude: 7.0,
            longitude: 8.0,
        };
        assert_eq!(features.values(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_to_row_shape() {
        let row = HousingFeatures::default().to_row();
        assert_eq!(row.nrows(), 1);
        assert_eq!(row.ncols(), COLUMNS.len());
        assert_eq!(row[[0, 0]], 5.0);
        assert_eq!(row[[0, 7]], -122.4);
    }

    #[test]
    fn test_labels_cover_all_columns() {
        assert_eq!(COLUMNS.len(), FEATURE_LABELS.len());
    }
}
