//! Reference dataset loading and splitting
//!
//! The California housing reference data ships with the crate
//! (`data/california.csv`) so the laboratory works without any external
//! downloads. External CSVs with the same schema can be loaded too.

use crate::error::{CalpriceError, Result};
use crate::schema::{COLUMNS, TARGET};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::Cursor;
use std::path::Path;

const REFERENCE_CSV: &str = include_str!("../data/california.csv");

/// A loaded (features, target) dataset keyed by the housing schema.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
}

impl Dataset {
    /// Load the bundled California housing reference data.
    pub fn reference() -> Result<Self> {
        let reader = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(100))
            .into_reader_with_file_handle(Cursor::new(REFERENCE_CSV.as_bytes()));

        let df = reader.finish()?;
        Ok(Self { df })
    }

    /// Load an external CSV with the housing schema columns.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(1000))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        Ok(Self { df })
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.df.height()
    }

    /// Underlying frame, for inspection commands.
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    /// Feature matrix in [`COLUMNS`] order.
    pub fn features(&self) -> Result<Array2<f64>> {
        columns_to_array2(&self.df, &COLUMNS)
    }

    /// Target vector (price in $100k units).
    pub fn target(&self) -> Result<Array1<f64>> {
        let series = self
            .df
            .column(TARGET)
            .map_err(|_| CalpriceError::ColumnNotFound(TARGET.to_string()))?;
        let as_f64 = series.cast(&DataType::Float64)?;
        let values: Vec<f64> = as_f64
            .f64()
            .map_err(|e| CalpriceError::DataError(e.to_string()))?
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect();
        Ok(Array1::from_vec(values))
    }
}

/// Extract named columns into a row-major `Array2<f64>`.
fn columns_to_array2(df: &DataFrame, col_names: &[&str]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|&name| {
            let series = df
                .column(name)
                .map_err(|_| CalpriceError::ColumnNotFound(name.to_string()))?;
            let as_f64 = series.cast(&DataType::Float64)?;
            let values: Vec<f64> = as_f64
                .f64()
                .map_err(|e| CalpriceError::DataError(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_refs[c][r]
    }))
}

/// Shuffled train/test split with a fixed seed.
///
/// Returns `(x_train, x_test, y_train, y_test)`. The same seed and fraction
/// always produce the same partition.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_fraction: f64,
    seed: u64,
) -> Result<(Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>)> {
    let n = x.nrows();
    if n != y.len() {
        return Err(CalpriceError::ShapeMismatch {
            expected: format!("y length = {}", n),
            actual: format!("y length = {}", y.len()),
        });
    }
    if !(0.0..1.0).contains(&test_fraction) || test_fraction <= 0.0 {
        return Err(CalpriceError::InvalidParameter {
            name: "test_fraction".to_string(),
            value: test_fraction.to_string(),
            reason: "must be in (0, 1)".to_string(),
        });
    }

    if n < 2 {
        return Err(CalpriceError::DataError(
            "need at least 2 rows to split".to_string(),
        ));
    }
    let test_size = ((n as f64 * test_fraction).round() as usize).clamp(1, n - 1);

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(test_size);

    let x_train = x.select(Axis(0), train_idx);
    let x_test = x.select(Axis(0), test_idx);
    let y_train = Array1::from_vec(train_idx.iter().map(|&i| y[i]).collect());
    let y_test = Array1::from_vec(test_idx.iter().map(|&i| y[i]).collect());

    Ok((x_train, x_test, y_train, y_test))
}
