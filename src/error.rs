//! Error types for the calprice crate

use thiserror::Error;

/// Result type alias for calprice operations
pub type Result<T> = std::result::Result<T, CalpriceError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum CalpriceError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for CalpriceError {
    fn from(err: polars::error::PolarsError) -> Self {
        CalpriceError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for CalpriceError {
    fn from(err: serde_json::Error) -> Self {
        CalpriceError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for CalpriceError {
    fn from(err: ndarray::ShapeError) -> Self {
        CalpriceError::ShapeMismatch {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
