use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Failure to produce the canonical dataset. Fatal at startup.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("cannot read data source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported data source extension: .{0}")]
    UnsupportedFormat(String),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("malformed Arrow batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("data source is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}: {message}")]
    MalformedRow { row: usize, message: String },

    #[error("row {row}, column {column}: invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
}

/// Failure to read a model artifact from disk.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("cannot read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model artifact: {0}")]
    Format(#[from] serde_json::Error),

    #[error("model declares {names} feature names but has {coefficients} coefficients")]
    Inconsistent { names: usize, coefficients: usize },
}

/// Faults raised by an estimator while predicting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("model is not fitted")]
    NotFitted,

    #[error("feature matrix has {found} columns, model expects {expected}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("row {row}, feature '{column}': value '{value}' is not numeric")]
    TypeMismatch {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}, feature '{column}': unknown category '{value}'")]
    UnknownCategory {
        row: usize,
        column: String,
        value: String,
    },
}

/// Failures of the prediction view. The overview never depends on these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("model expects feature '{0}' which the dataset does not have")]
    MissingFeature(String),

    #[error("row {row} (order {order_id}): order date is missing, cannot derive day_ordinal")]
    FeatureDerivation { row: usize, order_id: String },

    #[error("prediction failed: {0}")]
    Prediction(#[from] ModelError),

    #[error("model returned {found} predictions for {expected} rows")]
    RowCountMismatch { expected: usize, found: usize },
}

/// Why the prediction view has nothing to show.
#[derive(Debug, Clone, Error)]
pub enum PredictionFailure {
    #[error("model could not be loaded: {0}")]
    ModelUnavailable(Arc<ModelLoadError>),

    #[error(transparent)]
    Predict(#[from] PredictError),
}

/// Invalid or unreadable dashboard configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("config field {field}: {message}")]
    Validation { field: String, message: String },
}
