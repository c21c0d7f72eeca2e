use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::record::CellValue;
use crate::error::{ModelError, ModelLoadError};

// ---------------------------------------------------------------------------
// Feature matrix
// ---------------------------------------------------------------------------

/// Named columns of cells, one row per dataset record.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl FeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }
}

// ---------------------------------------------------------------------------
// Model capability
// ---------------------------------------------------------------------------

/// A pre-trained estimator as seen by the dashboard.
pub trait SalesModel {
    /// Whether the model declares the feature columns it was trained on.
    fn has_named_features(&self) -> bool;

    /// Declared feature columns in training order. Empty when undeclared.
    fn feature_names(&self) -> &[String];

    /// One prediction per matrix row.
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ModelError>;
}

// ---------------------------------------------------------------------------
// Linear estimator
// ---------------------------------------------------------------------------

/// `intercept + Σ coefficient[j] * x[j]`.
///
/// Text cells are mapped through `encodings[j]` when present (e.g. a
/// month-period ordinal), otherwise parsed as numbers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearEstimator {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub encodings: BTreeMap<usize, BTreeMap<String, f64>>,
}

impl LinearEstimator {
    pub fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ModelError> {
        if self.coefficients.is_empty() {
            return Err(ModelError::NotFitted);
        }
        if features.n_columns() != self.coefficients.len() {
            return Err(ModelError::ShapeMismatch {
                expected: self.coefficients.len(),
                found: features.n_columns(),
            });
        }

        features
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                if row.len() != self.coefficients.len() {
                    return Err(ModelError::ShapeMismatch {
                        expected: self.coefficients.len(),
                        found: row.len(),
                    });
                }
                let mut acc = self.intercept;
                for (j, (cell, coef)) in row.iter().zip(&self.coefficients).enumerate() {
                    acc += coef * self.encode(i, j, &features.columns[j], cell)?;
                }
                Ok(acc)
            })
            .collect()
    }

    fn encode(&self, row: usize, col: usize, name: &str, cell: &CellValue) -> Result<f64, ModelError> {
        if let (Some(table), CellValue::String(s)) = (self.encodings.get(&col), cell) {
            return table.get(s).copied().ok_or_else(|| ModelError::UnknownCategory {
                row,
                column: name.to_string(),
                value: s.clone(),
            });
        }
        match cell {
            CellValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            CellValue::Date(_) | CellValue::Null => Err(type_mismatch(row, name, cell)),
            other => other
                .as_f64()
                .ok_or_else(|| type_mismatch(row, name, cell)),
        }
    }
}

fn type_mismatch(row: usize, column: &str, cell: &CellValue) -> ModelError {
    ModelError::TypeMismatch {
        row,
        column: column.to_string(),
        value: cell.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Concrete model variants
// ---------------------------------------------------------------------------

/// A model trained on a declared, ordered list of feature columns.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedFeatureModel {
    feature_names: Vec<String>,
    estimator: LinearEstimator,
}

impl NamedFeatureModel {
    pub fn new(feature_names: Vec<String>, estimator: LinearEstimator) -> Self {
        Self {
            feature_names,
            estimator,
        }
    }
}

impl SalesModel for NamedFeatureModel {
    fn has_named_features(&self) -> bool {
        true
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ModelError> {
        self.estimator.predict(features)
    }
}

/// A model that only knows how many inputs it takes.
#[derive(Debug, Clone, PartialEq)]
pub struct AnonymousModel {
    estimator: LinearEstimator,
}

impl AnonymousModel {
    pub fn new(estimator: LinearEstimator) -> Self {
        Self { estimator }
    }
}

impl SalesModel for AnonymousModel {
    fn has_named_features(&self) -> bool {
        false
    }

    fn feature_names(&self) -> &[String] {
        &[]
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ModelError> {
        self.estimator.predict(features)
    }
}

/// A model read from disk, either variant.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedModel {
    Named(NamedFeatureModel),
    Anonymous(AnonymousModel),
}

impl LoadedModel {
    /// Short human-readable kind for status displays.
    pub fn describe(&self) -> String {
        match self {
            LoadedModel::Named(m) => format!("named features ({})", m.feature_names.join(", ")),
            LoadedModel::Anonymous(m) => format!("anonymous, {} inputs", m.estimator.coefficients.len()),
        }
    }

    fn inner(&self) -> &dyn SalesModel {
        match self {
            LoadedModel::Named(m) => m,
            LoadedModel::Anonymous(m) => m,
        }
    }
}

impl SalesModel for LoadedModel {
    fn has_named_features(&self) -> bool {
        self.inner().has_named_features()
    }

    fn feature_names(&self) -> &[String] {
        self.inner().feature_names()
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ModelError> {
        self.inner().predict(features)
    }
}

// ---------------------------------------------------------------------------
// Artifact I/O
// ---------------------------------------------------------------------------

/// On-disk model document.
///
/// ```json
/// {
///   "feature_names_in": ["Diskon", "Jumlah"],
///   "coefficients": [-120.0, 48.5],
///   "intercept": 10.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names_in: Option<Vec<String>>,
    #[serde(default)]
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub encodings: BTreeMap<usize, BTreeMap<String, f64>>,
}

impl ModelArtifact {
    pub fn into_model(self) -> Result<LoadedModel, ModelLoadError> {
        let estimator = LinearEstimator {
            coefficients: self.coefficients,
            intercept: self.intercept,
            encodings: self.encodings,
        };
        match self.feature_names_in {
            Some(names) => {
                if !estimator.coefficients.is_empty() && names.len() != estimator.coefficients.len() {
                    return Err(ModelLoadError::Inconsistent {
                        names: names.len(),
                        coefficients: estimator.coefficients.len(),
                    });
                }
                Ok(LoadedModel::Named(NamedFeatureModel::new(names, estimator)))
            }
            None => Ok(LoadedModel::Anonymous(AnonymousModel::new(estimator))),
        }
    }
}

/// Parse a model artifact from JSON text.
pub fn parse_model(json: &str) -> Result<LoadedModel, ModelLoadError> {
    let artifact: ModelArtifact = serde_json::from_str(json)?;
    artifact.into_model()
}

/// Read a model artifact from disk.
pub fn load_model(path: &Path) -> Result<LoadedModel, ModelLoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let model = parse_model(&text)?;
    log::info!("Loaded model from {}: {}", path.display(), model.describe());
    Ok(model)
}
