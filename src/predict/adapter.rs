use chrono::Datelike;

use crate::data::record::{
    CellValue, SalesDataset, SalesRecord, DISCOUNT, MONTH, QUANTITY, UNIT_PRICE,
};
use crate::error::PredictError;

use super::model::{FeatureMatrix, SalesModel};

/// Day-of-month feature derived from the order date.
pub const DAY_ORDINAL: &str = "day_ordinal";

/// Name of the appended prediction column.
pub const PREDICTION: &str = "Prediction";

/// Features used when the model does not declare its own.
pub const DEFAULT_FEATURES: [&str; 5] = [MONTH, DISCOUNT, UNIT_PRICE, QUANTITY, DAY_ORDINAL];

/// The input dataset with one prediction per row.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutput {
    dataset: SalesDataset,
    predictions: Vec<f64>,
}

impl PredictionOutput {
    pub fn dataset(&self) -> &SalesDataset {
        &self.dataset
    }

    /// The `Prediction` column, aligned with `dataset()` row for row.
    pub fn predictions(&self) -> &[f64] {
        &self.predictions
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SalesRecord, f64)> + '_ {
        self.dataset.iter().zip(self.predictions.iter().copied())
    }

    /// `(OrderID, Prediction)` for the first `n` rows.
    pub fn preview(&self, n: usize) -> Vec<(String, f64)> {
        self.iter()
            .take(n)
            .map(|(r, p)| (r.order_id.clone(), p))
            .collect()
    }
}

/// Pick the feature columns: the model's own list when it has one,
/// otherwise [`DEFAULT_FEATURES`].
pub fn feature_columns(model: &dyn SalesModel) -> Vec<String> {
    if model.has_named_features() {
        model.feature_names().to_vec()
    } else {
        DEFAULT_FEATURES.iter().map(|c| c.to_string()).collect()
    }
}

/// Build the feature matrix for every row of `dataset`.
///
/// Fails if any row lacks an order date (no `day_ordinal`) or if a selected
/// column is not part of the dataset.
pub fn build_features(dataset: &SalesDataset, columns: &[String]) -> Result<FeatureMatrix, PredictError> {
    let day_ordinals = dataset
        .iter()
        .enumerate()
        .map(|(row, r)| {
            r.order_date
                .map(|d| d.day() as i64)
                .ok_or_else(|| PredictError::FeatureDerivation {
                    row,
                    order_id: r.order_id.clone(),
                })
        })
        .collect::<Result<Vec<i64>, _>>()?;

    if let Some(missing) = columns
        .iter()
        .find(|c| c.as_str() != DAY_ORDINAL && !dataset.has_column(c))
    {
        return Err(PredictError::MissingFeature(missing.clone()));
    }

    let rows = dataset
        .iter()
        .zip(day_ordinals)
        .map(|(r, day)| {
            columns
                .iter()
                .map(|c| match c.as_str() {
                    DAY_ORDINAL => CellValue::Integer(day),
                    name => r.column(name).unwrap_or(CellValue::Null),
                })
                .collect()
        })
        .collect();

    Ok(FeatureMatrix {
        columns: columns.to_vec(),
        rows,
    })
}

/// Run `model` over every row of `dataset`.
///
/// Either every row gets a prediction or the call fails; there is no
/// partial result.
pub fn predict(dataset: &SalesDataset, model: &dyn SalesModel) -> Result<PredictionOutput, PredictError> {
    let columns = feature_columns(model);
    let features = build_features(dataset, &columns)?;
    let predictions = model.predict(&features)?;

    if predictions.len() != dataset.len() {
        return Err(PredictError::RowCountMismatch {
            expected: dataset.len(),
            found: predictions.len(),
        });
    }

    log::info!(
        "Predicted {} rows using features [{}]",
        predictions.len(),
        columns.join(", ")
    );
    Ok(PredictionOutput {
        dataset: dataset.clone(),
        predictions,
    })
}
