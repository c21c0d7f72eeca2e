/// Prediction layer: the model capability and the dataset → features adapter.
///
/// ```text
///   SalesDataset ──► adapter::build_features ──► FeatureMatrix
///                          ▲                          │
///                  feature_columns(model)             ▼
///                                              SalesModel::predict
///                                                     │
///                                                     ▼
///                                             PredictionOutput
/// ```

pub mod adapter;
pub mod model;

pub use adapter::{predict, PredictionOutput};
pub use model::{load_model, LoadedModel, SalesModel};
