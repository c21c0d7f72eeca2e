use std::path::Path;
use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::data::aggregate::OverviewView;
use crate::data::filter::{self, FilterSpec};
use crate::data::loader;
use crate::data::record::SalesDataset;
use crate::error::{DataSourceError, ModelLoadError, PredictionFailure};
use crate::predict::{self, LoadedModel, PredictionOutput};

/// Read-only state shared by every view: the dataset and the model, loaded
/// once at startup and never refreshed.
pub struct DashboardContext {
    config: DashboardConfig,
    dataset: SalesDataset,
    model: Result<LoadedModel, Arc<ModelLoadError>>,
}

impl DashboardContext {
    /// Load the dataset and model named by `config`.
    ///
    /// A dataset failure is returned. A model failure is kept and only
    /// surfaces on the prediction view.
    pub fn load(config: DashboardConfig) -> Result<Self, DataSourceError> {
        let dataset = loader::load_file(&config.data.path)?;
        let model = predict::load_model(&config.model.path);
        Ok(Self::new(config, dataset, model))
    }

    pub fn new(
        config: DashboardConfig,
        dataset: SalesDataset,
        model: Result<LoadedModel, ModelLoadError>,
    ) -> Self {
        let model = model.map_err(|e| {
            log::error!("Model unavailable, prediction view disabled: {e}");
            Arc::new(e)
        });
        Self {
            config,
            dataset,
            model,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn dataset(&self) -> &SalesDataset {
        &self.dataset
    }

    /// The loaded model, or the reason it could not be loaded.
    pub fn model(&self) -> Result<&LoadedModel, &ModelLoadError> {
        self.model.as_ref().map_err(|e| &**e)
    }

    pub fn data_path(&self) -> &Path {
        &self.config.data.path
    }

    /// Filter the dataset and derive every overview chart and metric.
    pub fn overview(&self, spec: &FilterSpec) -> OverviewView {
        let filtered = filter::apply(&self.dataset, spec);
        OverviewView::compute(&filtered, self.config.overview.top_products)
    }

    /// Predict over the whole (unfiltered) dataset.
    pub fn predictions(&self, skip_undated: bool) -> Result<PredictionOutput, PredictionFailure> {
        let model = self
            .model
            .as_ref()
            .map_err(|e| PredictionFailure::ModelUnavailable(Arc::clone(e)))?;
        let result = if skip_undated {
            predict::predict(&self.dataset.dated_only(), model)
        } else {
            predict::predict(&self.dataset, model)
        };
        result.map_err(|e| {
            log::error!("Prediction failed: {e}");
            PredictionFailure::Predict(e)
        })
    }
}
