//! Dashboard configuration.
//!
//! Resolution order (highest priority first):
//! 1. Environment variables (`SALES_DASHBOARD_DATA`, `SALES_DASHBOARD_MODEL`)
//! 2. Config file (`SALES_DASHBOARD_CONFIG`, else `dashboard.toml` if present)
//! 3. Compiled defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const CONFIG_ENV: &str = "SALES_DASHBOARD_CONFIG";
pub const DATA_ENV: &str = "SALES_DASHBOARD_DATA";
pub const MODEL_ENV: &str = "SALES_DASHBOARD_MODEL";
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/data_dummy_retail_store.csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/model_sales.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverviewConfig {
    /// Length of the top-products ranking.
    pub top_products: usize,
}

impl Default for OverviewConfig {
    fn default() -> Self {
        Self { top_products: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Rows shown in the prediction table.
    pub preview_rows: usize,
    pub histogram_bins: usize,
    /// Drop undated rows before predicting instead of failing.
    pub skip_undated_rows: bool,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            preview_rows: 15,
            histogram_bins: 30,
            skip_undated_rows: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub overview: OverviewConfig,
    pub prediction: PredictionConfig,
}

impl DashboardConfig {
    /// Resolve configuration from file and environment.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(
            std::env::var_os(DATA_ENV).map(PathBuf::from),
            std::env::var_os(MODEL_ENV).map(PathBuf::from),
        );
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file. Unknown keys are ignored.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        log::debug!("Read configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    fn apply_env_overrides(&mut self, data: Option<PathBuf>, model: Option<PathBuf>) {
        if let Some(path) = data {
            self.data.path = path;
        }
        if let Some(path) = model {
            self.model.path = path;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("overview.top_products", self.overview.top_products),
            ("prediction.preview_rows", self.prediction.preview_rows),
            ("prediction.histogram_bins", self.prediction.histogram_bins),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Validation {
                    field: field.to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_dashboard() {
        let config = DashboardConfig::default();
        assert_eq!(config.overview.top_products, 10);
        assert_eq!(config.prediction.preview_rows, 15);
        assert_eq!(config.prediction.histogram_bins, 30);
        assert!(!config.prediction.skip_undated_rows);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = DashboardConfig::from_toml(
            r#"
            [data]
            path = "sales.parquet"

            [prediction]
            skip_undated_rows = true

            [unknown]
            ignored = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.data.path, PathBuf::from("sales.parquet"));
        assert!(config.prediction.skip_undated_rows);
        assert_eq!(config.prediction.preview_rows, 15);
        assert_eq!(config.model, ModelConfig::default());
    }

    #[test]
    fn zero_bins_fail_validation() {
        let config = DashboardConfig::from_toml("[prediction]\nhistogram_bins = 0\n").unwrap();
        match config.validate() {
            Err(ConfigError::Validation { field, .. }) => assert_eq!(field, "prediction.histogram_bins"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn bad_toml_is_parse_error() {
        assert!(matches!(
            DashboardConfig::from_toml("[data\npath = 1"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn env_overrides_replace_paths() {
        let mut config = DashboardConfig::default();
        config.apply_env_overrides(Some("a.csv".into()), None);
        assert_eq!(config.data.path, PathBuf::from("a.csv"));
        assert_eq!(config.model, ModelConfig::default());
    }

    #[test]
    fn reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        std::fs::write(&path, "[overview]\ntop_products = 5\n").unwrap();
        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.overview.top_products, 5);

        let missing = DashboardConfig::from_file(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
