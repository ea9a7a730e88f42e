use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app_dirs;
use crate::features::FeatureConfig;
use crate::generator::GeneratorConfig;
use crate::ml::logreg::TrainOptions;

use super::defaults::{
    clamp_holdout_fraction, default_database_file, default_dataset_file, default_holdout_seed,
    default_model_file,
};
use super::errors::ConfigError;

/// Everything the pipeline needs, grouped by concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub training: TrainOptions,
    #[serde(default)]
    pub evaluation: EvaluationSettings,
}

/// Where the sample database and derived artifacts live.
///
/// Relative file names are resolved against `data_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory for the database, dataset and model; defaults to `<app root>/data`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_database_file")]
    pub database_file: PathBuf,
    #[serde(default = "default_dataset_file")]
    pub dataset_file: PathBuf,
    #[serde(default = "default_model_file")]
    pub model_file: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            database_file: default_database_file(),
            dataset_file: default_dataset_file(),
            model_file: default_model_file(),
        }
    }
}

/// Controls for `--test` runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSettings {
    /// Fraction of the dataset held out of training and scored separately; zero disables.
    #[serde(default)]
    pub holdout_fraction: f64,
    #[serde(default = "default_holdout_seed")]
    pub holdout_seed: u64,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            holdout_fraction: 0.0,
            holdout_seed: default_holdout_seed(),
        }
    }
}

/// Absolute locations of the store and artifacts for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub data_dir: PathBuf,
    pub database: PathBuf,
    pub dataset: PathBuf,
    pub model: PathBuf,
}

impl PipelineConfig {
    /// Clamp values that would otherwise make a run meaningless.
    pub fn normalized(mut self) -> Self {
        self.evaluation.holdout_fraction = clamp_holdout_fraction(self.evaluation.holdout_fraction);
        self.generator.chunk_length = self.generator.chunk_length.max(1);
        self.training.batch_size = self.training.batch_size.max(1);
        self
    }

    /// Resolve the data directory, creating it if needed, and the artifact paths inside it.
    pub fn resolve_paths(&self) -> Result<ResolvedPaths, ConfigError> {
        let data_dir = match &self.storage.data_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
                    path: dir.clone(),
                    source,
                })?;
                dir.clone()
            }
            None => app_dirs::data_dir()?,
        };
        Ok(ResolvedPaths {
            database: under(&data_dir, &self.storage.database_file),
            dataset: under(&data_dir, &self.storage.dataset_file),
            model: under(&data_dir, &self.storage.model_file),
            data_dir,
        })
    }
}

fn under(dir: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        dir.join(file)
    }
}
