//! End-to-end orchestration: samples, dataset, model and evaluation.
//!
//! A [`Pipeline`] owns the single sample store connection for a run and hands
//! borrowed access to each stage. Dropping the pipeline closes the store;
//! [`Pipeline::close`] does the same but reports close failures.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

use crate::config::{ConfigError, PipelineConfig, ResolvedPaths};
use crate::dataset::{self, Dataset, DatasetError};
use crate::eval::{self, EvalError, EvalReport};
use crate::generator::{self, GenerationSummary, GeneratorError};
use crate::ml::logreg::{
    self, LogRegModel, ModelFileError, PredictError, TrainError, predict_probability,
};
use crate::store::{SampleStore, SampleStoreError};

/// Any failure surfaced by a pipeline stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] SampleStoreError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Train(#[from] TrainError),
    #[error(transparent)]
    Model(#[from] ModelFileError),
    #[error(transparent)]
    Predict(#[from] PredictError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Scoped handle over the store and artifact locations for one run.
pub struct Pipeline {
    config: PipelineConfig,
    paths: ResolvedPaths,
    store: SampleStore,
}

impl Pipeline {
    /// Resolve paths and open the sample store.
    pub fn open(config: PipelineConfig) -> Result<Self, PipelineError> {
        let config = config.normalized();
        let paths = config.resolve_paths()?;
        if config.features.has_case_skew() {
            tracing::warn!(
                "Case folding differs between dataset building ({}) and prediction ({})",
                config.features.fold_case_on_build,
                config.features.fold_case_on_predict
            );
        }
        let store = SampleStore::open(&paths.database)?;
        tracing::debug!("Opened sample store at {}", paths.database.display());
        Ok(Self {
            config,
            paths,
            store,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn paths(&self) -> &ResolvedPaths {
        &self.paths
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    /// Close the store, reporting any failure.
    pub fn close(self) -> Result<(), PipelineError> {
        self.store.close()?;
        Ok(())
    }

    /// Delete every stored sample.
    pub fn clear_samples(&self) -> Result<usize, PipelineError> {
        let removed = self.store.clear_all_samples()?;
        tracing::info!("Removed {removed} samples");
        Ok(removed)
    }

    /// Store English chunks from `files` (or the configured sources) plus as many random samples.
    pub fn generate_samples(&self, files: &[PathBuf]) -> Result<GenerationSummary, PipelineError> {
        let files = self.source_files(files);
        let settings = &self.config.generator;
        let summary = match settings.seed {
            Some(seed) => generator::generate_samples(
                &self.store,
                &files,
                settings,
                &mut StdRng::seed_from_u64(seed),
            )?,
            None => generator::generate_samples(&self.store, &files, settings, &mut rand::rng())?,
        };
        tracing::info!(
            "Generated {} samples ({} English, {} random)",
            summary.total(),
            summary.english,
            summary.random
        );
        Ok(summary)
    }

    /// Rebuild the dataset from the store and persist it.
    pub fn generate_dataset(&self) -> Result<Dataset, PipelineError> {
        let dataset = dataset::build_dataset(&self.store, &self.config.features)?;
        dataset::save_dataset(&dataset, &self.paths.dataset)?;
        Ok(dataset)
    }

    /// Train on the persisted dataset (minus any held-out split) and persist the model.
    pub fn train_model(&self) -> Result<LogRegModel, PipelineError> {
        let (train, _) = self.split_dataset()?;
        let model = logreg::train_logreg(&train, &self.config.training)?;
        logreg::save_model(&model, &self.paths.model)?;
        Ok(model)
    }

    /// Load a persisted model from `path`, or from the configured model file.
    pub fn load_model(&self, path: Option<&Path>) -> Result<LogRegModel, PipelineError> {
        let path = path.unwrap_or(self.paths.model.as_path());
        let model = logreg::load_model(path)?;
        if model.feature_len != self.config.features.histogram_bins {
            tracing::warn!(
                "Model expects {} features but extraction produces {}",
                model.feature_len,
                self.config.features.histogram_bins
            );
        }
        Ok(model)
    }

    /// Score `model` on the held-out split when one is configured, else on the whole dataset.
    pub fn run_test(&self, model: &LogRegModel) -> Result<EvalReport, PipelineError> {
        let (train, test) = self.split_dataset()?;
        let target = if self.holdout_enabled() { &test } else { &train };
        Ok(eval::evaluate(model, target)?)
    }

    /// Prompt for text on `input` until an empty line or end of input.
    pub fn run_interactive<R: BufRead, W: Write>(
        &self,
        model: &LogRegModel,
        input: R,
        output: W,
    ) -> Result<usize, PipelineError> {
        Ok(eval::interactive_loop(
            model,
            &self.config.features,
            input,
            output,
        )?)
    }

    /// Probability that `text` is English.
    pub fn predict(&self, model: &LogRegModel, text: &str) -> Result<f32, PipelineError> {
        Ok(predict_probability(model, text, &self.config.features)?)
    }

    fn holdout_enabled(&self) -> bool {
        self.config.evaluation.holdout_fraction > 0.0
    }

    fn split_dataset(&self) -> Result<(Dataset, Dataset), PipelineError> {
        let dataset = dataset::load_dataset(&self.paths.dataset)?;
        if !self.holdout_enabled() {
            return Ok((dataset, Dataset::new(self.config.features.histogram_bins)));
        }
        let evaluation = &self.config.evaluation;
        let (train, test) = dataset.split_holdout(evaluation.holdout_fraction, evaluation.holdout_seed);
        tracing::info!(
            "Holding out {} of {} rows for testing",
            test.len(),
            train.len() + test.len()
        );
        Ok((train, test))
    }

    fn source_files(&self, files: &[PathBuf]) -> Vec<PathBuf> {
        let files = if files.is_empty() {
            &self.config.generator.source_files
        } else {
            files
        };
        files
            .iter()
            .map(|file| {
                if file.is_absolute() || file.exists() {
                    file.clone()
                } else {
                    self.paths.data_dir.join(file)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    const ENGLISH: &str = "It is a truth universally acknowledged, that a single man in \
        possession of a good fortune, must be in want of a wife. However little known the \
        feelings or views of such a man may be on his first entering a neighbourhood, this \
        truth is so well fixed in the minds of the surrounding families, that he is \
        considered the rightful property of some one or other of their daughters.";

    fn open_pipeline(dir: &TempDir) -> Pipeline {
        let mut config = PipelineConfig::default();
        config.storage.data_dir = Some(dir.path().join("data"));
        config.generator.chunk_length = 40;
        config.generator.seed = Some(3);
        config.training.epochs = 60;
        Pipeline::open(config).unwrap()
    }

    #[test]
    fn relative_sources_fall_back_to_the_data_dir() {
        let dir = tempdir().unwrap();
        let pipeline = open_pipeline(&dir);
        std::fs::write(pipeline.paths().data_dir.join("book.txt"), ENGLISH).unwrap();

        let summary = pipeline
            .generate_samples(&[PathBuf::from("book.txt")])
            .unwrap();
        assert!(summary.english > 0);
        assert_eq!(summary.english, summary.random);
        assert_eq!(pipeline.store().count_samples().unwrap(), summary.total());
        assert_eq!(pipeline.clear_samples().unwrap(), summary.total());
    }

    #[test]
    fn training_without_a_dataset_is_not_found() {
        let dir = tempdir().unwrap();
        let pipeline = open_pipeline(&dir);
        let err = pipeline.train_model().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Dataset(DatasetError::NotFound(_))
        ));
        let err = pipeline.load_model(None).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Model(ModelFileError::NotFound(_))
        ));
    }

    #[test]
    fn stages_chain_through_persisted_artifacts() {
        let dir = tempdir().unwrap();
        let pipeline = open_pipeline(&dir);
        let book = dir.path().join("book.txt");
        std::fs::write(&book, ENGLISH.repeat(3)).unwrap();

        pipeline.generate_samples(&[book]).unwrap();
        let dataset = pipeline.generate_dataset().unwrap();
        assert!(pipeline.paths().dataset.exists());
        let model = pipeline.train_model().unwrap();
        assert_eq!(pipeline.load_model(None).unwrap(), model);

        let report = pipeline.run_test(&model).unwrap();
        assert_eq!(report.total, dataset.len());
        let probability = pipeline.predict(&model, "the cat sat on the mat").unwrap();
        assert!((0.0..=1.0).contains(&probability));
        pipeline.close().unwrap();
    }
}
