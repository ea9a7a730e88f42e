use std::path::PathBuf;

use crate::dataset::DEFAULT_DATASET_FILE_NAME;
use crate::ml::logreg::DEFAULT_MODEL_FILE_NAME;
use crate::store::DB_FILE_NAME;

/// Largest fraction of the dataset that may be held out for testing.
pub(super) const MAX_HOLDOUT_FRACTION: f64 = 0.9;

pub(super) fn clamp_holdout_fraction(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, MAX_HOLDOUT_FRACTION)
    }
}

pub(super) fn default_database_file() -> PathBuf {
    PathBuf::from(DB_FILE_NAME)
}

pub(super) fn default_dataset_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATASET_FILE_NAME)
}

pub(super) fn default_model_file() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_FILE_NAME)
}

pub(super) fn default_holdout_seed() -> u64 {
    7
}
