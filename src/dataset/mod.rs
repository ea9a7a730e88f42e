//! Feature/label datasets derived from the sample store.
//!
//! A dataset is a cache: it can always be rebuilt from stored samples with
//! [`build_dataset`], and is persisted as a checksummed binary file so
//! training can reload it without re-extracting features.

use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::blob::BlobError;
use crate::features::FeatureError;
use crate::store::SampleStoreError;

mod build;
mod persist;

pub use build::build_dataset;
pub use persist::{DEFAULT_DATASET_FILE_NAME, load_dataset, save_dataset};

/// Errors returned while building, saving or loading datasets.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Dataset file not found: {0}")]
    NotFound(PathBuf),
    #[error("Dataset file {path} is corrupt: {source}")]
    Corrupt { path: PathBuf, source: BlobError },
    #[error("Dataset io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Feature row has {actual} values, expected {expected}")]
    FeatureLength { expected: usize, actual: usize },
    #[error("Sample {index} could not be featurized: {source}")]
    Feature { index: usize, source: FeatureError },
    #[error(transparent)]
    Store(#[from] SampleStoreError),
}

/// Number of samples per label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelCounts {
    pub english: usize,
    pub non_english: usize,
}

impl LabelCounts {
    /// True when both labels are represented.
    pub fn has_both(&self) -> bool {
        self.english > 0 && self.non_english > 0
    }
}

/// Ordered feature vectors with their English/non-English labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Length of every row in `x`.
    pub feature_len: usize,
    /// Feature rows.
    pub x: Vec<Vec<f32>>,
    /// Labels, `true` for English.
    pub y: Vec<bool>,
}

impl Dataset {
    /// Empty dataset whose rows must have `feature_len` values.
    pub fn new(feature_len: usize) -> Self {
        Self {
            feature_len,
            x: Vec::new(),
            y: Vec::new(),
        }
    }

    /// Append a row, rejecting rows of the wrong length.
    pub fn push(&mut self, row: Vec<f32>, label: bool) -> Result<(), DatasetError> {
        if row.len() != self.feature_len {
            return Err(DatasetError::FeatureLength {
                expected: self.feature_len,
                actual: row.len(),
            });
        }
        self.x.push(row);
        self.y.push(label);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Iterate `(row, label)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&[f32], bool)> {
        self.x.iter().map(Vec::as_slice).zip(self.y.iter().copied())
    }

    pub fn label_counts(&self) -> LabelCounts {
        let english = self.y.iter().filter(|&&label| label).count();
        LabelCounts {
            english,
            non_english: self.y.len() - english,
        }
    }

    /// Split into `(train, test)` with roughly `test_fraction` of each label held out.
    ///
    /// The split is stratified and deterministic for a given seed; both parts
    /// keep the original relative order. A label with at least two rows always
    /// leaves one row in each part when `test_fraction` is positive.
    pub fn split_holdout(&self, test_fraction: f64, seed: u64) -> (Dataset, Dataset) {
        let fraction = if test_fraction.is_finite() {
            test_fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mut rng = StdRng::seed_from_u64(seed);
        let mut test_indices = Vec::new();
        for label in [true, false] {
            let mut indices: Vec<usize> = (0..self.len()).filter(|&i| self.y[i] == label).collect();
            if fraction == 0.0 || indices.is_empty() {
                continue;
            }
            indices.shuffle(&mut rng);
            let mut take = (indices.len() as f64 * fraction).round() as usize;
            if indices.len() >= 2 {
                take = take.clamp(1, indices.len() - 1);
            }
            test_indices.extend_from_slice(&indices[..take.min(indices.len())]);
        }
        test_indices.sort_unstable();

        let mut train = Dataset::new(self.feature_len);
        let mut test = Dataset::new(self.feature_len);
        let mut held = test_indices.into_iter().peekable();
        for (idx, (row, label)) in self.x.iter().zip(&self.y).enumerate() {
            let target = if held.peek() == Some(&idx) {
                held.next();
                &mut test
            } else {
                &mut train
            };
            target.x.push(row.clone());
            target.y.push(*label);
        }
        (train, test)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy(labels: &[bool]) -> Dataset {
        let mut dataset = Dataset::new(2);
        for (i, &label) in labels.iter().enumerate() {
            dataset.push(vec![i as f32, 1.0], label).unwrap();
        }
        dataset
    }

    #[test]
    fn push_rejects_wrong_width() {
        let mut dataset = Dataset::new(3);
        let err = dataset.push(vec![1.0], true).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::FeatureLength {
                expected: 3,
                actual: 1
            }
        ));
        assert!(dataset.is_empty());
    }

    #[test]
    fn label_counts_track_both_classes() {
        let counts = toy(&[true, false, true]).label_counts();
        assert_eq!(
            counts,
            LabelCounts {
                english: 2,
                non_english: 1
            }
        );
        assert!(counts.has_both());
        assert!(!toy(&[true, true]).label_counts().has_both());
    }

    #[test]
    fn holdout_split_is_stratified_and_deterministic() {
        let labels: Vec<bool> = (0..20).map(|i| i % 2 == 0).collect();
        let dataset = toy(&labels);
        let (train, test) = dataset.split_holdout(0.25, 11);
        assert_eq!(train.len() + test.len(), 20);
        assert!(train.label_counts().has_both());
        assert!(test.label_counts().has_both());
        assert_eq!(test.len(), 6);
        let again = dataset.split_holdout(0.25, 11);
        assert_eq!(again.1, test);
        let firsts: Vec<f32> = train.x.iter().map(|row| row[0]).collect();
        assert!(firsts.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn zero_fraction_keeps_everything_for_training() {
        let dataset = toy(&[true, false]);
        let (train, test) = dataset.split_holdout(0.0, 1);
        assert_eq!(train, dataset);
        assert!(test.is_empty());
    }
}
