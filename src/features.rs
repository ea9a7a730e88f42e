//! Byte-frequency histogram features for text samples.
//!
//! A text is encoded as UTF-8, every byte is counted into the bin matching its
//! value and the counts are divided by the byte total, so a vector always sums
//! to one. The default width keeps 264 bins for compatibility with existing
//! datasets and models; bins 256 and above can never be hit by a byte and stay
//! zero.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default histogram width (256 byte values plus 8 reserved, always-zero bins).
pub const DEFAULT_HISTOGRAM_BINS: usize = 264;

/// Inputs the extractor refuses to turn into a feature vector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    /// Empty text has no bytes to normalize by.
    #[error("cannot extract features from empty text")]
    EmptyInput,
    /// A byte value has no bin in a histogram narrower than 256.
    #[error("byte value {byte} does not fit a histogram of {bins} bins")]
    ByteOutOfRange { byte: u8, bins: usize },
    /// The configured histogram has no bins at all.
    #[error("histogram width must be at least one bin")]
    ZeroWidth,
}

/// Feature extraction settings shared by dataset building and prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Length of every produced feature vector.
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
    /// Lower-case sample content before extraction when building datasets.
    #[serde(default = "default_true")]
    pub fold_case_on_build: bool,
    /// Lower-case live input before extraction when predicting.
    #[serde(default)]
    pub fold_case_on_predict: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            fold_case_on_build: true,
            fold_case_on_predict: false,
        }
    }
}

impl FeatureConfig {
    /// Extract the feature vector for `text`, optionally lower-casing it first.
    pub fn features_for(&self, text: &str, case_fold: bool) -> Result<Vec<f32>, FeatureError> {
        if case_fold {
            byte_histogram(text.to_lowercase().as_bytes(), self.histogram_bins)
        } else {
            byte_histogram(text.as_bytes(), self.histogram_bins)
        }
    }

    /// True when training and serving extract features differently.
    pub fn has_case_skew(&self) -> bool {
        self.fold_case_on_build != self.fold_case_on_predict
    }
}

/// Extract features with the default histogram width.
pub fn features_for(text: &str, case_fold: bool) -> Result<Vec<f32>, FeatureError> {
    FeatureConfig::default().features_for(text, case_fold)
}

/// Normalized histogram of `bytes` over `bins` buckets.
pub fn byte_histogram(bytes: &[u8], bins: usize) -> Result<Vec<f32>, FeatureError> {
    if bins == 0 {
        return Err(FeatureError::ZeroWidth);
    }
    if bytes.is_empty() {
        return Err(FeatureError::EmptyInput);
    }
    let mut counts = vec![0u64; bins];
    for &byte in bytes {
        let bin = counts
            .get_mut(byte as usize)
            .ok_or(FeatureError::ByteOutOfRange { byte, bins })?;
        *bin += 1;
    }
    let total = bytes.len() as f64;
    Ok(counts
        .into_iter()
        .map(|count| (count as f64 / total) as f32)
        .collect())
}

fn default_histogram_bins() -> usize {
    DEFAULT_HISTOGRAM_BINS
}

fn default_true() -> bool {
    true
}
