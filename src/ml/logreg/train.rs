use rand::rngs::StdRng;
use rand::{Rng, SeedableRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{LogRegModel, linear, sigmoid};
use crate::dataset::Dataset;

/// Training options for the English/non-English logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainOptions {
    pub epochs: usize,
    pub learning_rate: f32,
    pub l2: f32,
    pub batch_size: usize,
    pub seed: u64,
    /// Weight each label inversely to its frequency.
    pub balance_classes: bool,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            epochs: 200,
            learning_rate: 2.0,
            l2: 1e-4,
            batch_size: 64,
            seed: 42,
            balance_classes: true,
        }
    }
}

/// Errors returned by [`train_logreg`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrainError {
    /// Both labels must be present to fit a binary classifier.
    #[error(
        "Training needs both English and non-English samples (got {english} English, {non_english} non-English)"
    )]
    InsufficientData { english: usize, non_english: usize },
    #[error("Training rows have zero features")]
    EmptyFeatures,
    #[error("Row {row} has {actual} features, expected {expected}")]
    InconsistentFeatureLength {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Mismatched training inputs/labels ({rows} rows, {labels} labels)")]
    MismatchedLabels { rows: usize, labels: usize },
    #[error("Training diverged: {0}")]
    Diverged(String),
}

/// Fit a logistic regression by mini-batch gradient descent on the L2-regularised log-likelihood.
///
/// Deterministic for a given dataset and `options.seed`.
pub fn train_logreg(dataset: &Dataset, options: &TrainOptions) -> Result<LogRegModel, TrainError> {
    if dataset.x.len() != dataset.y.len() {
        return Err(TrainError::MismatchedLabels {
            rows: dataset.x.len(),
            labels: dataset.y.len(),
        });
    }
    let counts = dataset.label_counts();
    if !counts.has_both() {
        return Err(TrainError::InsufficientData {
            english: counts.english,
            non_english: counts.non_english,
        });
    }
    let dim = dataset.feature_len;
    if dim == 0 {
        return Err(TrainError::EmptyFeatures);
    }
    for (row, x) in dataset.x.iter().enumerate() {
        if x.len() != dim {
            return Err(TrainError::InconsistentFeatureLength {
                row,
                expected: dim,
                actual: x.len(),
            });
        }
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut weights: Vec<f32> = (0..dim)
        .map(|_| (rng.random::<f32>() - 0.5) * 0.01)
        .collect();
    let mut bias = 0.0f32;

    let mut indices: Vec<usize> = (0..dataset.len()).collect();
    let batch_size = options.batch_size.max(1);
    let lr = options.learning_rate;
    let l2 = options.l2.max(0.0);

    // [non-English, English]
    let class_weights = if options.balance_classes {
        let total = dataset.len() as f32;
        [
            total / (2.0 * counts.non_english as f32),
            total / (2.0 * counts.english as f32),
        ]
    } else {
        [1.0, 1.0]
    };

    let mut grad_w = vec![0.0f32; dim];
    for _epoch in 0..options.epochs {
        indices.shuffle(&mut rng);
        for chunk in indices.chunks(batch_size) {
            grad_w.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_b = 0.0f32;
            let mut batch_weight = 0.0f32;
            for &idx in chunk {
                let x = &dataset.x[idx];
                let label = dataset.y[idx];
                let weight = class_weights[usize::from(label)];
                let p = sigmoid(linear(&weights, bias, x));
                let diff = (p - if label { 1.0 } else { 0.0 }) * weight;
                for (g, &v) in grad_w.iter_mut().zip(x) {
                    *g += diff * v;
                }
                grad_b += diff;
                batch_weight += weight;
            }
            if batch_weight == 0.0 {
                continue;
            }
            let inv = 1.0 / batch_weight;
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= lr * (g * inv + l2 * *w);
            }
            bias -= lr * grad_b * inv;
        }
    }

    let model = LogRegModel {
        feature_len: dim,
        weights,
        bias,
    };
    model.validate().map_err(TrainError::Diverged)?;
    tracing::info!(
        "Trained logistic regression on {} rows over {} epochs (log loss {:.4})",
        dataset.len(),
        options.epochs,
        mean_log_loss(&model, dataset)
    );
    Ok(model)
}

fn mean_log_loss(model: &LogRegModel, dataset: &Dataset) -> f32 {
    if dataset.is_empty() {
        return 0.0;
    }
    let total: f32 = dataset
        .iter()
        .map(|(x, label)| {
            let p = sigmoid(linear(&model.weights, model.bias, x)).clamp(1e-7, 1.0 - 1e-7);
            if label { -p.ln() } else { -(1.0 - p).ln() }
        })
        .sum();
    total / dataset.len() as f32
}
