//! Binary logistic regression classifier for byte-histogram features.

use thiserror::Error;

use crate::features::{FeatureConfig, FeatureError};

mod persist;
mod train;

pub use persist::{DEFAULT_MODEL_FILE_NAME, ModelFileError, load_model, save_model};
pub use train::{TrainError, TrainOptions, train_logreg};

/// Linear decision boundary `w · x + b` with a logistic link.
///
/// The positive class is English: [`LogRegModel::predict_proba`] returns the
/// probability mass assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRegModel {
    /// Feature vector length the model was trained on.
    pub feature_len: usize,
    pub weights: Vec<f32>,
    pub bias: f32,
}

/// Errors returned when a feature vector cannot be scored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictError {
    #[error("feature vector has {actual} values, model expects {expected}")]
    FeatureLength { expected: usize, actual: usize },
    #[error(transparent)]
    Feature(#[from] FeatureError),
}

impl LogRegModel {
    /// Validate the model dimensions and coefficients.
    pub fn validate(&self) -> Result<(), String> {
        if self.feature_len == 0 {
            return Err("feature_len must be > 0".to_string());
        }
        if self.weights.len() != self.feature_len {
            return Err(format!(
                "weights length {} does not match feature_len {}",
                self.weights.len(),
                self.feature_len
            ));
        }
        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err("coefficients must be finite".to_string());
        }
        Ok(())
    }

    /// Signed distance-like score; positive means English.
    pub fn decision_function(&self, features: &[f32]) -> Result<f32, PredictError> {
        if features.len() != self.feature_len {
            return Err(PredictError::FeatureLength {
                expected: self.feature_len,
                actual: features.len(),
            });
        }
        Ok(linear(&self.weights, self.bias, features))
    }

    /// Probability in `[0, 1]` that `features` come from English text.
    pub fn predict_proba(&self, features: &[f32]) -> Result<f32, PredictError> {
        self.decision_function(features).map(sigmoid)
    }

    /// Hard label: English when the decision function is positive.
    pub fn predict(&self, features: &[f32]) -> Result<bool, PredictError> {
        self.decision_function(features).map(|score| score > 0.0)
    }
}

/// Extract features from `text` and return the English probability.
///
/// Input is case-folded only when `config.fold_case_on_predict` is set.
pub fn predict_probability(
    model: &LogRegModel,
    text: &str,
    config: &FeatureConfig,
) -> Result<f32, PredictError> {
    let features = config.features_for(text, config.fold_case_on_predict)?;
    model.predict_proba(&features)
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f32) -> f32 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

pub(crate) fn linear(weights: &[f32], bias: f32, x: &[f32]) -> f32 {
    weights
        .iter()
        .zip(x)
        .fold(bias, |sum, (w, v)| sum + w * v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::DEFAULT_HISTOGRAM_BINS;

    fn space_model() -> LogRegModel {
        let mut weights = vec![0.0; DEFAULT_HISTOGRAM_BINS];
        weights[b' ' as usize] = 8.0;
        LogRegModel {
            feature_len: DEFAULT_HISTOGRAM_BINS,
            weights,
            bias: -1.0,
        }
    }

    #[test]
    fn sigmoid_is_bounded_and_symmetric() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!((sigmoid(3.0) + sigmoid(-3.0) - 1.0).abs() < 1e-6);
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(-1000.0), 0.0);
    }

    #[test]
    fn probability_follows_decision_sign() {
        let model = space_model();
        model.validate().unwrap();
        let config = FeatureConfig::default();
        let spaced = predict_probability(&model, "a b c d", &config).unwrap();
        let dense = predict_probability(&model, "abcdefg", &config).unwrap();
        assert!(spaced > 0.5);
        assert!(dense < 0.5);
        let features = config.features_for("a b c d", false).unwrap();
        assert!(model.predict(&features).unwrap());
    }

    #[test]
    fn prediction_is_deterministic() {
        let model = space_model();
        let config = FeatureConfig::default();
        let first = predict_probability(&model, "hello world", &config).unwrap();
        let second = predict_probability(&model, "hello world", &config).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn wrong_width_and_empty_text_are_errors() {
        let model = space_model();
        assert_eq!(
            model.predict_proba(&[0.5, 0.5]),
            Err(PredictError::FeatureLength {
                expected: DEFAULT_HISTOGRAM_BINS,
                actual: 2
            })
        );
        assert_eq!(
            predict_probability(&model, "", &FeatureConfig::default()),
            Err(PredictError::Feature(FeatureError::EmptyInput))
        );
    }

    #[test]
    fn validate_rejects_bad_shapes() {
        let mut model = space_model();
        model.weights.pop();
        assert!(model.validate().is_err());
        let mut model = space_model();
        model.bias = f32::NAN;
        assert!(model.validate().is_err());
    }
}
