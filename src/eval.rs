//! Accuracy reporting over a labeled dataset and an interactive prediction prompt.

use std::io::{BufRead, Write};

use thiserror::Error;

use crate::dataset::Dataset;
use crate::features::FeatureConfig;
use crate::ml::logreg::{LogRegModel, PredictError, predict_probability};
use crate::ml::metrics::{self, ConfusionMatrix, PerClassStats};

const PROMPT: &str = "Predict: ";

/// Errors raised by the interactive prompt.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Interactive io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Prediction failed: {0}")]
    Predict(#[from] PredictError),
}

/// Outcome of scoring a model against a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalReport {
    pub correct: usize,
    pub total: usize,
    /// `correct / total`, zero for an empty dataset.
    pub accuracy: f32,
    pub confusion: ConfusionMatrix,
}

impl EvalReport {
    pub fn percent(&self) -> f32 {
        self.accuracy * 100.0
    }

    /// Stats for `[non-English, English]`.
    pub fn per_class(&self) -> [PerClassStats; 2] {
        metrics::precision_recall_by_class(&self.confusion)
    }
}

/// Compare the model's hard label with every dataset label.
pub fn evaluate(model: &LogRegModel, dataset: &Dataset) -> Result<EvalReport, PredictError> {
    let mut confusion = ConfusionMatrix::default();
    for (row, label) in dataset.iter() {
        confusion.add(label, model.predict(row)?);
    }
    let report = EvalReport {
        correct: confusion.correct() as usize,
        total: confusion.total() as usize,
        accuracy: metrics::accuracy(&confusion),
        confusion,
    };
    let [non_english, english] = report.per_class();
    tracing::info!(
        "Accuracy {:.2}% ({}/{}); English P={:.3} R={:.3}; non-English P={:.3} R={:.3}",
        report.percent(),
        report.correct,
        report.total,
        english.precision,
        english.recall,
        non_english.precision,
        non_english.recall
    );
    Ok(report)
}

/// Prompt for lines of text and print the English probability of each.
///
/// Stops on an empty line or end of input and returns the number of predictions made.
pub fn interactive_loop<R, W>(
    model: &LogRegModel,
    features: &FeatureConfig,
    mut input: R,
    mut output: W,
) -> Result<usize, EvalError>
where
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    let mut predictions = 0usize;
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim_end_matches(['\n', '\r']);
        if text.is_empty() {
            break;
        }
        let probability = predict_probability(model, text, features)?;
        writeln!(output, "Estimated Probability: {probability:.2}")?;
        predictions += 1;
    }
    writeln!(output)?;
    Ok(predictions)
}
