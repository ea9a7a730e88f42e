//! Evaluation metrics for the binary English classifier.

/// Two-class confusion matrix, English being the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    /// English predicted as English.
    pub true_positive: u32,
    /// Non-English predicted as English.
    pub false_positive: u32,
    /// Non-English predicted as non-English.
    pub true_negative: u32,
    /// English predicted as non-English.
    pub false_negative: u32,
}

impl ConfusionMatrix {
    pub fn add(&mut self, truth: bool, predicted: bool) {
        let slot = match (truth, predicted) {
            (true, true) => &mut self.true_positive,
            (false, true) => &mut self.false_positive,
            (false, false) => &mut self.true_negative,
            (true, false) => &mut self.false_negative,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn total(&self) -> u32 {
        self.correct() + self.false_positive + self.false_negative
    }

    pub fn correct(&self) -> u32 {
        self.true_positive + self.true_negative
    }
}

/// Precision/recall statistics for one label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerClassStats {
    /// `TP / (TP + FP)`.
    pub precision: f32,
    /// `TP / (TP + FN)`.
    pub recall: f32,
    /// Number of true examples with this label.
    pub support: u32,
}

impl PerClassStats {
    fn from_counts(tp: u32, fp: u32, fn_: u32) -> Self {
        Self {
            precision: ratio(tp, tp + fp),
            recall: ratio(tp, tp + fn_),
            support: tp + fn_,
        }
    }

    pub fn f1(&self) -> f32 {
        f1_score(self.precision, self.recall)
    }
}

/// Stats for `[non-English, English]`.
pub fn precision_recall_by_class(cm: &ConfusionMatrix) -> [PerClassStats; 2] {
    [
        PerClassStats::from_counts(cm.true_negative, cm.false_negative, cm.false_positive),
        PerClassStats::from_counts(cm.true_positive, cm.false_positive, cm.false_negative),
    ]
}

/// Fraction of correct predictions; zero for an empty matrix.
pub fn accuracy(cm: &ConfusionMatrix) -> f32 {
    ratio(cm.correct(), cm.total())
}

/// Harmonic mean of precision and recall.
pub fn f1_score(precision: f32, recall: f32) -> f32 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

fn ratio(numerator: u32, denominator: u32) -> f32 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f32 / denominator as f32
    }
}
