//! Machine learning helpers for training and inference.
//!
//! A binary logistic regression head over byte-histogram features, plus the
//! classification metrics used to report on it.

pub mod logreg;
pub mod metrics;
