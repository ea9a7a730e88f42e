//! English text identification from byte histograms.
//!
//! Samples of English and random text are kept in SQLite, turned into
//! normalized byte-frequency vectors, and used to train a logistic regression
//! that estimates how likely a piece of text is English.

/// Application directory resolution.
pub mod app_dirs;
/// Checksummed binary file framing.
pub mod blob;
/// Command line parsing and stage ordering.
pub mod cli;
/// TOML configuration.
pub mod config;
/// Feature datasets built from stored samples.
pub mod dataset;
/// Accuracy reports and the interactive prompt.
pub mod eval;
/// Byte-histogram feature extraction.
pub mod features;
pub mod fs_util;
/// English and random sample generation.
pub mod generator;
/// Tracing setup.
pub mod logging;
/// Classifier and metrics.
pub mod ml;
/// Stage orchestration over one store handle.
pub mod pipeline;
/// SQLite sample storage.
pub mod store;
