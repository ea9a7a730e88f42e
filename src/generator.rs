//! Sample generation: English chunks from text files and random non-English strings.

use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{SampleStore, SampleStoreError};

/// Default number of characters per generated sample.
pub const DEFAULT_CHUNK_LENGTH: usize = 250;
/// Default characters drawn for random samples.
pub const DEFAULT_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz.,;()!?:";
/// Name stored for every random sample.
pub const RANDOM_SAMPLE_NAME: &str = "_";

/// Settings for splitting source texts and drawing random samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Characters per sample, for both English chunks and random strings.
    #[serde(default = "default_chunk_length")]
    pub chunk_length: usize,
    /// Characters random samples are drawn from.
    #[serde(default = "default_alphabet")]
    pub alphabet: String,
    /// Source texts used when none are given on the command line.
    #[serde(default = "default_source_files")]
    pub source_files: Vec<PathBuf>,
    /// Fixed seed for random samples; `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            chunk_length: default_chunk_length(),
            alphabet: default_alphabet(),
            source_files: default_source_files(),
            seed: None,
        }
    }
}

/// Errors returned while generating samples.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Failed to read source text {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Random sample alphabet is empty")]
    EmptyAlphabet,
    #[error(transparent)]
    Store(#[from] SampleStoreError),
}

/// Counts of samples written by [`generate_samples`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    pub english: usize,
    pub random: usize,
}

impl GenerationSummary {
    pub fn total(&self) -> usize {
        self.english + self.random
    }
}

/// Split `text` into consecutive chunks of `chunk_length` characters.
///
/// The final chunk holds the remainder and may be shorter; no chunk is empty.
pub fn chunk_text(text: &str, chunk_length: usize) -> Vec<&str> {
    let chunk_length = chunk_length.max(1);
    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut count = 0usize;
    for (idx, _) in text.char_indices() {
        if count == chunk_length {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

/// Draw a string of `length` characters uniformly from `alphabet`.
pub fn random_text<R: Rng + ?Sized>(rng: &mut R, alphabet: &[char], length: usize) -> String {
    (0..length)
        .filter_map(|_| alphabet.choose(&mut *rng).copied())
        .collect()
}

/// Store one English sample per chunk of every file, returning the number added.
///
/// Each file is written in its own transaction, named `<file name>_<chunk index>`.
pub fn add_english_text_samples(
    store: &SampleStore,
    files: &[PathBuf],
    config: &GeneratorConfig,
) -> Result<usize, GeneratorError> {
    let mut count = 0usize;
    for path in files {
        let text = std::fs::read_to_string(path).map_err(|source| GeneratorError::Read {
            path: path.clone(),
            source,
        })?;
        let label = sample_label(path);
        let mut batch = store.write_batch()?;
        for (idx, chunk) in chunk_text(&text, config.chunk_length).into_iter().enumerate() {
            batch.add(&format!("{label}_{idx}"), true, chunk)?;
        }
        let added = batch.commit()?;
        tracing::info!("Added {added} English samples from {}", path.display());
        count += added;
    }
    Ok(count)
}

/// Store `count` random non-English samples in one transaction.
pub fn add_random_text_samples<R: Rng + ?Sized>(
    store: &SampleStore,
    count: usize,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<usize, GeneratorError> {
    let alphabet: Vec<char> = config.alphabet.chars().collect();
    if alphabet.is_empty() {
        return Err(GeneratorError::EmptyAlphabet);
    }
    let mut batch = store.write_batch()?;
    for _ in 0..count {
        let text = random_text(rng, &alphabet, config.chunk_length.max(1));
        batch.add(RANDOM_SAMPLE_NAME, false, &text)?;
    }
    let added = batch.commit()?;
    tracing::info!("Added {added} random samples");
    Ok(added)
}

/// Add English chunks from `files`, then the same number of random samples.
pub fn generate_samples<R: Rng + ?Sized>(
    store: &SampleStore,
    files: &[PathBuf],
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<GenerationSummary, GeneratorError> {
    let english = add_english_text_samples(store, files, config)?;
    let random = add_random_text_samples(store, english, config, rng)?;
    Ok(GenerationSummary { english, random })
}

fn sample_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn default_chunk_length() -> usize {
    DEFAULT_CHUNK_LENGTH
}

fn default_alphabet() -> String {
    DEFAULT_ALPHABET.to_string()
}

fn default_source_files() -> Vec<PathBuf> {
    vec![PathBuf::from("pride_and_prejudice.txt")]
}
