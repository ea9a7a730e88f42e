//! Pipeline configuration persisted as TOML in the app directory.
//!
//! Every section is optional; missing keys fall back to defaults so older
//! config files keep loading as settings are added.

mod defaults;
mod errors;
mod io;
mod types;

#[cfg(test)]
mod tests;

pub use errors::ConfigError;
pub use io::{CONFIG_FILE_NAME, config_path, load_from, load_or_default, save, save_to_path};
pub use types::{EvaluationSettings, PipelineConfig, ResolvedPaths, StorageSettings};
