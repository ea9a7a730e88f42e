use std::path::{Path, PathBuf};

use crate::app_dirs;
use crate::fs_util::atomic_write;

use super::errors::ConfigError;
use super::types::PipelineConfig;

/// Default filename used to store the pipeline configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolve the default configuration file path, ensuring the app directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(app_dirs::app_root_dir()?.join(CONFIG_FILE_NAME))
}

/// Load configuration, returning defaults when the default file is missing.
///
/// An explicit `path` must exist.
pub fn load_or_default(path: Option<&Path>) -> Result<PipelineConfig, ConfigError> {
    if let Some(path) = path {
        return load_from(path);
    }
    let path = config_path()?;
    if !path.exists() {
        tracing::debug!("No config at {}; using defaults", path.display());
        return Ok(PipelineConfig::default());
    }
    load_from(&path)
}

/// Parse the TOML file at `path`.
pub fn load_from(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: PipelineConfig = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config.normalized())
}

/// Persist configuration to the default path.
pub fn save(config: &PipelineConfig) -> Result<(), ConfigError> {
    save_to_path(config, &config_path()?)
}

/// Write the TOML file atomically to prevent partial writes on crash.
pub fn save_to_path(config: &PipelineConfig, path: &Path) -> Result<(), ConfigError> {
    let data = toml::to_string_pretty(config).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    atomic_write(path, data.as_bytes()).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
