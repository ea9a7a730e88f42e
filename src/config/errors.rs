use std::path::PathBuf;

use thiserror::Error;

/// Errors that may occur while loading, saving or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to create the config or data directory.
    #[error("Unable to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to read a config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write a config file.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to serialize config to TOML.
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    /// No usable config directory found.
    #[error("No suitable config directory found")]
    NoConfigDir,
}

impl From<crate::app_dirs::AppDirError> for ConfigError {
    fn from(error: crate::app_dirs::AppDirError) -> Self {
        match error {
            crate::app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
            crate::app_dirs::AppDirError::CreateDir { path, source } => {
                ConfigError::CreateDir { path, source }
            }
        }
    }
}
