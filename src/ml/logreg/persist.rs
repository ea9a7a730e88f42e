use std::path::{Path, PathBuf};

use thiserror::Error;

use super::LogRegModel;
use crate::blob::{BlobError, BlobReader, BlobWriter};
use crate::fs_util::atomic_write;

/// Default filename of the persisted model inside the data directory.
pub const DEFAULT_MODEL_FILE_NAME: &str = "model.bin";

const MODEL_MAGIC: &[u8; 8] = b"ENGLIDLR";
const MODEL_FORMAT_VERSION: u32 = 1;

/// Errors returned while saving or loading a model file.
#[derive(Debug, Error)]
pub enum ModelFileError {
    #[error("Model file not found: {0}")]
    NotFound(PathBuf),
    #[error("Model file {path} is corrupt: {source}")]
    Corrupt { path: PathBuf, source: BlobError },
    #[error("Refusing to save invalid model: {0}")]
    Invalid(String),
    #[error("Model io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Persist `model` to `path`, replacing any previous file atomically.
pub fn save_model(model: &LogRegModel, path: &Path) -> Result<(), ModelFileError> {
    model.validate().map_err(ModelFileError::Invalid)?;
    let mut writer = BlobWriter::new(
        MODEL_MAGIC,
        MODEL_FORMAT_VERSION,
        8 + model.weights.len() * 4,
    );
    writer.u32(model.feature_len as u32);
    writer.f32s(&[model.bias]);
    writer.f32s(&model.weights);
    atomic_write(path, &writer.finish()).map_err(|source| ModelFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Saved model to {}", path.display());
    Ok(())
}

/// Load a model written by [`save_model`].
pub fn load_model(path: &Path) -> Result<LogRegModel, ModelFileError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ModelFileError::NotFound(path.to_path_buf())
        } else {
            ModelFileError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let model = decode(&bytes).map_err(|source| ModelFileError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Loaded model from {}", path.display());
    Ok(model)
}

fn decode(bytes: &[u8]) -> Result<LogRegModel, BlobError> {
    let mut reader = BlobReader::open(bytes, MODEL_MAGIC, MODEL_FORMAT_VERSION)?;
    let feature_len = reader.u32()? as usize;
    let bias = reader.f32()?;
    if feature_len.checked_mul(4) != Some(reader.remaining()) {
        return Err(BlobError::Invalid(format!(
            "{feature_len} weights do not match {} payload bytes",
            reader.remaining()
        )));
    }
    let weights = reader.f32s(feature_len)?;
    reader.finish()?;
    let model = LogRegModel {
        feature_len,
        weights,
        bias,
    };
    model.validate().map_err(BlobError::Invalid)?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn model() -> LogRegModel {
        LogRegModel {
            feature_len: 4,
            weights: vec![0.5, -1.25, 1.0 / 3.0, 0.0],
            bias: -0.1,
        }
    }

    #[test]
    fn round_trip_preserves_coefficients() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_MODEL_FILE_NAME);
        save_model(&model(), &path).unwrap();
        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded, model());
        assert_eq!(loaded.bias.to_bits(), model().bias.to_bits());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = load_model(&dir.path().join("nope.bin")).unwrap_err();
        assert!(matches!(err, ModelFileError::NotFound(_)));
    }

    #[test]
    fn truncated_and_flipped_files_are_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_MODEL_FILE_NAME);
        save_model(&model(), &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();

        std::fs::write(&path, &bytes[..bytes.len() - 5]).unwrap();
        assert!(matches!(
            load_model(&path),
            Err(ModelFileError::Corrupt { .. })
        ));

        let mut flipped = bytes.clone();
        flipped[16] ^= 0x80;
        std::fs::write(&path, &flipped).unwrap();
        assert!(matches!(
            load_model(&path),
            Err(ModelFileError::Corrupt {
                source: BlobError::ChecksumMismatch,
                ..
            })
        ));
    }

    #[test]
    fn invalid_model_is_not_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_MODEL_FILE_NAME);
        let mut bad = model();
        bad.weights.push(1.0);
        assert!(matches!(
            save_model(&bad, &path),
            Err(ModelFileError::Invalid(_))
        ));
        assert!(!path.exists());
    }
}
