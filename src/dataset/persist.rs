use std::path::Path;

use crate::blob::{BlobError, BlobReader, BlobWriter};
use crate::fs_util::atomic_write;

use super::{Dataset, DatasetError};

/// Default filename of the persisted dataset inside the data directory.
pub const DEFAULT_DATASET_FILE_NAME: &str = "dataset.bin";

const DATASET_MAGIC: &[u8; 8] = b"ENGLIDDS";
const DATASET_FORMAT_VERSION: u32 = 1;

/// Write `dataset` to `path`, replacing any previous file atomically.
pub fn save_dataset(dataset: &Dataset, path: &Path) -> Result<(), DatasetError> {
    let bytes = encode(dataset)?;
    atomic_write(path, &bytes).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Saved dataset with {} rows to {}", dataset.len(), path.display());
    Ok(())
}

/// Load a dataset written by [`save_dataset`].
pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            DatasetError::NotFound(path.to_path_buf())
        } else {
            DatasetError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    decode(&bytes).map_err(|source| DatasetError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

fn encode(dataset: &Dataset) -> Result<Vec<u8>, DatasetError> {
    let row_bytes = 1 + dataset.feature_len * 4;
    let mut writer = BlobWriter::new(
        DATASET_MAGIC,
        DATASET_FORMAT_VERSION,
        12 + dataset.len() * row_bytes,
    );
    writer.u32(dataset.feature_len as u32);
    writer.u64(dataset.len() as u64);
    for (row, label) in dataset.iter() {
        if row.len() != dataset.feature_len {
            return Err(DatasetError::FeatureLength {
                expected: dataset.feature_len,
                actual: row.len(),
            });
        }
        writer.u8(u8::from(label));
        writer.f32s(row);
    }
    Ok(writer.finish())
}

fn decode(bytes: &[u8]) -> Result<Dataset, BlobError> {
    let mut reader = BlobReader::open(bytes, DATASET_MAGIC, DATASET_FORMAT_VERSION)?;
    let feature_len = reader.u32()? as usize;
    let count = reader.u64()? as usize;
    let row_bytes = 1 + feature_len * 4;
    if count.checked_mul(row_bytes) != Some(reader.remaining()) {
        return Err(BlobError::Invalid(format!(
            "{count} rows of {feature_len} features do not match {} payload bytes",
            reader.remaining()
        )));
    }
    let mut dataset = Dataset::new(feature_len);
    for _ in 0..count {
        let label = match reader.u8()? {
            0 => false,
            1 => true,
            other => return Err(BlobError::Invalid(format!("invalid label byte {other}"))),
        };
        dataset.x.push(reader.f32s(feature_len)?);
        dataset.y.push(label);
    }
    reader.finish()?;
    Ok(dataset)
}
