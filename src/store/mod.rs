//! SQLite-backed store of labeled text samples.
//!
//! Samples are append-only: they are added one at a time or in batches and
//! only ever removed all together by [`SampleStore::clear_all_samples`].

use std::path::{Path, PathBuf};

use rusqlite::{Connection, Transaction};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Read-only queries over stored samples.
pub mod read;
/// SQLite schema management for the sample table.
pub mod schema;
/// Append and clear operations.
pub mod write;

/// Default filename of the sample database inside the data directory.
pub const DB_FILE_NAME: &str = "english-text.db";

/// A labeled piece of text kept for training and evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Provenance tag, e.g. `book.txt_12` or `_` for synthetic samples. Not unique.
    pub name: String,
    /// True when the content is English text.
    pub is_english: bool,
    /// Raw sample text.
    pub content: String,
}

impl Sample {
    pub fn new(name: impl Into<String>, is_english: bool, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_english,
            content: content.into(),
        }
    }
}

/// Columns that can be requested from [`SampleStore::get_all_samples`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleField {
    Id,
    Name,
    English,
    Content,
}

impl SampleField {
    /// Every field, in table order.
    pub const ALL: [SampleField; 4] = [Self::Id, Self::Name, Self::English, Self::Content];

    pub(crate) fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::English => "english",
            Self::Content => "content",
        }
    }
}

/// A stored sample projected onto the requested fields; unrequested fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleRow {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub is_english: Option<bool>,
    pub content: Option<String>,
}

/// Errors returned by the sample store.
///
/// Reads that match nothing are not errors; they return an empty collection.
#[derive(Debug, Error)]
pub enum SampleStoreError {
    /// Failed to create the directory holding the database file.
    #[error("Could not create {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// The database file could not be opened.
    #[error("Failed to open sample database {path}: {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    /// Pragmas or schema could not be applied.
    #[error("Failed to prepare sample schema: {0}")]
    Schema(rusqlite::Error),
    /// An insert or delete failed; the enclosing batch was rolled back.
    #[error("Sample write failed: {0}")]
    Write(rusqlite::Error),
    /// A query failed.
    #[error("Sample query failed: {0}")]
    Read(rusqlite::Error),
    /// Closing the connection failed.
    #[error("Failed to close sample database: {0}")]
    Close(rusqlite::Error),
}

/// Handle over the sample database; closed when dropped or via [`SampleStore::close`].
pub struct SampleStore {
    connection: Connection,
    path: Option<PathBuf>,
}

/// Groups sample inserts into one transaction; dropped batches roll back.
pub struct SampleWriteBatch<'conn> {
    tx: Transaction<'conn>,
    added: usize,
}

impl SampleStore {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SampleStoreError> {
        let path = path.as_ref();
        create_parent_if_needed(path)?;
        let connection = Connection::open(path).map_err(|source| SampleStoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self {
            connection,
            path: Some(path.to_path_buf()),
        };
        store.apply_pragmas()?;
        schema::apply_schema(&store.connection)?;
        tracing::debug!("Opened sample database {}", path.display());
        Ok(store)
    }

    /// Open a private in-memory database, mostly useful for tests.
    pub fn open_in_memory() -> Result<Self, SampleStoreError> {
        let connection = Connection::open_in_memory().map_err(|source| SampleStoreError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        schema::apply_schema(&connection)?;
        Ok(Self {
            connection,
            path: None,
        })
    }

    /// Path of the backing file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close the connection, reporting any error SQLite raises while doing so.
    pub fn close(self) -> Result<(), SampleStoreError> {
        self.connection
            .close()
            .map_err(|(_, err)| SampleStoreError::Close(err))
    }

    fn apply_pragmas(&self) -> Result<(), SampleStoreError> {
        self.connection
            .execute_batch(
                "PRAGMA journal_mode=WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout=5000;
             PRAGMA temp_store=MEMORY;",
            )
            .map_err(SampleStoreError::Schema)
    }
}

fn create_parent_if_needed(path: &Path) -> Result<(), SampleStoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|source| SampleStoreError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
