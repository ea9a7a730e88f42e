use rusqlite::Connection;

use super::SampleStoreError;

/// Create the sample table when it does not exist yet.
pub(super) fn apply_schema(connection: &Connection) -> Result<(), SampleStoreError> {
    connection
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS all_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT,
                english INT,
                content TEXT
            );",
        )
        .map_err(SampleStoreError::Schema)
}
