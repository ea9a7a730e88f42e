use rusqlite::params;

use super::{Sample, SampleStore, SampleStoreError, SampleWriteBatch};

impl SampleStore {
    /// Append a single sample in its own transaction.
    pub fn add_sample(
        &self,
        name: &str,
        is_english: bool,
        content: &str,
    ) -> Result<(), SampleStoreError> {
        let mut batch = self.write_batch()?;
        batch.add(name, is_english, content)?;
        batch.commit().map(|_| ())
    }

    /// Append every sample in one transaction.
    ///
    /// The first failing insert aborts the call and rolls back the whole batch,
    /// so either all samples become visible or none do.
    pub fn add_samples(&self, samples: &[Sample]) -> Result<usize, SampleStoreError> {
        if samples.is_empty() {
            return Ok(0);
        }
        let mut batch = self.write_batch()?;
        for sample in samples {
            batch.add(&sample.name, sample.is_english, &sample.content)?;
        }
        batch.commit()
    }

    /// Delete every stored sample, returning how many rows were removed.
    pub fn clear_all_samples(&self) -> Result<usize, SampleStoreError> {
        let batch = self.write_batch()?;
        let removed = batch
            .tx
            .execute("DELETE FROM all_data", [])
            .map_err(SampleStoreError::Write)?;
        batch.commit()?;
        tracing::info!("Cleared {removed} samples");
        Ok(removed)
    }

    /// Start a write batch that wraps related inserts in a single transaction.
    pub fn write_batch(&self) -> Result<SampleWriteBatch<'_>, SampleStoreError> {
        let tx = self
            .connection
            .unchecked_transaction()
            .map_err(SampleStoreError::Write)?;
        Ok(SampleWriteBatch { tx, added: 0 })
    }
}

impl<'conn> SampleWriteBatch<'conn> {
    /// Queue one sample insert within the batch.
    pub fn add(
        &mut self,
        name: &str,
        is_english: bool,
        content: &str,
    ) -> Result<(), SampleStoreError> {
        self.tx
            .prepare_cached("INSERT INTO all_data (name, english, content) VALUES (?1, ?2, ?3)")
            .map_err(SampleStoreError::Write)?
            .execute(params![name, i64::from(is_english), content])
            .map_err(SampleStoreError::Write)?;
        self.added += 1;
        Ok(())
    }

    /// Number of inserts queued so far.
    pub fn len(&self) -> usize {
        self.added
    }

    pub fn is_empty(&self) -> bool {
        self.added == 0
    }

    /// Commit all batched inserts atomically, returning how many were written.
    pub fn commit(self) -> Result<usize, SampleStoreError> {
        self.tx.commit().map_err(SampleStoreError::Write)?;
        Ok(self.added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_are_accepted() {
        let store = SampleStore::open_in_memory().unwrap();
        let added = store
            .add_samples(&[
                Sample::new("_", false, "q;Zr"),
                Sample::new("_", false, "(Lp!"),
            ])
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(store.count_samples().unwrap(), 2);
    }

    #[test]
    fn clear_then_read_returns_empty() {
        let store = SampleStore::open_in_memory().unwrap();
        store.add_sample("a_0", true, "hello there").unwrap();
        store.add_sample("_", false, "x!Q").unwrap();
        assert_eq!(store.clear_all_samples().unwrap(), 2);
        assert!(store.all_samples().unwrap().is_empty());
        assert_eq!(store.clear_all_samples().unwrap(), 0);
    }

    #[test]
    fn dropped_batch_is_never_visible() {
        let store = SampleStore::open_in_memory().unwrap();
        {
            let mut batch = store.write_batch().unwrap();
            batch.add("a_0", true, "uncommitted").unwrap();
            assert_eq!(batch.len(), 1);
        }
        assert_eq!(store.count_samples().unwrap(), 0);
    }

    #[test]
    fn failed_writes_surface_as_write_errors() {
        let store = SampleStore::open_in_memory().unwrap();
        store.add_sample("kept", true, "before lock").unwrap();
        store
            .connection
            .execute_batch("PRAGMA query_only = ON;")
            .unwrap();
        let err = store
            .add_samples(&[Sample::new("a", true, "one"), Sample::new("b", true, "two")])
            .unwrap_err();
        assert!(matches!(err, SampleStoreError::Write(_)));
        assert!(matches!(
            store.clear_all_samples().unwrap_err(),
            SampleStoreError::Write(_)
        ));
        assert_eq!(store.count_samples().unwrap(), 1);
    }
}
