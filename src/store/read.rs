use super::{Sample, SampleField, SampleRow, SampleStore, SampleStoreError};

impl SampleStore {
    /// Fetch every sample projected onto `fields`, in insertion order.
    ///
    /// An empty field list selects every column.
    pub fn get_all_samples(
        &self,
        fields: &[SampleField],
    ) -> Result<Vec<SampleRow>, SampleStoreError> {
        let fields = if fields.is_empty() {
            &SampleField::ALL[..]
        } else {
            fields
        };
        let columns: Vec<&str> = fields.iter().map(|field| field.column()).collect();
        let sql = format!("SELECT {} FROM all_data ORDER BY id ASC", columns.join(", "));
        let mut stmt = self
            .connection
            .prepare(&sql)
            .map_err(SampleStoreError::Read)?;
        let rows = stmt
            .query_map([], |row| {
                let mut out = SampleRow::default();
                for (idx, field) in fields.iter().enumerate() {
                    match field {
                        SampleField::Id => out.id = Some(row.get(idx)?),
                        SampleField::Name => {
                            out.name = Some(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
                        }
                        SampleField::English => {
                            out.is_english = Some(row.get::<_, Option<i64>>(idx)?.unwrap_or(0) != 0)
                        }
                        SampleField::Content => {
                            out.content =
                                Some(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
                        }
                    }
                }
                Ok(out)
            })
            .map_err(SampleStoreError::Read)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(SampleStoreError::Read)?;
        Ok(rows)
    }

    /// Fetch every sample as a full record, in insertion order.
    pub fn all_samples(&self) -> Result<Vec<Sample>, SampleStoreError> {
        let rows = self.get_all_samples(&[
            SampleField::Name,
            SampleField::English,
            SampleField::Content,
        ])?;
        Ok(rows
            .into_iter()
            .map(|row| Sample {
                name: row.name.unwrap_or_default(),
                is_english: row.is_english.unwrap_or(false),
                content: row.content.unwrap_or_default(),
            })
            .collect())
    }

    /// Count stored samples.
    pub fn count_samples(&self) -> Result<usize, SampleStoreError> {
        let count: i64 = self
            .connection
            .query_row("SELECT COUNT(*) FROM all_data", [], |row| row.get(0))
            .map_err(SampleStoreError::Read)?;
        Ok(count as usize)
    }
}
