use crate::features::FeatureConfig;
use crate::store::{SampleField, SampleStore};

use super::{Dataset, DatasetError};

/// Re-derive the dataset from every stored sample, in storage order.
///
/// Sample content is case-folded when `config.fold_case_on_build` is set. A
/// sample the extractor rejects (e.g. empty content) aborts the build.
pub fn build_dataset(store: &SampleStore, config: &FeatureConfig) -> Result<Dataset, DatasetError> {
    let rows = store.get_all_samples(&[SampleField::English, SampleField::Content])?;
    let mut dataset = Dataset::new(config.histogram_bins);
    for (index, row) in rows.into_iter().enumerate() {
        let content = row.content.unwrap_or_default();
        let features = config
            .features_for(&content, config.fold_case_on_build)
            .map_err(|source| {
                tracing::error!("Sample {index} rejected by feature extraction: {source}");
                DatasetError::Feature { index, source }
            })?;
        dataset.push(features, row.is_english.unwrap_or(false))?;
    }
    let counts = dataset.label_counts();
    tracing::info!(
        "Built dataset with {} rows ({} English, {} non-English)",
        dataset.len(),
        counts.english,
        counts.non_english
    );
    Ok(dataset)
}
