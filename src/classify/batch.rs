use std::collections::HashSet;
use std::time::Duration;

use super::client::LabelClassifier;
use super::types::{AttributeRecord, ClassificationMap};

/// Fixed pause between consecutive batch requests, to stay under the
/// service's rate limits. Not adaptive.
const INTER_BATCH_DELAY: Duration = Duration::from_millis(200);

/// Distinct labels in first-occurrence order.
///
/// Rows sharing a label classify identically, so each label is sent to the
/// service once and the result is broadcast back over all matching rows at
/// merge time.
pub fn unique_labels(records: &[AttributeRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.label.as_str()))
        .map(|r| r.label.clone())
        .collect()
}

/// Partition `labels` into consecutive batches of `batch_size` and classify
/// each in order, unioning the partial results.
///
/// The final batch may be shorter. Later batches overwrite earlier entries
/// for the same label. A batch that fails contributes no entries; its labels
/// fall back at merge time. Batch order is the list order, kept deterministic
/// for reproducible logs.
pub fn classify_in_batches(
    classifier: &dyn LabelClassifier,
    labels: &[String],
    batch_size: usize,
) -> ClassificationMap {
    assert!(batch_size >= 1, "batch_size must be at least 1");

    let total_batches = labels.len().div_ceil(batch_size);
    tracing::info!(
        labels = labels.len(),
        batch_size,
        total_batches,
        "starting classification"
    );

    let mut results = ClassificationMap::new();
    for (index, chunk) in labels.chunks(batch_size).enumerate() {
        tracing::info!(
            batch = index + 1,
            total = total_batches,
            size = chunk.len(),
            "classifying batch"
        );

        let batch_results = classifier.classify(chunk);
        if batch_results.is_empty() && !chunk.is_empty() {
            tracing::warn!(batch = index + 1, "batch returned no classifications");
        }
        results.extend(batch_results);

        if index + 1 < total_batches {
            std::thread::sleep(INTER_BATCH_DELAY);
        }
    }

    tracing::info!(classified = results.len(), "classification finished");
    results
}
