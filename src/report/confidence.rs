use crate::classify::ClassifiedRecord;

/// Records below this confidence are queued for manual review by default.
pub const DEFAULT_REVIEW_THRESHOLD: f32 = 0.7;

/// The five fixed confidence bands, highest first. Each band is half-open
/// except the top one, which is closed at 1.0 so the bands partition [0, 1]
/// with no gap.
const BIN_LABELS: [&str; 5] = [
    "Very High (0.9-1.0)",
    "High (0.7-0.9)",
    "Medium (0.5-0.7)",
    "Low (0.3-0.5)",
    "Very Low (0.0-0.3)",
];

fn bin_index(confidence: f32) -> usize {
    if confidence >= 0.9 {
        0
    } else if confidence >= 0.7 {
        1
    } else if confidence >= 0.5 {
        2
    } else if confidence >= 0.3 {
        3
    } else {
        4
    }
}

/// Central-tendency statistics over the confidence column.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// One confidence band with its share of the record set.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceBin {
    pub label: &'static str,
    pub count: usize,
    pub percentage: f64,
}

/// Aggregate view over all classified records' confidences.
///
/// Recomputed in full on each request; never persisted on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceReport {
    pub stats: ConfidenceStats,
    pub bins: Vec<ConfidenceBin>,
}

/// Compute the confidence report over `records`.
///
/// Returns `None` when no record carries a confidence: category-only mode,
/// or an empty record set.
pub fn analyze_confidence(records: &[ClassifiedRecord]) -> Option<ConfidenceReport> {
    let confidences: Vec<f32> = records.iter().filter_map(|r| r.confidence).collect();
    if confidences.is_empty() {
        return None;
    }

    let mut sorted = confidences.clone();
    sorted.sort_by(f32::total_cmp);

    let n = sorted.len();
    let mean = sorted.iter().map(|&c| c as f64).sum::<f64>() / n as f64;
    let median = if n % 2 == 1 {
        sorted[n / 2] as f64
    } else {
        (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0
    };

    let mut counts = [0usize; 5];
    for &confidence in &confidences {
        counts[bin_index(confidence)] += 1;
    }
    let bins = BIN_LABELS
        .iter()
        .zip(counts)
        .map(|(&label, count)| ConfidenceBin {
            label,
            count,
            percentage: count as f64 / records.len() as f64 * 100.0,
        })
        .collect();

    Some(ConfidenceReport {
        stats: ConfidenceStats {
            mean,
            median,
            min: sorted[0] as f64,
            max: sorted[n - 1] as f64,
        },
        bins,
    })
}

/// The manual-review queue: indices of all records with confidence strictly
/// below `threshold`, ascending by confidence, ties in original record
/// order. Indices let callers recover the full source rows.
pub fn low_confidence_indices(records: &[ClassifiedRecord], threshold: f32) -> Vec<usize> {
    let mut indices: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.confidence.is_some_and(|c| c < threshold))
        .map(|(i, _)| i)
        .collect();
    // Stable sort keeps original order for equal confidences.
    indices.sort_by(|&a, &b| {
        records[a]
            .confidence
            .unwrap_or(0.0)
            .total_cmp(&records[b].confidence.unwrap_or(0.0))
    });
    indices
}
