use super::types::{
    AttributeRecord, ClassificationMap, ClassifiedRecord, ScoringMode,
};
use crate::taxonomy::CategoryTaxonomy;

/// Join classification results back onto every input record, by label.
///
/// Pure and total: output order and length mirror the input regardless of how
/// complete the result map is. A label with no usable result (never
/// classified, lost to a failed batch, or assigned a category outside the
/// taxonomy) resolves to the fallback category with zero confidence, so it
/// lands in the review queue. In category-only mode confidence is omitted
/// rather than defaulted.
pub fn merge_classifications(
    records: &[AttributeRecord],
    results: &ClassificationMap,
    taxonomy: &CategoryTaxonomy,
    mode: ScoringMode,
) -> Vec<ClassifiedRecord> {
    records
        .iter()
        .map(|record| {
            let (category, confidence) = match results.get(&record.label) {
                Some(cls) if taxonomy.contains(&cls.category) => {
                    (cls.category.clone(), cls.confidence.unwrap_or(0.0))
                }
                Some(cls) => {
                    tracing::debug!(
                        label = %record.label,
                        category = %cls.category,
                        "category outside taxonomy; substituting fallback"
                    );
                    (taxonomy.fallback().to_string(), 0.0)
                }
                None => (taxonomy.fallback().to_string(), 0.0),
            };
            ClassifiedRecord {
                label: record.label.clone(),
                count: record.count,
                category,
                confidence: mode
                    .with_confidence()
                    .then_some(confidence.clamp(0.0, 1.0)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::types::Classification;

    fn taxonomy() -> CategoryTaxonomy {
        CategoryTaxonomy::japanese_hr()
    }

    fn records(items: &[(&str, u64)]) -> Vec<AttributeRecord> {
        items
            .iter()
            .map(|(label, count)| AttributeRecord::new(label, *count))
            .collect()
    }

    #[test]
    fn merge_preserves_row_count_and_order() {
        let records = records(&[("所属", 3), ("国籍", 1), ("所属", 7)]);
        let mut results = ClassificationMap::new();
        results.insert("所属".to_string(), Classification::new("人事管理", Some(0.7)));

        let merged = merge_classifications(
            &records,
            &results,
            &taxonomy(),
            ScoringMode::WithConfidence,
        );

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].label, "所属");
        assert_eq!(merged[1].label, "国籍");
        assert_eq!(merged[2].label, "所属");
        // Both rows sharing the label get the same result.
        assert_eq!(merged[0].category, merged[2].category);
        assert_eq!(merged[0].confidence, merged[2].confidence);
    }

    #[test]
    fn missing_label_falls_back_with_zero_confidence() {
        let records = records(&[("謎の属性", 5)]);
        let merged = merge_classifications(
            &records,
            &ClassificationMap::new(),
            &taxonomy(),
            ScoringMode::WithConfidence,
        );
        assert_eq!(merged[0].category, "その他・未分類");
        assert_eq!(merged[0].confidence, Some(0.0));
    }

    #[test]
    fn category_outside_taxonomy_is_corrected_to_fallback() {
        let records = records(&[("所属", 1)]);
        let mut results = ClassificationMap::new();
        // The service was told not to return subcategory text, but its
        // output is untrusted.
        results.insert(
            "所属".to_string(),
            Classification::new("配属・所属", Some(0.95)),
        );

        let merged = merge_classifications(
            &records,
            &results,
            &taxonomy(),
            ScoringMode::WithConfidence,
        );
        assert_eq!(merged[0].category, "その他・未分類");
        assert_eq!(merged[0].confidence, Some(0.0));
    }

    #[test]
    fn category_only_mode_omits_confidence() {
        let records = records(&[("所属", 1), ("謎", 2)]);
        let mut results = ClassificationMap::new();
        results.insert("所属".to_string(), Classification::new("人事管理", None));

        let merged =
            merge_classifications(&records, &results, &taxonomy(), ScoringMode::CategoryOnly);
        assert_eq!(merged[0].category, "人事管理");
        assert_eq!(merged[0].confidence, None);
        assert_eq!(merged[1].category, "その他・未分類");
        assert_eq!(merged[1].confidence, None);
    }

    #[test]
    fn scored_entry_without_confidence_defaults_to_zero() {
        let records = records(&[("所属", 1)]);
        let mut results = ClassificationMap::new();
        results.insert("所属".to_string(), Classification::new("人事管理", None));

        let merged = merge_classifications(
            &records,
            &results,
            &taxonomy(),
            ScoringMode::WithConfidence,
        );
        assert_eq!(merged[0].confidence, Some(0.0));
    }

    #[test]
    fn merge_is_idempotent() {
        let records = records(&[("入社区分", 2), ("国籍", 4), ("未知", 1)]);
        let mut results = ClassificationMap::new();
        results.insert("入社区分".to_string(), Classification::new("雇用管理", Some(0.9)));
        results.insert("国籍".to_string(), Classification::new("個人属性", Some(0.8)));

        let tax = taxonomy();
        let first =
            merge_classifications(&records, &results, &tax, ScoringMode::WithConfidence);
        let second =
            merge_classifications(&records, &results, &tax, ScoringMode::WithConfidence);
        assert_eq!(first, second);
    }

    #[test]
    fn spec_scenario_no_fallback_when_all_classified() {
        let records = records(&[("入社区分", 1), ("マーケティングチーム", 1), ("国籍", 1)]);
        let mut results = ClassificationMap::new();
        results.insert("入社区分".to_string(), Classification::new("雇用管理", Some(0.9)));
        results.insert(
            "マーケティングチーム".to_string(),
            Classification::new("組織構造", Some(0.9)),
        );
        results.insert("国籍".to_string(), Classification::new("個人属性", Some(0.8)));

        let merged = merge_classifications(
            &records,
            &results,
            &taxonomy(),
            ScoringMode::WithConfidence,
        );
        assert_eq!(merged.len(), 3);
        assert!(merged.iter().all(|r| r.category != "その他・未分類"));
    }
}
