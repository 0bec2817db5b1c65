use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Local};

use super::confidence::ConfidenceReport;
use crate::classify::ClassifiedRecord;

/// How many of the lowest-confidence records the report lists individually.
const TOP_REVIEW_ROWS: usize = 10;

/// Per-category record counts, descending by count (ties by category name).
pub fn category_counts(records: &[ClassifiedRecord]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.category.as_str()).or_default() += 1;
    }
    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(category, count)| (category.to_string(), count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// Render the classification run as a self-contained Japanese Markdown
/// report: header, category table, confidence statistics and bands, the ten
/// lowest-confidence records, and the fixed review-priority guidance.
///
/// Pure formatting over typed inputs. `review` holds record indices sorted
/// ascending by confidence, as produced by `low_confidence_indices`.
pub fn render_report(
    records: &[ClassifiedRecord],
    analysis: &ConfidenceReport,
    review: &[usize],
    threshold: f32,
    output_name: &str,
    elapsed: Duration,
    generated_at: DateTime<Local>,
) -> String {
    let mut report = format!(
        "# 属性グループ分類結果レポート\n\n\
         **生成日時**: {}  \n\
         **処理対象ファイル**: {}  \n\
         **処理時間**: {:.1}秒  \n\n\
         ## 分類結果サマリー\n\n\
         ### 分類別件数\n\n\
         | 分類カテゴリ | 件数 | 割合 |\n\
         |-------------|------|------|",
        generated_at.format("%Y年%m月%d日 %H:%M:%S"),
        output_name,
        elapsed.as_secs_f64(),
    );

    let total = records.len().max(1);
    for (category, count) in category_counts(records) {
        let percentage = count as f64 / total as f64 * 100.0;
        report.push_str(&format!(
            "\n| {category} | {}件 | {percentage:.1}% |",
            thousands(count)
        ));
    }

    report.push_str(&format!(
        "\n\n## 信頼度分析\n\n\
         ### 信頼度統計\n\n\
         | 項目 | 値 |\n\
         |------|-----|\n\
         | 平均信頼度 | {:.3} |\n\
         | 中央値 | {:.3} |\n\
         | 最小値 | {:.3} |\n\
         | 最大値 | {:.3} |\n\n\
         ### 信頼度区間別統計\n\n\
         | 信頼度区間 | 件数 | 割合 |\n\
         |-----------|------|------|",
        analysis.stats.mean, analysis.stats.median, analysis.stats.min, analysis.stats.max,
    ));

    for bin in &analysis.bins {
        report.push_str(&format!(
            "\n| {} | {}件 | {:.1}% |",
            bin.label,
            thousands(bin.count),
            bin.percentage
        ));
    }

    report.push_str(&format!(
        "\n\n## 低信頼度項目\n\n\
         **閾値**: {threshold}未満  \n\n\
         ### 信頼度が最も低い項目（上位{TOP_REVIEW_ROWS}件）\n\n\
         | 順位 | 属性グループ名 | 分類 | 信頼度 |\n\
         |------|---------------|------|--------|"
    ));

    for (rank, &index) in review.iter().take(TOP_REVIEW_ROWS).enumerate() {
        let record = &records[index];
        report.push_str(&format!(
            "\n| {} | {} | {} | {:.3} |",
            rank + 1,
            record.label,
            record.category,
            record.confidence.unwrap_or(0.0)
        ));
    }

    report.push_str(
        "\n\n## 詳細データ\n\n\
         ### 分類別詳細一覧\n\n\
         各分類カテゴリの詳細な属性グループ一覧は、出力されたCSVファイルをご確認ください。\n\n\
         ### データ形式\n\n\
         | 列名 | 説明 |\n\
         |------|------|\n\
         | 属性グループ名 | 分類対象の属性名 |\n\
         | 数 | 該当するデータ件数 |\n\
         | 分類 | 自動分類されたカテゴリ |\n\
         | 信頼度 | 分類の信頼度スコア（0.0-1.0） |\n\n\
         ## 検証推奨項目\n\n\
         以下の項目は信頼度が低いため、手動での検証をお勧めします：\n\n\
         1. **信頼度0.3未満**: 分類が困難な項目\n\
         2. **信頼度0.3-0.5**: 複数の分類可能性がある項目\n\
         3. **信頼度0.5-0.7**: 基本的な分類は可能だが、詳細な検証が必要な項目\n",
    );

    report
}

fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
