use super::types::ScoringMode;
use crate::taxonomy::CategoryTaxonomy;

/// Worked examples embedded in every prompt: label, category, confidence.
const WORKED_EXAMPLES: &[(&str, &str, f32)] = &[
    ("入社区分", "雇用管理", 0.9),
    ("データU編集部", "組織構造", 0.8),
    ("マーケティングチーム", "組織構造", 0.9),
    ("職位", "人事管理", 0.9),
    ("所属", "人事管理", 0.7),
    ("勤務地", "組織構造", 0.8),
    ("会社名", "その他・未分類", 0.3),
    ("国籍", "個人属性", 0.8),
];

/// The five named confidence bands the service is asked to score against.
const CONFIDENCE_SCALE: &str = "\
- 0.9-1.0: 非常に確信（明確で曖昧さのない分類）
- 0.7-0.8: 確信（おそらく正しいが若干の曖昧さあり）
- 0.5-0.6: 中程度の確信（妥当な分類だが不確実）
- 0.3-0.4: 低い確信（分類が困難、複数の可能性）
- 0.0-0.2: 非常に低い確信（不明確または曖昧）";

/// Render the classification request for one batch of labels.
///
/// The prompt enumerates the taxonomy's main categories with their
/// subcategory hints, pins the reply to exactly one main category per label,
/// shows worked examples, defines the confidence scale (confidence mode
/// only), and fixes the reply to a bare JSON mapping with no surrounding
/// prose. Pure formatting; the orchestrator guarantees `labels` is non-empty.
pub fn build_classification_prompt(
    labels: &[String],
    taxonomy: &CategoryTaxonomy,
    mode: ScoringMode,
) -> String {
    let names = taxonomy.names();
    let main_categories = names.join("、");
    let n = names.len();

    let mut categories_text = String::new();
    for category in taxonomy.categories() {
        categories_text.push_str(&format!("\n{}:\n", category.name));
        for hint in &category.hints {
            categories_text.push_str(&format!("  - {hint}\n"));
        }
    }

    let mut keyword_lines = String::new();
    for category in taxonomy.categories() {
        if !category.keywords.is_empty() {
            keyword_lines.push_str(&format!(
                "   - {} → {}\n",
                category.keywords.join("、"),
                category.name
            ));
        }
    }
    keyword_lines.push_str(&format!(
        "   - 上記に当てはまらない場合 → {}",
        taxonomy.fallback()
    ));

    let mut examples = String::new();
    for (label, category, confidence) in WORKED_EXAMPLES {
        match mode {
            ScoringMode::WithConfidence => examples.push_str(&format!(
                "- {label} → {category} (信頼度: {confidence:.1})\n"
            )),
            ScoringMode::CategoryOnly => {
                examples.push_str(&format!("- {label} → {category}\n"))
            }
        }
    }

    let sample_category = &taxonomy.categories()[0].name;
    let output_format = match mode {
        ScoringMode::WithConfidence => format!(
            "以下のJSON形式で返してください。categoryには必ず上記{n}つのメインカテゴリのいずれか1つを使用してください：\n\n\
             {{\n  \"属性名\": {{\n    \"category\": \"{sample_category}\",\n    \"confidence\": 0.85\n  }},\n  ...\n}}"
        ),
        ScoringMode::CategoryOnly => format!(
            "以下のJSON形式で返してください。値には必ず上記{n}つのメインカテゴリのいずれか1つを使用してください：\n\n\
             {{\n  \"属性名\": \"{sample_category}\",\n  ...\n}}"
        ),
    };

    let labels_json =
        serde_json::to_string_pretty(labels).expect("a list of strings serializes");

    let mut prompt = format!(
        "あなたは日本の属性グループ名を事前定義されたカテゴリに分類するタスクを担当しています。\n\n\
         ## 重要: 必ず以下の{n}つのメインカテゴリのいずれか1つのみを返してください：\n\
         {main_categories}\n\n\
         分類カテゴリの詳細:\n{categories_text}\n\
         ## 分類ルール:\n\
         1. **必須**: 各属性グループ名を上記の{n}つのメインカテゴリのいずれか1つに分類してください\n\
         2. **禁止**: サブカテゴリや説明文の一部を返さないでください\n\
         3. 日本語の意味と文脈を考慮してください\n\
         4. 以下のキーワードマッピングを参考にしてください：\n{keyword_lines}\n\n\
         ## 分類例（正しい形式）:\n{examples}"
    );

    if mode.with_confidence() {
        prompt.push_str(&format!("\n## 信頼度スコア基準:\n{CONFIDENCE_SCALE}\n"));
    }

    prompt.push_str(&format!(
        "\n## 出力形式:\n{output_format}\n\n分類対象の属性名:\n{labels_json}\n\n\
         重要: JSON分類結果のみを返し、追加のテキストや説明は含めないでください。\
         必ず{n}つのメインカテゴリのいずれか1つを使用してください。"
    ));

    prompt
}
