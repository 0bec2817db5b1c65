use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("taxonomy has no categories")]
    Empty,

    #[error("fallback category {0:?} is not one of the main categories")]
    UnknownFallback(String),
}

/// One main category together with its illustrative subcategory hints and
/// the short trigger keywords used in prompt guidance.
#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    pub hints: Vec<String>,
    pub keywords: Vec<String>,
}

impl Category {
    pub fn new(name: &str, hints: &[&str], keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            hints: hints.iter().map(|h| h.to_string()).collect(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Ordered set of main categories every classification result must come from.
///
/// Exactly one category is the designated fallback: the bucket used when the
/// service returns nothing usable for a label. Constructed explicitly and
/// passed into the pipeline so tests can run against alternate taxonomies.
#[derive(Debug, Clone)]
pub struct CategoryTaxonomy {
    categories: Vec<Category>,
    fallback: String,
}

impl CategoryTaxonomy {
    /// Build a taxonomy; `fallback` must name one of `categories`.
    pub fn new(categories: Vec<Category>, fallback: &str) -> Result<Self, TaxonomyError> {
        if categories.is_empty() {
            return Err(TaxonomyError::Empty);
        }
        if !categories.iter().any(|c| c.name == fallback) {
            return Err(TaxonomyError::UnknownFallback(fallback.to_string()));
        }
        Ok(Self {
            categories,
            fallback: fallback.to_string(),
        })
    }

    /// The built-in taxonomy for Japanese organizational attribute groups.
    pub fn japanese_hr() -> Self {
        let categories = vec![
            Category::new(
                "組織構造",
                &[
                    "部署・事業部（経理課、マーケティング、海外事業部、本部、部、課、室、係、班、セクション、ユニットなど）",
                    "チーム・グループ（データチーム、ディレクションG、WebコンサルティングG、プロジェクトチームなど）",
                    "拠点・エリア（新宿店、梅田店、東海エリア、台湾支社、支店、営業所、工場、センター、事業所、店舗など）",
                    "地域・エリア（関東、東海、関西、海外など）",
                    "組織階層（組織1、組織2、組織階層１など）",
                ],
                &[
                    "部署", "部", "課", "室", "係", "チーム", "グループ", "拠点", "支店", "店舗", "組織",
                ],
            ),
            Category::new(
                "人事管理",
                &[
                    "職位階層（マネージャー、課長、部長、リーダー、メンバー、管理職、役職、職位、Positionなど）",
                    "人事等級（M1、グレード、クラス、等級、Grade、ジョブグレード、職級、ランクなど）",
                    "職責・役割（社員、職責、プレイングマネージャー、役割、職名、職務、職掌、職分など）",
                    "配属・所属（所属、配属、所属部署、所属部門、所属チームなど）",
                ],
                &["役職", "職位", "等級", "グレード", "クラス", "職責", "職務", "マネージャー"],
            ),
            Category::new(
                "雇用管理",
                &[
                    "雇用区分（正社員、契約社員、派遣、アルバイト、内定社員、雇用形態、雇用区分、社員区分、従業員区分など）",
                    "採用形態（新卒、中途入社、インターン採用、採用、採用区分、採用形態、採用種別、入社経路、入社経緯など）",
                    "勤務期間（入社時期、勤続年数、就業年数、入社年、入社年度、入社年次、入社区分、社歴、在籍年数、在職年数、勤務年数、入社年数、現会社での就業年数、在籍期間、年次など）",
                    "勤務形態（勤務形態、勤務区分、就業形態、内外勤、出向区分、出向先など）",
                ],
                &["入社", "採用", "雇用", "勤務", "就業", "契約", "正社員", "派遣"],
            ),
            Category::new(
                "業務機能",
                &[
                    "職種分類（技術、営業、事務、コンサルタント、コーディネート、職種、職群、職務区分、職掌・資格など）",
                    "専門領域（デジタルマーケティング、システム、コールセンター、プロジェクト、職能資格など）",
                ],
                &["職種", "職群", "専門", "技術", "営業"],
            ),
            Category::new(
                "個人属性",
                &[
                    "基本情報（年齢、性別、年代、年齢層、年齢区分、生年、男女、Gender、Age、婚姻、家族構成、世代など）",
                    "地域・エリア（東海エリア、関東、地区、地域、外国籍、国籍など）",
                    "学歴（学歴、最終学歴など）",
                ],
                &["年齢", "性別", "年代", "学歴", "地域", "国籍"],
            ),
            Category::new("その他・未分類", &["特殊カテゴリ・null値など"], &[]),
        ];

        Self::new(categories, "その他・未分類").expect("built-in taxonomy is valid")
    }

    /// Main categories in presentation order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Main category names in presentation order.
    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// Whether `name` is one of the main categories.
    pub fn contains(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.name == name)
    }

    /// The designated unclassified/other bucket.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}
