use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One input row: an attribute-group label and how many source rows carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub label: String,
    pub count: u64,
}

impl AttributeRecord {
    pub fn new(label: &str, count: u64) -> Self {
        Self {
            label: label.to_string(),
            count,
        }
    }
}

/// Whether a run requests confidence scores alongside categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMode {
    /// Category plus a confidence score per label.
    WithConfidence,
    /// Category only.
    CategoryOnly,
}

impl ScoringMode {
    pub fn with_confidence(self) -> bool {
        matches!(self, ScoringMode::WithConfidence)
    }
}

/// Category assignment for a single label as reported by the service.
///
/// `confidence` is `None` when the reply carried no score (category-only
/// mode, or a confidence-less entry in an otherwise scored reply).
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: String,
    pub confidence: Option<f32>,
}

impl Classification {
    pub fn new(category: &str, confidence: Option<f32>) -> Self {
        Self {
            category: category.to_string(),
            confidence,
        }
    }
}

/// Union of per-batch results, keyed by label.
///
/// Batches are merged with overwrite semantics: if the same label somehow
/// appears in two batches, the later batch wins. Identical labels classify
/// identically, so nothing is lost.
pub type ClassificationMap = HashMap<String, Classification>;

/// An input record joined with its resolved category.
///
/// Created once, after all batches resolve; never mutated. `confidence` is
/// `None` in category-only mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub label: String,
    pub count: u64,
    pub category: String,
    pub confidence: Option<f32>,
}
