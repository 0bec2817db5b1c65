use serde_json::Value;

use super::types::{Classification, ClassificationMap};
use super::ClassifyError;

/// Strip one layer of code-fence wrapping from a service reply.
///
/// Models often wrap the requested JSON in triple backticks, optionally
/// tagged with a format name (```json). The fence is cosmetic; remove it
/// before structural parsing. Replies without fences pass through untouched.
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the rest of the fence line (e.g. a "json" tag).
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => return trimmed,
    };
    let body = body.trim_end();
    body.strip_suffix("```").map(str::trim_end).unwrap_or(body)
}

/// Parse a reply into a label → classification map.
///
/// Accepts both reply shapes: `{"label": {"category": "...", "confidence":
/// 0.9}}` and the category-only `{"label": "..."}`. Entries that carry
/// neither shape are skipped rather than failing the whole batch; reported
/// confidences are clamped into [0.0, 1.0]. A reply whose top level is not a
/// JSON object is an error; the caller turns that into an empty batch.
pub fn parse_classification_reply(reply: &str) -> Result<ClassificationMap, ClassifyError> {
    let body = strip_code_fences(reply);
    let parsed: Value = serde_json::from_str(body)
        .map_err(|e| ClassifyError::MalformedReply(e.to_string()))?;

    let Value::Object(entries) = parsed else {
        return Err(ClassifyError::MalformedReply(
            "expected a top-level JSON object".to_string(),
        ));
    };

    let mut map = ClassificationMap::new();
    for (label, value) in entries {
        match value {
            Value::String(category) => {
                map.insert(label, Classification::new(&category, None));
            }
            Value::Object(fields) => {
                let Some(category) = fields.get("category").and_then(Value::as_str) else {
                    tracing::debug!(label = %label, "reply entry has no category; skipping");
                    continue;
                };
                let confidence = fields
                    .get("confidence")
                    .and_then(Value::as_f64)
                    .map(clamp_confidence);
                map.insert(label, Classification::new(category, confidence));
            }
            other => {
                tracing::debug!(label = %label, value = %other, "unusable reply entry; skipping");
            }
        }
    }

    Ok(map)
}

fn clamp_confidence(raw: f64) -> f32 {
    if raw.is_finite() {
        (raw as f32).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
