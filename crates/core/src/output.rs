//! Normalization of raw model output into the shape a handler expects.
//!
//! Two shapes exist: plain text (empty output substitutes a localized
//! fallback) and a JSON object (three-tier repair, sentinel on failure).
//! Nothing in here ever raises — the caller always gets a usable value.

use serde_json::{Value, json};

use crate::types::Lang;

/// How many raw characters the malformed-output sentinel carries.
const SENTINEL_RAW_LIMIT: usize = 280;

/// Which shape a handler wants back from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    Text,
    Json,
}

/// Raw output after normalization, matching the handler's declared shape.
#[derive(Debug, Clone)]
pub enum NormalizedOutput {
    Text(String),
    Json(Value),
}

/// Localized stand-in for an empty completion.
pub fn fallback_text(lang: Lang) -> &'static str {
    match lang {
        Lang::Tr => "Buradayım.",
        Lang::En => "I'm here.",
    }
}

/// Plain-text shape: trim, substitute the fallback when empty.
pub fn normalize_text(raw: &str, lang: Lang) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        fallback_text(lang).to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Strip a leading/trailing fenced code block marker (``` or ```json).
fn strip_fences(s: &str) -> &str {
    let s = s.trim();
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    // drop an optional language tag on the opening fence
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Attempt to recover a JSON object from model output.
///
/// Tier 1: strict parse. Tier 2: strip code fences and retry. Tier 3: parse
/// the substring between the first `{` and the last `}` (tolerates prose
/// around the object). `None` only if all three fail.
pub fn repair_json(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        if v.is_object() {
            return Some(v);
        }
    }

    let unfenced = strip_fences(trimmed);
    if let Ok(v) = serde_json::from_str::<Value>(unfenced) {
        if v.is_object() {
            return Some(v);
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&trimmed[start..=end])
        .ok()
        .filter(Value::is_object)
}

/// JSON shape: repaired object, or a sentinel carrying the truncated raw
/// text. Always an object, never an error.
pub fn extract_json(raw: &str) -> Value {
    repair_json(raw).unwrap_or_else(|| {
        tracing::warn!(len = raw.len(), "model output not repairable as JSON");
        json!({
            "error": "malformed_output",
            "raw": truncate(raw, SENTINEL_RAW_LIMIT),
        })
    })
}

fn truncate(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_gets_localized_fallback() {
        assert_eq!(normalize_text("   ", Lang::Tr), "Buradayım.");
        assert_eq!(normalize_text("", Lang::En), "I'm here.");
        assert_eq!(normalize_text("  real reply ", Lang::En), "real reply");
    }

    #[test]
    fn strict_json_parses() {
        let v = repair_json(r#"{"a": 1}"#).unwrap();
        assert_eq!(v["a"], 1);
    }

    #[test]
    fn fenced_json_parses() {
        let raw = "```json\n{\"plate\": \"34\"}\n```";
        let v = repair_json(raw).unwrap();
        assert_eq!(v["plate"], "34");
    }

    #[test]
    fn prose_wrapped_json_parses() {
        let raw = "Here is the gate:\n{\"city\": \"Adana\", \"seal\": \"done\"}\nHope that helps!";
        let v = repair_json(raw).unwrap();
        assert_eq!(v["city"], "Adana");
    }

    #[test]
    fn repair_equals_bare_parse() {
        // fenced + surrounding prose extracts an object deep-equal to the bare parse
        let bare = r#"{"keys": {"light": "x"}, "ritual60": ["a", "b"]}"#;
        let wrapped = format!("Sure!\n```json\n{bare}\n```\nLet me know.");
        let direct: Value = serde_json::from_str(bare).unwrap();
        assert_eq!(repair_json(&wrapped).unwrap(), direct);
    }

    #[test]
    fn hopeless_input_yields_sentinel() {
        let v = extract_json("no braces at all");
        assert_eq!(v["error"], "malformed_output");
        assert_eq!(v["raw"], "no braces at all");
    }

    #[test]
    fn sentinel_truncates_long_raw() {
        let long = "x".repeat(1000);
        let v = extract_json(&long);
        assert_eq!(v["raw"].as_str().unwrap().len(), 280);
    }

    #[test]
    fn non_object_json_rejected() {
        assert!(repair_json("[1, 2, 3]").is_none());
        assert!(repair_json("\"just a string\"").is_none());
    }
}
