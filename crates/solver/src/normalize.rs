//! Record normalization — coerces loosely structured generator text into
//! the strict `AnswerRecord` shape.
//!
//! The raw response is *supposed* to be a JSON-like list of records but may
//! be wrapped in markdown fences, use single quotes, contain stray runtime
//! object representations, or be malformed outright. Recovery is an
//! explicit, ordered chain of pure stages (not nested exception handling),
//! each tried only if the prior one failed, so every stage is auditable and
//! unit-testable on its own:
//!
//! 1. strict JSON parse of the trimmed text
//! 2. relaxed literal parse (see [`crate::relaxed`])
//! 3. markdown-fence extraction, then 1 and 2 on the inner text
//! 4. object-repr sanitization, then 1 and 2 on the cleaned text and on
//!    its fenced inner content (reprs inside a fenced block)
//!
//! If everything fails, or the parsed value is not list-shaped after
//! wrapping a single mapping, the caller gets the sentinel error record —
//! never an error. Only shape is enforced here; `result` keeps whatever
//! literal type parsing yielded.

use inkmath_core::AnswerRecord;
use serde_json::Value;
use tracing::debug;

/// Which stage of the fallback chain recovered a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Strict,
    Relaxed,
    Fenced,
    ReprSanitized,
}

/// Normalize a raw generator response into answer records.
///
/// Never fails: unrecoverable malformation yields the single-element
/// sentinel list instead.
pub fn normalize(raw: &str) -> Vec<AnswerRecord> {
    let trimmed = raw.trim();

    let Some((value, stage)) = attempt_chain(trimmed) else {
        debug!(raw_len = raw.len(), "All parse stages failed, returning sentinel record");
        return vec![AnswerRecord::parse_failure()];
    };

    let Some(items) = into_list(value) else {
        debug!(
            raw_len = raw.len(),
            stage = ?stage,
            "Parsed value is not list-shaped, returning sentinel record"
        );
        return vec![AnswerRecord::parse_failure()];
    };

    debug!(stage = ?stage, records = items.len(), "Normalized generator response");

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Object(map) => records.push(record_from_map(map)),
            other => {
                // Known permissiveness: non-mapping elements are silently
                // dropped rather than surfaced as partial failure.
                debug!(kind = value_kind(&other), "Dropping non-mapping list element");
            }
        }
    }
    records
}

fn attempt_chain(text: &str) -> Option<(Value, Stage)> {
    if let Some(v) = parse_strict(text) {
        return Some((v, Stage::Strict));
    }
    if let Some(v) = crate::relaxed::parse(text) {
        return Some((v, Stage::Relaxed));
    }
    if let Some(inner) = extract_fenced(text) {
        if let Some(v) = parse_strict(&inner).or_else(|| crate::relaxed::parse(&inner)) {
            return Some((v, Stage::Fenced));
        }
    }
    if let Some(cleaned) = sanitize_reprs(text) {
        if let Some(v) = parse_strict(&cleaned).or_else(|| crate::relaxed::parse(&cleaned)) {
            return Some((v, Stage::ReprSanitized));
        }
        // Reprs and fences co-occur: sanitize first, then pull the fenced
        // inner text out of the cleaned copy.
        if let Some(inner) = extract_fenced(&cleaned) {
            if let Some(v) = parse_strict(&inner).or_else(|| crate::relaxed::parse(&inner)) {
                return Some((v, Stage::ReprSanitized));
            }
        }
    }
    None
}

fn parse_strict(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

/// Extract the content between the first pair of ``` fence markers,
/// stripping an optional leading `json` language tag.
fn extract_fenced(text: &str) -> Option<String> {
    let start = text.find("```")?;
    let rest = &text[start + 3..];
    let end = rest.find("```")?;
    let mut inner = rest[..end].trim();
    if let Some(stripped) = inner.strip_prefix("json") {
        inner = stripped.trim_start();
    }
    Some(inner.to_string())
}

/// Recover text where the generator echoed a runtime's debug representation
/// of an object (`<module.TypeName object at 0x...>`) instead of a literal
/// value: the opening marker becomes a quote, trailing `>` becomes a quote,
/// and the address survives as an opaque string.
fn sanitize_reprs(text: &str) -> Option<String> {
    if !text.contains(" object at ") {
        return None;
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut replaced = false;

    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        let after = &rest[lt + 1..];
        let marker = after.find(" object at ");
        match marker {
            Some(idx) if is_type_path(&after[..idx]) => {
                out.push('"');
                rest = &after[idx + " object at ".len()..];
                replaced = true;
            }
            _ => {
                out.push('<');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    if !replaced {
        return None;
    }
    Some(out.replace('>', "\""))
}

fn is_type_path(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}

/// A single mapping is wrapped into a one-element list; anything that is
/// neither a mapping nor a list is not list-shaped.
fn into_list(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        obj @ Value::Object(_) => Some(vec![obj]),
        _ => None,
    }
}

/// Shape enforcement only: all three fields come out populated, with serde
/// defaults for whatever the raw mapping omitted, and `result` exactly as
/// parsed.
fn record_from_map(map: serde_json::Map<String, Value>) -> AnswerRecord {
    let expr = match map.get("expr") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let result = map.get("result").cloned().unwrap_or(Value::Null);
    let assign = map.get("assign").and_then(Value::as_bool).unwrap_or(false);
    AnswerRecord { expr, result, assign }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sentinel() -> Vec<AnswerRecord> {
        vec![AnswerRecord::parse_failure()]
    }

    #[test]
    fn strict_json_list_passes_through() {
        let records = normalize(r#"[{"expr": "2+2", "result": 4, "assign": false}]"#);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].expr, "2+2");
        assert_eq!(records[0].result, json!(4));
        assert!(!records[0].assign);
    }

    #[test]
    fn assign_defaulted_when_missing() {
        let records = normalize(r#"[{"expr": "3*4", "result": 12}]"#);
        assert_eq!(records.len(), 1);
        assert!(!records[0].assign);
    }

    #[test]
    fn python_style_quotes_recovered() {
        let records = normalize("[{'expr': '2+2', 'result': 4}]");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].expr, "2+2");
        assert_eq!(records[0].result, json!(4));
        assert!(!records[0].assign);
    }

    #[test]
    fn python_true_maps_to_bool() {
        let records = normalize("[{'expr': 'x', 'result': 2, 'assign': True}]");
        assert_eq!(records.len(), 1);
        assert!(records[0].assign);
    }

    #[test]
    fn fenced_with_language_tag() {
        let records = normalize("```json\n[{\"expr\":\"x\",\"result\":2,\"assign\":true}]\n```");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].expr, "x");
        assert_eq!(records[0].result, json!(2));
        assert!(records[0].assign);
    }

    #[test]
    fn fenced_without_language_tag() {
        let records = normalize("```\n[{'expr': 'y', 'result': 5}]\n```");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].expr, "y");
    }

    #[test]
    fn fenced_with_surrounding_prose() {
        let raw = "Here is the answer:\n```json\n[{\"expr\": \"7-3\", \"result\": 4}]\n```\nHope that helps!";
        let records = normalize(raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].expr, "7-3");
    }

    #[test]
    fn single_mapping_wrapped_into_list() {
        let records = normalize(r#"{"expr": "5/5", "result": 1}"#);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].expr, "5/5");
    }

    #[test]
    fn unbracketed_dict_sequence() {
        let records =
            normalize("{'expr': 'x', 'result': 2, 'assign': True}, {'expr': 'y', 'result': 5, 'assign': True}");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].expr, "x");
        assert_eq!(records[1].expr, "y");
        assert!(records.iter().all(|r| r.assign));
    }

    #[test]
    fn object_repr_sanitized() {
        let records = normalize("[{'expr': <ast.Name object at 0x7fa3c01>, 'result': 4}]");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].expr, "0x7fa3c01");
        assert_eq!(records[0].result, json!(4));
    }

    #[test]
    fn object_repr_inside_fenced_block() {
        let raw = "```json\n[{'expr': <ast.Name object at 0x7fa3c01>, 'result': 4}]\n```";
        let records = normalize(raw);
        assert_ne!(records, sentinel());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].expr, "0x7fa3c01");
        assert_eq!(records[0].result, json!(4));
    }

    #[test]
    fn unparseable_yields_sentinel() {
        assert_eq!(normalize("not valid at all {{{"), sentinel());
    }

    #[test]
    fn empty_input_yields_sentinel() {
        assert_eq!(normalize(""), sentinel());
        assert_eq!(normalize("   \n  "), sentinel());
    }

    #[test]
    fn scalar_is_not_list_shaped() {
        assert_eq!(normalize("42"), sentinel());
        assert_eq!(normalize(r#""just a string""#), sentinel());
    }

    #[test]
    fn sentinel_shape_is_exact() {
        let records = normalize("@@@");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].expr, "Error");
        assert_eq!(records[0].result, json!("Failed to parse response"));
        assert!(!records[0].assign);
    }

    #[test]
    fn non_mapping_elements_dropped() {
        let records = normalize(r#"[{"expr": "a", "result": 1}, 42, "stray"]"#);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].expr, "a");
    }

    #[test]
    fn missing_fields_are_populated() {
        let records = normalize(r#"[{"result": 9}]"#);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].expr, "");
        assert_eq!(records[0].result, json!(9));
        assert!(!records[0].assign);
    }

    #[test]
    fn result_type_not_coerced() {
        let records = normalize(r#"[{"expr": "a", "result": "4"}, {"expr": "b", "result": 4}]"#);
        assert_eq!(records[0].result, json!("4"));
        assert_eq!(records[1].result, json!(4));
    }

    #[test]
    fn idempotent_over_own_output() {
        let first = normalize("[{'expr': '2+2', 'result': 4}, {'expr': 'x', 'result': 2, 'assign': True}]");
        let reserialized = serde_json::to_string(&first).unwrap();
        let second = normalize(&reserialized);
        assert_eq!(first, second);
    }

    #[test]
    fn fence_extraction_helper() {
        assert_eq!(
            extract_fenced("```json\n[1]\n```").as_deref(),
            Some("[1]")
        );
        assert_eq!(extract_fenced("```\n[1]\n```").as_deref(), Some("[1]"));
        assert_eq!(extract_fenced("no fences here"), None);
        // Unterminated fence: nothing to extract.
        assert_eq!(extract_fenced("```json\n[1]"), None);
    }

    #[test]
    fn repr_sanitizer_helper() {
        let cleaned = sanitize_reprs("{'a': <ast.Name object at 0xdeadbeef>}").unwrap();
        assert_eq!(cleaned, "{'a': \"0xdeadbeef\"}");
        // Plain comparisons are left alone.
        assert_eq!(sanitize_reprs("[{'result': '2 < 3 > 1'}]"), None);
    }
}
