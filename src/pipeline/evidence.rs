//! Evidence-grounding validation.
//!
//! The completion service can emit any JSON the schema permits, including
//! quotes that never appeared in the input. This pass walks the raw
//! extracted tree and nulls out every claim whose quote is not a literal,
//! case-sensitive substring of the text that call's prompt exposed.
//!
//! Grounding failure is not an error: a claim the model could not ground is
//! treated as "the model should have said nothing" and corrected post hoc.

use serde_json::Value;

/// Sanitize one extracted payload against the text its prompt exposed.
///
/// Tree transformation keyed on node shape:
/// - arrays: sanitize each element, drop elements that became null;
/// - evidence objects: kept unchanged iff the quote is grounded, else null;
/// - other objects: sanitize each property, then collapse the whole object
///   to null if its `evidence` property got nulled — a claim without valid
///   grounding is discarded wholesale, not partially kept;
/// - scalars and null pass through.
pub fn sanitize(value: Value, source_text: &str) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| sanitize(item, source_text))
                .filter(|item| !item.is_null())
                .collect(),
        ),
        Value::Object(map) => {
            if is_evidence_shape(&map) {
                return if quote_is_grounded(&map, source_text) {
                    Value::Object(map)
                } else {
                    Value::Null
                };
            }

            let sanitized: serde_json::Map<String, Value> = map
                .into_iter()
                .map(|(key, child)| (key, sanitize(child, source_text)))
                .collect();

            if sanitized.get("evidence").is_some_and(Value::is_null) {
                return Value::Null;
            }

            Value::Object(sanitized)
        }
        scalar => scalar,
    }
}

/// Shape predicate for the evidence leaf: string `quote`, string `source`,
/// and a `page` key (even if null).
fn is_evidence_shape(map: &serde_json::Map<String, Value>) -> bool {
    map.get("quote").is_some_and(Value::is_string)
        && map.get("source").is_some_and(Value::is_string)
        && map.contains_key("page")
}

fn quote_is_grounded(map: &serde_json::Map<String, Value>, source_text: &str) -> bool {
    map["quote"]
        .as_str()
        .is_some_and(|quote| !quote.is_empty() && source_text.contains(quote))
}
