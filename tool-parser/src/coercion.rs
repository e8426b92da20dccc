//! Schema-directed coercion (spec §4.5): convert a weakly-typed parsed
//! tree into typed values per a JSON-Schema-like descriptor. Pure and
//! total — every input yields some output, and nothing ever errors.

use protocol_types::JsonSchemaLike;
use serde_json::{Number, Value};

use crate::heuristics::normalize_close_tags::normalize as normalize_close_tags;
use crate::relaxed_json;
use crate::schema_utils::unwrap_schema;
use crate::xml_tokenizer;
use crate::xml_walk::{find_balanced_close, find_next_open_tag};

/// Coerce `value` against `schema`, applying the traversal rules of
/// spec §4.5. Never fails; leaves values unchanged when no rule applies.
pub fn coerce(value: &Value, schema: &JsonSchemaLike) -> Value {
    let schema = unwrap_schema(schema);
    match schema.schema_type.as_deref() {
        Some("object") => coerce_object(value, schema),
        Some("array") => coerce_array(value, schema),
        Some("number") => coerce_number(value, false),
        Some("integer") => coerce_number(value, true),
        Some("boolean") => coerce_boolean(value),
        Some("string") => value.clone(),
        _ => value.clone(),
    }
}

fn coerce_object(value: &Value, schema: &JsonSchemaLike) -> Value {
    let Value::Object(map) = value else {
        return value.clone();
    };
    let mut result = map.clone();
    if let Some(properties) = &schema.properties {
        for (key, child_schema) in properties {
            if let Some(v) = map.get(key) {
                result.insert(key.clone(), coerce(v, child_schema));
            }
        }
    }
    Value::Object(result)
}

fn coerce_array(value: &Value, schema: &JsonSchemaLike) -> Value {
    let item_schema = schema.items.as_deref();
    match value {
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| coerce_item(item, item_schema)).collect())
        }
        // Item-wrapped array: the tokenizer produced `{"item": [...]}` (or
        // any other single key) instead of a bare array (spec §4.5
        // "Item-wrapped arrays").
        Value::Object(map) if map.len() == 1 => {
            let inner = map.values().next().unwrap();
            match inner {
                Value::Array(items) => {
                    Value::Array(items.iter().map(|item| coerce_item(item, item_schema)).collect())
                }
                other => Value::Array(vec![coerce_item(other, item_schema)]),
            }
        }
        Value::String(s) => split_scalar_list(s, item_schema),
        other => other.clone(),
    }
}

fn coerce_item(value: &Value, item_schema: Option<&JsonSchemaLike>) -> Value {
    let Some(schema) = item_schema else {
        return value.clone();
    };
    let schema = unwrap_schema(schema);
    if schema.is_type("object") {
        if let Value::String(s) = value {
            return coerce_object_from_string(s, schema);
        }
    }
    coerce(value, schema)
}

/// Rescue a string-encoded object per spec §4.5: try relaxed JSON, then
/// the XML tokenizer (after close-tag normalization), then the
/// `<step>/<status>` domain-specific rescue.
fn coerce_object_from_string(s: &str, schema: &JsonSchemaLike) -> Value {
    if let Ok(v) = relaxed_json::parse_relaxed(s) {
        if v.is_object() {
            return coerce_object(&v, schema);
        }
    }

    let normalized = normalize_close_tags(s);
    if let Ok(Value::Object(map)) = xml_tokenizer::parse(&normalized, schema) {
        let recognized = schema
            .properties
            .as_ref()
            .map(|props| props.keys().any(|k| map.contains_key(k)))
            .unwrap_or(!map.is_empty());
        if recognized {
            return coerce_object(&Value::Object(map), schema);
        }
    }

    if let Some(rescued) = rescue_step_status(s) {
        return rescued;
    }

    Value::String(s.to_string())
}

/// Domain-specific rescue: synthesize `{step, status}` from
/// `<step>…</step>` and `<status>…</status>` siblings when present.
fn rescue_step_status(s: &str) -> Option<Value> {
    let step = extract_tag(s, "step")?;
    let status = extract_tag(s, "status")?;
    Some(serde_json::json!({ "step": step, "status": status }))
}

fn extract_tag(text: &str, name: &str) -> Option<String> {
    let names = [name];
    let open = find_next_open_tag(text, 0, Some(&names))?;
    if open.self_closing {
        return Some(String::new());
    }
    let (content_end, _) = find_balanced_close(text, name, open.tag_end)?;
    Some(text[open.tag_end..content_end].trim().to_string())
}

fn coerce_number(value: &Value, is_integer: bool) -> Value {
    let Value::String(s) = value else {
        return value.clone();
    };
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return value.clone();
    }
    let normalized = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let Ok(n) = normalized.parse::<f64>() else {
        return value.clone();
    };
    if is_integer && n.fract() == 0.0 && n.is_finite() {
        return Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number).unwrap_or_else(|| value.clone())
}

fn coerce_boolean(value: &Value) -> Value {
    let Value::String(s) = value else {
        return value.clone();
    };
    match s.to_ascii_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => value.clone(),
    }
}

/// Split a scalar string into typed array items (spec §4.5: "Comma-,
/// newline-... separated scalar lists"). Only comma and newline are
/// treated as separators — a single XML-tag value that merely contains
/// internal whitespace (spec §8 scenario 3: `echo "hello"`) must stay
/// one element, not be torn apart at every space.
fn split_scalar_list(s: &str, item_schema: Option<&JsonSchemaLike>) -> Value {
    if !s.contains(',') && !s.contains('\n') {
        return Value::Array(vec![coerce_item(&Value::String(s.trim().to_string()), item_schema)]);
    }
    let parts: Vec<&str> = s
        .split(|c: char| c == ',' || c == '\n' || c == '\r')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    let items = parts
        .into_iter()
        .map(|p| coerce_item(&Value::String(p.to_string()), item_schema))
        .collect();
    Value::Array(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn typed(ty: &str) -> JsonSchemaLike {
        JsonSchemaLike {
            schema_type: Some(ty.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn coerces_scalars() {
        assert_eq!(coerce(&Value::String("10".into()), &typed("number")), serde_json::json!(10));
        assert_eq!(coerce(&Value::String("5".into()), &typed("integer")), serde_json::json!(5));
        assert_eq!(coerce(&Value::String("true".into()), &typed("boolean")), serde_json::json!(true));
        assert_eq!(coerce(&Value::String("TRUE".into()), &typed("boolean")), serde_json::json!(true));
        assert_eq!(coerce(&Value::String("hi".into()), &typed("string")), serde_json::json!("hi"));
    }

    #[test]
    fn leaves_empty_numeric_string_unchanged() {
        assert_eq!(coerce(&Value::String("  ".into()), &typed("number")), serde_json::json!("  "));
    }

    #[test]
    fn coerces_nested_object() {
        let schema = JsonSchemaLike::object(HashMap::from([
            ("a".to_string(), typed("number")),
            ("b".to_string(), typed("integer")),
            ("c".to_string(), typed("boolean")),
        ]));
        let value = serde_json::json!({"a": "10", "b": "5", "c": "true"});
        assert_eq!(coerce(&value, &schema), serde_json::json!({"a": 10, "b": 5, "c": true}));
    }

    #[test]
    fn unwraps_item_wrapped_array_and_coerces_items() {
        let schema = JsonSchemaLike {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(typed("number"))),
            ..Default::default()
        };
        let value = serde_json::json!({"item": ["1", "2.5", "1.23e3"]});
        assert_eq!(coerce(&value, &schema), serde_json::json!([1, 2.5, 1230]));
    }

    #[test]
    fn splits_comma_separated_scalar_list() {
        let schema = JsonSchemaLike {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(typed("number"))),
            ..Default::default()
        };
        let value = Value::String("1, 2, 3".to_string());
        assert_eq!(coerce(&value, &schema), serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn single_scalar_value_with_internal_whitespace_stays_one_element_scenario_3() {
        let schema = JsonSchemaLike {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(typed("string"))),
            ..Default::default()
        };
        let value = Value::String(r#"echo "hello""#.to_string());
        assert_eq!(coerce(&value, &schema), serde_json::json!([r#"echo "hello""#]));
    }

    #[test]
    fn splits_newline_separated_scalar_list() {
        let schema = JsonSchemaLike {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(typed("string"))),
            ..Default::default()
        };
        let value = Value::String("a\nb\nc".to_string());
        assert_eq!(coerce(&value, &schema), serde_json::json!(["a", "b", "c"]));
    }

    #[test]
    fn rescues_step_status_from_unrecognized_wrapper_tag() {
        let schema = JsonSchemaLike::object(HashMap::from([
            ("step".to_string(), typed("string")),
            ("status".to_string(), typed("string")),
        ]));
        // The generic tokenizer only sees the unrecognized outer "note"
        // wrapper, so nothing in the schema matches; the domain rescue
        // searches for step/status directly instead.
        let value = Value::String(
            "<note>fyi<step>download</step><status>ok</status></note>".to_string(),
        );
        let coerced = coerce_item(&value, Some(&schema));
        assert_eq!(coerced, serde_json::json!({"step": "download", "status": "ok"}));
    }

    #[test]
    fn coercion_is_idempotent() {
        let schema = JsonSchemaLike::object(HashMap::from([("a".to_string(), typed("number"))]));
        let value = serde_json::json!({"a": "10"});
        let once = coerce(&value, &schema);
        let twice = coerce(&once, &schema);
        assert_eq!(once, twice);
    }
}
