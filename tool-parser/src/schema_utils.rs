//! Schema utilities (spec §2: "Unwrap schema wrappers; enumerate
//! string-typed properties; detect array-valued properties").

use protocol_types::JsonSchemaLike;

/// Transparently unwrap `{jsonSchema: {...}}`-style indirections before
/// inspecting a schema (spec §3 invariant, §4.5 traversal rule).
pub fn unwrap_schema(schema: &JsonSchemaLike) -> &JsonSchemaLike {
    let mut current = schema;
    while let Some(inner) = &current.json_schema {
        current = inner;
    }
    current
}

/// Every top-level property declared `type: "string"`.
pub fn string_properties(schema: &JsonSchemaLike) -> Vec<&str> {
    let schema = unwrap_schema(schema);
    let Some(properties) = &schema.properties else {
        return Vec::new();
    };
    properties
        .iter()
        .filter(|(_, s)| unwrap_schema(s).is_type("string"))
        .map(|(k, _)| k.as_str())
        .collect()
}

/// Every top-level property declared `type: "array"`.
pub fn array_properties(schema: &JsonSchemaLike) -> Vec<&str> {
    let schema = unwrap_schema(schema);
    let Some(properties) = &schema.properties else {
        return Vec::new();
    };
    properties
        .iter()
        .filter(|(_, s)| unwrap_schema(s).is_type("array"))
        .map(|(k, _)| k.as_str())
        .collect()
}

/// Heuristic recognizer for shell-like tools (spec §4.3
/// `dedupe-shell-string-tags`): a `command` property typed as an array.
pub fn looks_like_shell_tool(schema: &JsonSchemaLike) -> bool {
    let schema = unwrap_schema(schema);
    schema
        .properties
        .as_ref()
        .and_then(|props| props.get("command"))
        .map(|command| unwrap_schema(command).is_type("array"))
        .unwrap_or(false)
}

/// The declared schema for a property, if the property is known.
pub fn property_schema<'a>(schema: &'a JsonSchemaLike, key: &str) -> Option<&'a JsonSchemaLike> {
    unwrap_schema(schema).properties.as_ref()?.get(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn obj(props: HashMap<String, JsonSchemaLike>) -> JsonSchemaLike {
        JsonSchemaLike::object(props)
    }

    fn typed(ty: &str) -> JsonSchemaLike {
        JsonSchemaLike {
            schema_type: Some(ty.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn unwraps_json_schema_wrapper() {
        let inner = typed("object");
        let wrapper = JsonSchemaLike {
            json_schema: Some(Box::new(inner.clone())),
            ..Default::default()
        };
        assert!(unwrap_schema(&wrapper).is_type("object"));
    }

    #[test]
    fn finds_string_and_array_properties() {
        let schema = obj(HashMap::from([
            ("description".to_string(), typed("string")),
            ("command".to_string(), typed("array")),
            ("count".to_string(), typed("number")),
        ]));
        let mut strings = string_properties(&schema);
        strings.sort();
        assert_eq!(strings, vec!["description"]);
        assert_eq!(array_properties(&schema), vec!["command"]);
    }

    #[test]
    fn recognizes_shell_like_tool() {
        let schema = obj(HashMap::from([
            ("command".to_string(), typed("array")),
            ("description".to_string(), typed("string")),
        ]));
        assert!(looks_like_shell_tool(&schema));

        let not_shell = obj(HashMap::from([("description".to_string(), typed("string"))]));
        assert!(!looks_like_shell_tool(&not_shell));
    }
}
