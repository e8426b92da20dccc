//! The XML tokenizer "external contract" (spec §2, §6): parse a
//! well-formed-enough XML fragment against a schema into a tagged tree,
//! plus raw-inner extraction and top-level range finding for the XML
//! protocol's batch scan.
//!
//! This is intentionally not a general-purpose XML/HTML parser (spec
//! §1 Non-goals). It understands exactly enough structure to turn
//! `<a><b>1</b><b>2</b></a>` into `{"b": ["1", "2"]}` while leaving
//! every leaf as a string — type coercion is the schema coercer's job
//! (§4.5), not the tokenizer's.

use std::fmt;

use protocol_types::JsonSchemaLike;
use serde_json::{Map, Value};

use crate::schema_utils::{string_properties, unwrap_schema};
use crate::xml_walk::{find_balanced_close, find_next_open_tag};

#[derive(Debug, Clone, PartialEq)]
pub enum XmlError {
    /// A schema property declared `type: "string"` appeared more than
    /// once as a sibling (spec §7 "Duplicate string tag", §8 scenario 5).
    DuplicateStringTag(String),
    Malformed(String),
}

impl fmt::Display for XmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlError::DuplicateStringTag(name) => {
                write!(f, "duplicate string tags for property '{}'", name)
            }
            XmlError::Malformed(msg) => write!(f, "malformed xml: {}", msg),
        }
    }
}

impl std::error::Error for XmlError {}

/// One immediate child element found while scanning a raw XML segment.
struct Child {
    name: String,
    raw_inner: String,
}

/// Scan the immediate children of `text` (a raw XML inner segment),
/// generically — any tag name, not restricted to a known set.
fn scan_children(text: &str) -> Vec<Child> {
    let mut children = Vec::new();
    let mut pos = 0usize;
    while let Some(open) = find_next_open_tag(text, pos, None) {
        if open.self_closing {
            children.push(Child {
                name: open.name,
                raw_inner: String::new(),
            });
            pos = open.tag_end;
            continue;
        }
        match find_balanced_close(text, &open.name, open.tag_end) {
            Some((content_end, after)) => {
                children.push(Child {
                    name: open.name,
                    raw_inner: text[open.tag_end..content_end].to_string(),
                });
                pos = after;
            }
            None => break, // unterminated: stop scanning, leave the rest unparsed
        }
    }
    children
}

/// Parse a raw XML inner segment into a JSON tree, using `schema` only
/// to know which top-level properties are string-typed (and so must be
/// preserved byte-for-byte rather than recursively parsed).
pub fn parse(raw_segment: &str, schema: &JsonSchemaLike) -> Result<Value, XmlError> {
    let schema = unwrap_schema(schema);
    let string_props: Vec<&str> = string_properties(schema);
    parse_with_string_props(raw_segment, &string_props, schema)
}

fn parse_with_string_props(
    raw_segment: &str,
    string_props: &[&str],
    schema: &JsonSchemaLike,
) -> Result<Value, XmlError> {
    let children = scan_children(raw_segment);

    let mut by_name: Vec<(String, Vec<String>)> = Vec::new();
    for child in children {
        if let Some(entry) = by_name.iter_mut().find(|(n, _)| *n == child.name) {
            entry.1.push(child.raw_inner);
        } else {
            by_name.push((child.name.clone(), vec![child.raw_inner]));
        }
    }

    let mut map = Map::new();
    for (name, values) in by_name {
        let is_string_prop = string_props.contains(&name.as_str());

        if is_string_prop {
            if values.len() > 1 {
                return Err(XmlError::DuplicateStringTag(name));
            }
            map.insert(name, Value::String(values.into_iter().next().unwrap_or_default()));
            continue;
        }

        let nested_schema = schema
            .properties
            .as_ref()
            .and_then(|p| p.get(&name));

        if values.len() == 1 {
            map.insert(name, parse_leaf_or_nested(&values[0], nested_schema)?);
        } else {
            let mut items = Vec::with_capacity(values.len());
            for v in values {
                items.push(parse_leaf_or_nested(&v, nested_schema)?);
            }
            map.insert(name, Value::Array(items));
        }
    }

    Ok(Value::Object(map))
}

fn parse_leaf_or_nested(
    raw: &str,
    nested_schema: Option<&JsonSchemaLike>,
) -> Result<Value, XmlError> {
    let trimmed = raw.trim();
    if trimmed.contains('<') && trimmed.contains('>') {
        let empty_schema = JsonSchemaLike::default();
        let schema = nested_schema.map(unwrap_schema).unwrap_or(&empty_schema);
        let string_props: Vec<&str> = string_properties(schema);
        return parse_with_string_props(raw, &string_props, schema);
    }
    Ok(Value::String(trimmed.to_string()))
}

/// Extract the exact raw inner bytes between an opening tag's `>` and
/// its matching closing tag's `<` (spec §4.1 "raw inner segment").
pub fn raw_inner(text: &str, open_tag_end: usize, content_end: usize) -> &str {
    &text[open_tag_end..content_end]
}
