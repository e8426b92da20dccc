//! JSON-Schema-like descriptors for tool input.
//!
//! Mirrors the subset of JSON Schema that LLM tool-calling APIs actually
//! emit: `type`, `properties`, `items`, `required`, plus whatever
//! provider-specific keys ride along in `additional`. Schemas are
//! sometimes wrapped (`{"jsonSchema": {...}}` and similar indirections);
//! unwrapping those wrappers is a `tool-parser` concern, not this crate's.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON-Schema-like descriptor for a tool's input or a nested property.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JsonSchemaLike {
    #[serde(rename = "type")]
    pub schema_type: Option<String>,

    pub properties: Option<HashMap<String, JsonSchemaLike>>,

    pub items: Option<Box<JsonSchemaLike>>,

    pub required: Option<Vec<String>>,

    pub description: Option<String>,

    /// Known wrapper key some providers nest the real schema under, e.g.
    /// `{"jsonSchema": {...}}`. Populated when present so callers can
    /// unwrap without losing the rest of the descriptor.
    #[serde(rename = "jsonSchema")]
    pub json_schema: Option<Box<JsonSchemaLike>>,

    /// Anything else the provider included (enum, format, additionalProperties, ...).
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl JsonSchemaLike {
    pub fn object(properties: HashMap<String, JsonSchemaLike>) -> Self {
        Self {
            schema_type: Some("object".to_string()),
            properties: Some(properties),
            ..Default::default()
        }
    }

    pub fn is_type(&self, ty: &str) -> bool {
        self.schema_type.as_deref() == Some(ty)
    }
}
