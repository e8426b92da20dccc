//! Tool descriptors: the `in` side of the external interface (spec §6).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::JsonSchemaLike;

/// A tool the model was told it can call. Immutable after construction;
/// names must be unique per invocation and empty names are ignored by
/// callers that build a [`ToolDefinition`] list from user input.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,

    pub description: Option<String>,

    pub input_schema: JsonSchemaLike,

    pub input_examples: Option<Vec<Value>>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, input_schema: JsonSchemaLike) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema,
            input_examples: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
