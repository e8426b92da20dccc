//! Batch parse result: the content-part shape from spec §3/§6.

use serde::{Deserialize, Serialize};

/// One piece of a batch parse result: either plain text or a tool call.
///
/// `ToolCall::input` is a canonical JSON string of the coerced
/// arguments, not a `serde_json::Value` — this keeps the wire shape
/// identical to what gets sent back to the model on the next turn, and
/// matches how the teacher's own `ToolCall`/`FunctionCall` pair carries
/// `arguments` as a pre-serialized string rather than a `Value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
    },
    ToolCall {
        id: String,
        name: String,
        input: String,
    },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn tool_call(id: impl Into<String>, name: impl Into<String>, input: impl Into<String>) -> Self {
        ContentPart::ToolCall {
            id: id.into(),
            name: name.into(),
            input: input.into(),
        }
    }

    /// The raw byte span this part contributes, for the round-trip
    /// invariant in spec §8: concatenating every part's text/segment
    /// recovers the original input.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text { text } => Some(text),
            ContentPart::ToolCall { .. } => None,
        }
    }
}
