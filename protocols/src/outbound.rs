//! Outbound wire shapes: what gets formatted back into model text for the
//! next turn (spec §6 "Outbound wire format").
//!
//! These are protocol-agnostic; each concrete protocol in `tool-parser`
//! decides how to render them (XML elements vs. a JSON marker payload).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `input` a caller hands to `formatToolCall` (spec §4.1): either an
/// already-parsed value or a JSON string to be parsed before formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolCallInput {
    Value(Value),
    Raw(String),
}

impl ToolCallInput {
    /// Resolve to a `Value`, parsing `Raw` as JSON if possible and
    /// falling back to a plain string otherwise (spec §4.1: "if `input`
    /// is a JSON string, parse; else use as-is").
    pub fn into_value(self) -> Value {
        match self {
            ToolCallInput::Value(v) => v,
            ToolCallInput::Raw(s) => serde_json::from_str(&s).unwrap_or(Value::String(s)),
        }
    }
}

/// A tool call ready to be serialized back into wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundToolCall {
    pub name: String,
    pub input: ToolCallInput,
}

impl OutboundToolCall {
    pub fn new(name: impl Into<String>, input: Value) -> Self {
        Self {
            name: name.into(),
            input: ToolCallInput::Value(input),
        }
    }
}

/// One part of a structured tool-response outcome (spec §6: "content[]
/// with text/image/file parts").
#[derive(Debug, Clone, PartialEq)]
pub enum ContentOutcomePart {
    Text(String),
    Image { url: String },
    File { name: String, url: String },
}

/// A tool's result, in one of the shapes a tool runtime can produce
/// (spec §6: "typed outcomes... collapse to a display string").
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Text(String),
    Json(Value),
    ExecutionDenied { reason: Option<String> },
    ErrorText(String),
    ErrorJson(Value),
    Content(Vec<ContentOutcomePart>),
}

impl ToolOutcome {
    /// Collapse any outcome shape to a single display string, per spec
    /// §6. Structured outcomes are JSON-stringified; `Content` parts are
    /// joined, with image/file parts rendered as a bracketed label since
    /// there is no display surface for binary payloads in text wire
    /// formats.
    pub fn display_string(&self) -> String {
        match self {
            ToolOutcome::Text(s) => s.clone(),
            ToolOutcome::Json(v) => v.to_string(),
            ToolOutcome::ExecutionDenied { reason } => match reason {
                Some(r) => format!("execution denied: {r}"),
                None => "execution denied".to_string(),
            },
            ToolOutcome::ErrorText(s) => format!("error: {s}"),
            ToolOutcome::ErrorJson(v) => format!("error: {v}"),
            ToolOutcome::Content(parts) => parts
                .iter()
                .map(|p| match p {
                    ContentOutcomePart::Text(s) => s.clone(),
                    ContentOutcomePart::Image { url } => format!("[image: {url}]"),
                    ContentOutcomePart::File { name, url } => format!("[file: {name} ({url})]"),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Whether `display_string` should be treated as already-structured
    /// JSON rather than a plain string, for protocols that distinguish
    /// the two on the wire (spec §6 JSON-in-marker: "nested `{type:
    /// "json", value}` wrappers are unwrapped").
    pub fn is_structured(&self) -> bool {
        matches!(self, ToolOutcome::Json(_) | ToolOutcome::ErrorJson(_))
    }
}

/// A tool's result paired with the name of the tool that produced it
/// (spec §4.1 `formatToolResponse({toolName, output})`).
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResponse {
    pub tool_name: String,
    pub output: ToolOutcome,
}
