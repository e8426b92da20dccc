//! The JSON-in-marker tool-call protocol (spec §4.2): a literal start
//! marker, a relaxed-JSON `{name, arguments}` payload, and one of one or
//! more configured end markers.

mod format;
mod stream;

pub use stream::JsonMarkerStreamParser;

use protocol_types::{ContentPart, OutboundToolCall, ToolDefinition, ToolResponse};

use crate::debug::OnError;
use crate::protocol::{StreamParser, ToolCallProtocol, ToolCallSegment};
use crate::relaxed_json;

/// Construction-time options (spec §3 "Protocol options", JSON-in-marker
/// case): `toolCallEnd` may be a single marker or an ordered list, where
/// the earliest-completed match wins ties broken by list order.
#[derive(Clone, Debug)]
pub struct JsonMarkerOptions {
    pub tool_call_start: String,
    pub tool_call_end: Vec<String>,
    pub tool_response_start: String,
    pub tool_response_end: String,
}

impl Default for JsonMarkerOptions {
    fn default() -> Self {
        Self {
            tool_call_start: "<tool_call>".to_string(),
            tool_call_end: vec!["</tool_call>".to_string()],
            tool_response_start: "<tool_response>".to_string(),
            tool_response_end: "</tool_response>".to_string(),
        }
    }
}

pub struct JsonMarkerProtocol {
    options: JsonMarkerOptions,
}

impl JsonMarkerProtocol {
    pub fn new(options: JsonMarkerOptions) -> Self {
        Self { options }
    }
}

impl Default for JsonMarkerProtocol {
    fn default() -> Self {
        Self::new(JsonMarkerOptions::default())
    }
}

/// Find the earliest complete `end` marker occurrence in `text` among
/// `ends`, breaking ties at the same start index by list order (spec
/// §4.2 "Selection rule", §9 open question (b)).
fn earliest_end_match(text: &str, ends: &[String]) -> Option<(usize, usize)> {
    ends.iter()
        .filter_map(|end| text.find(end.as_str()).map(|pos| (pos, pos + end.len())))
        .min_by_key(|(pos, _)| *pos)
}

struct Payload {
    name: String,
    arguments: serde_json::Value,
}

fn parse_payload(raw: &str) -> Option<Payload> {
    let value = relaxed_json::parse_relaxed(raw).ok()?;
    let obj = value.as_object()?;
    let name = obj.get("name")?.as_str()?.to_string();
    let arguments = obj.get("arguments").cloned().unwrap_or_else(|| serde_json::json!({}));
    Some(Payload { name, arguments })
}

impl ToolCallProtocol for JsonMarkerProtocol {
    fn format_tools(&self, tools: &[ToolDefinition]) -> String {
        crate::tool_description::describe_tools_json(tools)
    }

    fn format_tool_call(&self, call: &OutboundToolCall) -> String {
        format::format_tool_call(&self.options, call)
    }

    fn format_tool_response(&self, response: &ToolResponse) -> String {
        format::format_tool_response(&self.options, response)
    }

    fn parse_generated_text(
        &self,
        text: &str,
        tools: &[ToolDefinition],
        on_error: &OnError,
    ) -> Vec<ContentPart> {
        let declared: std::collections::HashSet<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        let mut parts = Vec::new();
        let mut pos = 0usize;
        let mut text_start = 0usize;

        loop {
            let Some(start_rel) = text[pos..].find(self.options.tool_call_start.as_str()) else { break };
            let start = pos + start_rel;
            let payload_start = start + self.options.tool_call_start.len();
            let Some((end_rel_start, end_rel_end)) = earliest_end_match(&text[payload_start..], &self.options.tool_call_end) else {
                break;
            };
            let payload_end = payload_start + end_rel_start;
            let span_end = payload_start + end_rel_end;
            let raw_payload = &text[payload_start..payload_end];

            match parse_payload(raw_payload).filter(|p| declared.is_empty() || declared.contains(p.name.as_str())) {
                Some(payload) => {
                    if start > text_start {
                        parts.push(ContentPart::text(&text[text_start..start]));
                    }
                    let input = serde_json::to_string(&payload.arguments).unwrap_or_else(|_| "{}".to_string());
                    parts.push(ContentPart::tool_call(format!("call_{start}"), payload.name, input));
                    text_start = span_end;
                }
                None => {
                    on_error(
                        "could not process tool call, keeping original text",
                        serde_json::json!({ "span": &text[start..span_end] }),
                    );
                }
            }
            pos = span_end;
        }

        if text_start < text.len() {
            parts.push(ContentPart::text(&text[text_start..]));
        }
        parts
    }

    fn create_stream_parser(&self, _tools: Vec<ToolDefinition>) -> Box<dyn StreamParser> {
        Box::new(JsonMarkerStreamParser::new(self.options.clone()))
    }

    fn extract_tool_call_segments(
        &self,
        text: &str,
        _tools: &[ToolDefinition],
    ) -> Option<Vec<ToolCallSegment>> {
        let mut segments = Vec::new();
        let mut pos = 0usize;
        loop {
            let Some(start_rel) = text[pos..].find(self.options.tool_call_start.as_str()) else { break };
            let start = pos + start_rel;
            let payload_start = start + self.options.tool_call_start.len();
            let Some((end_rel_start, end_rel_end)) = earliest_end_match(&text[payload_start..], &self.options.tool_call_end) else {
                break;
            };
            let payload_end = payload_start + end_rel_start;
            let span_end = payload_start + end_rel_end;
            let raw_payload = &text[payload_start..payload_end];
            let name = parse_payload(raw_payload).map(|p| p.name).unwrap_or_default();
            segments.push(ToolCallSegment { tool_name: name, start, end: span_end });
            pos = span_end;
        }
        Some(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol_types::JsonSchemaLike;
    use std::sync::{Arc, Mutex};

    fn search_tool() -> ToolDefinition {
        ToolDefinition::new("f", JsonSchemaLike::default())
    }

    fn no_op_on_error() -> OnError {
        Arc::new(|_msg, _meta| {})
    }

    #[test]
    fn basic_marker_call() {
        let protocol = JsonMarkerProtocol::default();
        let text = r#"before <tool_call>{"name": "f", "arguments": {"x": 1}}</tool_call> after"#;
        let parts = protocol.parse_generated_text(text, &[search_tool()], &no_op_on_error());
        assert_eq!(
            parts,
            vec![
                ContentPart::text("before "),
                ContentPart::tool_call("call_7", "f", r#"{"x":1}"#),
                ContentPart::text(" after"),
            ]
        );
    }

    #[test]
    fn malformed_payload_falls_back_to_text() {
        let protocol = JsonMarkerProtocol::default();
        let text = "<tool_call>not json at all</tool_call>";
        let called = Arc::new(Mutex::new(false));
        let called2 = called.clone();
        let on_error: OnError = Arc::new(move |_m, _meta| *called2.lock().unwrap() = true);
        let parts = protocol.parse_generated_text(text, &[search_tool()], &on_error);
        assert_eq!(parts, vec![ContentPart::text(text)]);
        assert!(*called.lock().unwrap());
    }

    #[test]
    fn earliest_end_marker_wins_among_alternates() {
        let options = JsonMarkerOptions {
            tool_call_start: "<tool_call>".to_string(),
            tool_call_end: vec!["`".to_string(), "```".to_string()],
            ..JsonMarkerOptions::default()
        };
        let protocol = JsonMarkerProtocol::new(options);
        let text = r#"<tool_call>{"name": "f", "arguments": {}}` done"#;
        let parts = protocol.parse_generated_text(text, &[search_tool()], &no_op_on_error());
        assert!(matches!(&parts[0], ContentPart::ToolCall { name, .. } if name == "f"));
        assert_eq!(parts[1], ContentPart::text(" done"));
    }
}
