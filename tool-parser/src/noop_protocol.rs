//! A pass-through no-op protocol (SPEC_FULL.md "Supplemented features",
//! spec.md §9: "a pass-through no-op protocol used for testing"). Never
//! recognizes a tool call; exists so protocol-dispatch code can be
//! exercised against a trivial, fully predictable implementation of
//! [`ToolCallProtocol`] instead of always reaching for a real one.

use protocol_types::{ContentPart, OutboundToolCall, StreamEvent, ToolDefinition, ToolResponse};

use crate::debug::OnError;
use crate::protocol::{StreamParser, ToolCallProtocol, ToolCallSegment};

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProtocol;

impl ToolCallProtocol for NoopProtocol {
    fn format_tools(&self, _tools: &[ToolDefinition]) -> String {
        String::new()
    }

    fn format_tool_call(&self, call: &OutboundToolCall) -> String {
        call.name.clone()
    }

    fn format_tool_response(&self, response: &ToolResponse) -> String {
        response.tool_name.clone()
    }

    fn parse_generated_text(
        &self,
        text: &str,
        _tools: &[ToolDefinition],
        _on_error: &OnError,
    ) -> Vec<ContentPart> {
        if text.is_empty() {
            Vec::new()
        } else {
            vec![ContentPart::text(text)]
        }
    }

    fn create_stream_parser(&self, _tools: Vec<ToolDefinition>) -> Box<dyn StreamParser> {
        Box::new(NoopStreamParser)
    }

    fn extract_tool_call_segments(
        &self,
        _text: &str,
        _tools: &[ToolDefinition],
    ) -> Option<Vec<ToolCallSegment>> {
        Some(Vec::new())
    }
}

/// Forwards every event unchanged; never recognizes a call boundary.
struct NoopStreamParser;

impl StreamParser for NoopStreamParser {
    fn push(&mut self, event: StreamEvent) -> Vec<StreamEvent> {
        vec![event]
    }

    fn finish(&mut self) -> Vec<StreamEvent> {
        Vec::new()
    }
}
