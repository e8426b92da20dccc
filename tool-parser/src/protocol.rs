//! The protocol abstraction (spec §9 "Dynamic dispatch"): a capability
//! set realized as a trait, with two concrete implementations (XML-like,
//! JSON-in-marker) plus a pass-through no-op used for testing.

use protocol_types::{ContentPart, OutboundToolCall, StreamEvent, ToolDefinition, ToolResponse};

use crate::debug::OnError;

/// The `(toolName, start, end)` range of one detected tool-call region,
/// without running it through the repair pipeline (spec §9
/// "extractToolCallSegments capability").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallSegment {
    pub tool_name: String,
    pub start: usize,
    pub end: usize,
}

/// One protocol's encoder/decoder pair (spec §9): `formatTools`,
/// `formatToolCall`, `formatToolResponse`, `parseGeneratedText`,
/// `createStreamParser`, and the optional `extractToolCallSegments`.
pub trait ToolCallProtocol: Send + Sync {
    /// A JSON-encoded `{name, description, parameters}` per tool (spec
    /// §6): the caller wraps this in its own template text.
    fn format_tools(&self, tools: &[ToolDefinition]) -> String;

    /// Render one outbound tool call in this protocol's wire format
    /// (spec §4.1/§4.2 "Formatting (outbound)").
    fn format_tool_call(&self, call: &OutboundToolCall) -> String;

    /// Render one outbound tool response in this protocol's wire format.
    fn format_tool_response(&self, response: &ToolResponse) -> String;

    /// Batch-parse a complete generated string into content parts (spec
    /// §4.1/§4.2 "Batch contract"). Recoverable faults are reported
    /// through `on_error` and surface as `Text` parts, never as `Err`.
    fn parse_generated_text(
        &self,
        text: &str,
        tools: &[ToolDefinition],
        on_error: &OnError,
    ) -> Vec<ContentPart>;

    /// Create a fresh, single-use incremental stream parser over `tools`
    /// (spec §4.1/§4.2 "Stream contract").
    fn create_stream_parser(&self, tools: Vec<ToolDefinition>) -> Box<dyn StreamParser>;

    /// Locate tool-call regions without running the repair pipeline.
    /// `None` means this protocol doesn't support cheap extraction;
    /// implementors that do should return `Some` even when the text has
    /// no matches (an empty `Vec`).
    fn extract_tool_call_segments(
        &self,
        _text: &str,
        _tools: &[ToolDefinition],
    ) -> Option<Vec<ToolCallSegment>> {
        None
    }
}

/// The incremental stream parser contract (spec §5 "Scheduling model",
/// §9 "Stream cooperation"): a single-threaded, synchronous
/// `push`/`finish` pair, standing in for the transform-stream primitive
/// languages with a native one would expose instead.
///
/// Every call is synchronous and emits zero or more events immediately;
/// there is no internal suspension, timer, or background work (spec
/// §5). A fresh instance is required per input stream.
pub trait StreamParser: Send {
    /// Feed one host event and return zero or more output events (spec
    /// §5 "transform(event, emit)").
    fn push(&mut self, event: StreamEvent) -> Vec<StreamEvent>;

    /// Called exactly once when the input stream closes (spec §5
    /// "flush(emit)"): flushes any open text region and turns an
    /// in-flight, unterminated tool call back into text (spec §7
    /// "Incomplete stream").
    fn finish(&mut self) -> Vec<StreamEvent>;
}
