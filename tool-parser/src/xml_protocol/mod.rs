//! The XML-like tool-call protocol (spec §4.1): `<name>{children}</name>`
//! tool calls embedded in otherwise free-form model text.

mod format;
mod stream;

pub use stream::XmlStreamParser;

use protocol_types::{ContentPart, JsonSchemaLike, OutboundToolCall, ToolDefinition, ToolResponse};

use crate::debug::OnError;
use crate::heuristics::{self, default_pipeline_config};
use crate::id::{CounterIdGenerator, IdGenerator};
use crate::protocol::{StreamParser, ToolCallProtocol, ToolCallSegment};
use crate::types::{IntermediateCall, PipelineConfig};
use crate::xml_walk::{find_balanced_close, find_next_open_tag};

/// Construction-time options for [`XmlProtocol`] (spec §3 "Protocol
/// options", XML case): extra heuristics merged into the default
/// pipeline by phase, or a full replacement pipeline, plus the reparse
/// ceiling.
#[derive(Clone, Default)]
pub struct XmlProtocolOptions {
    pub extra_heuristics: Vec<crate::types::HeuristicRef>,
    pub pipeline: Option<PipelineConfig>,
    pub max_reparses: Option<usize>,
}

/// The XML-like protocol: batch parser, streaming state machine, and
/// formatters, all sharing one heuristic pipeline configuration (spec
/// §2 "XML tool-call protocol").
pub struct XmlProtocol {
    pipeline: PipelineConfig,
}

impl XmlProtocol {
    pub fn new() -> Self {
        Self {
            pipeline: default_pipeline_config(),
        }
    }

    pub fn with_options(options: XmlProtocolOptions) -> Self {
        let mut pipeline = options.pipeline.unwrap_or_else(default_pipeline_config);
        pipeline.merge_heuristics(options.extra_heuristics);
        if let Some(max) = options.max_reparses {
            pipeline.max_reparses = max;
        }
        Self { pipeline }
    }
}

impl Default for XmlProtocol {
    fn default() -> Self {
        Self::new()
    }
}

fn tool_schema<'a>(tools: &'a [ToolDefinition], name: &str) -> &'a JsonSchemaLike {
    static EMPTY: std::sync::OnceLock<JsonSchemaLike> = std::sync::OnceLock::new();
    tools
        .iter()
        .find(|t| t.name == name)
        .map(|t| &t.input_schema)
        .unwrap_or_else(|| EMPTY.get_or_init(JsonSchemaLike::default))
}

/// Find the next top-level tool-call region starting at or after `pos`
/// (spec §4.1 "Tag scanning algorithm"). Returns `None` once no more
/// declared tool name opens anywhere in the rest of `text`.
///
/// `Some((name, schema, start, content_range, end))` where
/// `content_range` is `None` for a self-closing match.
#[allow(clippy::type_complexity)]
fn next_candidate<'a>(
    text: &str,
    pos: usize,
    tools: &'a [ToolDefinition],
    names: &[&str],
) -> Option<(String, &'a JsonSchemaLike, usize, Option<(usize, usize)>, usize)> {
    let open = find_next_open_tag(text, pos, Some(names))?;
    let schema = tool_schema(tools, &open.name);
    if open.self_closing {
        return Some((open.name, schema, open.start, None, open.tag_end));
    }
    match find_balanced_close(text, &open.name, open.tag_end) {
        Some((content_end, after)) => Some((
            open.name.clone(),
            schema,
            open.start,
            Some((open.tag_end, content_end)),
            after,
        )),
        // Unterminated: not a tool call. Caller should resume scanning
        // just past this tag's start so the `<` isn't re-matched forever.
        None => next_candidate(text, open.start + 1, tools, names),
    }
}

impl ToolCallProtocol for XmlProtocol {
    fn format_tools(&self, tools: &[ToolDefinition]) -> String {
        crate::tool_description::describe_tools_json(tools)
    }

    fn format_tool_call(&self, call: &OutboundToolCall) -> String {
        format::format_tool_call(call)
    }

    fn format_tool_response(&self, response: &ToolResponse) -> String {
        format::format_tool_response(response)
    }

    fn parse_generated_text(
        &self,
        text: &str,
        tools: &[ToolDefinition],
        on_error: &OnError,
    ) -> Vec<ContentPart> {
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).filter(|n| !n.is_empty()).collect();
        if names.is_empty() {
            return vec![ContentPart::text(text)];
        }

        let id_gen = CounterIdGenerator::default();
        let mut parts = Vec::new();
        let mut text_start = 0usize;
        let mut pos = 0usize;

        while let Some((name, schema, start, content_range, end)) = next_candidate(text, pos, tools, &names) {
            match content_range {
                None => {
                    if start > text_start {
                        parts.push(ContentPart::text(&text[text_start..start]));
                    }
                    parts.push(ContentPart::tool_call(id_gen.next_id(), name, "{}"));
                    pos = end;
                    text_start = end;
                }
                Some((inner_start, inner_end)) => {
                    let raw_inner = &text[inner_start..inner_end];
                    let ctx = IntermediateCall::new(name.clone(), schema.clone(), raw_inner);
                    let result = heuristics::run_pipeline(&self.pipeline, ctx);
                    if let Some(parsed) = &result.parsed {
                        if start > text_start {
                            parts.push(ContentPart::text(&text[text_start..start]));
                        }
                        let input = serde_json::to_string(parsed).unwrap_or_else(|_| "{}".to_string());
                        parts.push(ContentPart::tool_call(id_gen.next_id(), name, input));
                        pos = end;
                        text_start = end;
                    } else {
                        on_error(
                            "could not process tool call, keeping original text",
                            serde_json::json!({ "tool": name, "errors": result.errors }),
                        );
                        // Leave the span as unflushed text; it joins the
                        // surrounding run and is emitted at the next cut
                        // (or at the final flush).
                        pos = end;
                    }
                }
            }
        }

        if text_start < text.len() {
            parts.push(ContentPart::text(&text[text_start..]));
        }
        parts
    }

    fn create_stream_parser(&self, tools: Vec<ToolDefinition>) -> Box<dyn StreamParser> {
        Box::new(XmlStreamParser::new(tools, self.pipeline.clone()))
    }

    fn extract_tool_call_segments(
        &self,
        text: &str,
        tools: &[ToolDefinition],
    ) -> Option<Vec<ToolCallSegment>> {
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).filter(|n| !n.is_empty()).collect();
        if names.is_empty() {
            return Some(Vec::new());
        }
        let mut segments = Vec::new();
        let mut pos = 0usize;
        while let Some((name, _schema, start, _content_range, end)) = next_candidate(text, pos, tools, &names) {
            segments.push(ToolCallSegment { tool_name: name, start, end });
            pos = end;
        }
        Some(segments)
    }
}
