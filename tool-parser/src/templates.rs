//! System-prompt template producers (SPEC_FULL.md "Supplemented
//! features"): three reference text producers for announcing available
//! tools to a model. Pure text generation, no parsing or coercion — the
//! counterpart `parse_generated_text`/`create_stream_parser` of each
//! matching protocol is what actually reads the model's response back.

use protocol_types::ToolDefinition;

use crate::tool_description::describe_tools_json;

/// XML-style system prompt: announces tools as a JSON array and tells
/// the model to call them as `<name>{...}</name>`, matching
/// [`crate::xml_protocol::XmlProtocol`]'s wire format.
pub fn xml_style_system_prompt(tools: &[ToolDefinition]) -> String {
    format!(
        "You have access to the following tools:\n{}\n\n\
         To call a tool, respond with a tag named after the tool, with one \
         child element per argument, e.g. <get_weather><location>Seoul</location></get_weather>.\n\
         You may call a tool zero or more times and mix tool calls freely with \
         regular text.",
        describe_tools_json(tools)
    )
}

/// Hermes-style system prompt: wraps each call in `<tool_call>` /
/// `</tool_call>` markers around a relaxed-JSON `{name, arguments}`
/// payload, matching [`crate::json_marker_protocol::JsonMarkerProtocol`]'s
/// default markers.
pub fn hermes_style_system_prompt(tools: &[ToolDefinition]) -> String {
    format!(
        "You have access to the following functions:\n{}\n\n\
         To call a function, wrap a JSON object with \"name\" and \"arguments\" \
         keys inside <tool_call></tool_call> tags, e.g.\n\
         <tool_call>\n{{\"name\": \"get_weather\", \"arguments\": {{\"location\": \"Seoul\"}}}}\n</tool_call>",
        describe_tools_json(tools)
    )
}

/// Gemma-style system prompt: the same JSON-in-marker payload shape as
/// Hermes but fenced inside a \`\`\`tool_call code block instead of
/// angle-bracket markers, for hosts that configure
/// [`crate::json_marker_protocol::JsonMarkerOptions`] with fence markers.
pub fn gemma_style_system_prompt(tools: &[ToolDefinition]) -> String {
    format!(
        "You have these tools available:\n{}\n\n\
         When you need to call one, emit a fenced block:\n\
         ```tool_call\n{{\"name\": \"get_weather\", \"arguments\": {{\"location\": \"Seoul\"}}}}\n```",
        describe_tools_json(tools)
    )
}
