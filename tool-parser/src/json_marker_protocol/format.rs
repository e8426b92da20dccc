//! Outbound formatters for the JSON-in-marker protocol (spec §6
//! "Outbound wire format — JSON-in-marker").

use protocol_types::{OutboundToolCall, ToolOutcome, ToolResponse};
use serde_json::Value;

use super::JsonMarkerOptions;

pub fn format_tool_call(options: &JsonMarkerOptions, call: &OutboundToolCall) -> String {
    let arguments = call.input.clone().into_value();
    let payload = serde_json::json!({ "name": call.name, "arguments": arguments });
    let end = options.tool_call_end.first().map(String::as_str).unwrap_or("");
    format!("{}{}{}", options.tool_call_start, payload, end)
}

pub fn format_tool_response(options: &JsonMarkerOptions, response: &ToolResponse) -> String {
    // Only a plain `Json` outcome stays structured; every other typed
    // outcome collapses to a display string (spec §6).
    let result: Value = match &response.output {
        ToolOutcome::Json(v) => v.clone(),
        other => Value::String(other.display_string()),
    };
    let payload = serde_json::json!({ "toolName": response.tool_name, "result": result });
    format!(
        "{}{}{}",
        options.tool_response_start, payload, options.tool_response_end
    )
}
