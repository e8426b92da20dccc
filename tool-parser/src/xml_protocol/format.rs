//! Outbound formatters for the XML protocol (spec §4.1 "Formatting
//! (outbound)", §6 "Outbound wire format — XML protocol").

use protocol_types::{OutboundToolCall, ToolOutcome, ToolResponse};
use serde_json::{Map, Value};

fn scalar_to_text(v: &Value) -> String {
    match v {
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Render one `key: value` pair as zero or more sibling elements named
/// `key` (spec §4.1: "arrays of scalars emit repeated siblings").
fn render_into(out: &mut String, key: &str, value: &Value) {
    match value {
        Value::Array(items) => {
            for item in items {
                render_into(out, key, item);
            }
        }
        Value::Object(map) => {
            out.push('<');
            out.push_str(key);
            out.push('>');
            render_children(out, map);
            out.push_str("</");
            out.push_str(key);
            out.push('>');
        }
        Value::String(s) => {
            // Strings are emitted raw: no XML-escaping of their content
            // (spec §4.1: "without XML-escaping... when the schema says
            // type: string").
            out.push('<');
            out.push_str(key);
            out.push('>');
            out.push_str(s);
            out.push_str("</");
            out.push_str(key);
            out.push('>');
        }
        other => {
            out.push('<');
            out.push_str(key);
            out.push('>');
            out.push_str(&scalar_to_text(other));
            out.push_str("</");
            out.push_str(key);
            out.push('>');
        }
    }
}

fn render_children(out: &mut String, map: &Map<String, Value>) {
    for (key, value) in map {
        render_into(out, key, value);
    }
}

pub fn format_tool_call(call: &OutboundToolCall) -> String {
    let value = call.input.clone().into_value();
    let mut children = String::new();
    match &value {
        Value::Object(map) => render_children(&mut children, map),
        other => children.push_str(&scalar_to_text(other)),
    }
    format!("<{name}>{children}</{name}>", name = call.name)
}

fn result_raw_string(output: &ToolOutcome) -> String {
    match output {
        ToolOutcome::Json(v) | ToolOutcome::ErrorJson(v) => v.to_string(),
        other => other.display_string(),
    }
}

pub fn format_tool_response(response: &ToolResponse) -> String {
    let escaped_name = quick_xml::escape::escape(&response.tool_name);
    let raw_result = result_raw_string(&response.output);
    let escaped_result = quick_xml::escape::escape(&raw_result);
    format!(
        "<tool_response><tool_name>{escaped_name}</tool_name><result>{escaped_result}</result></tool_response>"
    )
}
