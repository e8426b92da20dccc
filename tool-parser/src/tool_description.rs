//! Shared `formatTools` implementation (spec §6): a JSON-encoded
//! `{name, description, parameters}` per tool. Identical across
//! protocols — only the surrounding template text differs, and that is
//! the caller's concern (spec §6 "System-prompt template
//! (collaborator)").

use protocol_types::ToolDefinition;

pub fn describe_tools_json(tools: &[ToolDefinition]) -> String {
    let described: Vec<serde_json::Value> = tools
        .iter()
        .map(|t| {
            serde_json::json!({
                "name": t.name,
                "description": t.description,
                "parameters": t.input_schema,
            })
        })
        .collect();
    serde_json::to_string(&described).unwrap_or_else(|_| "[]".to_string())
}
