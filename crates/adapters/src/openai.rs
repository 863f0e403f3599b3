//! OpenAI Agents SDK tool shapes.

use serde_json::Value;

use tb_domain::tool::ToolDefinition;

/// Convert discovered tools into OpenAI function-tool records.
///
/// The input schema passes through untouched as `parameters`.
pub fn function_tools(tools: &[ToolDefinition]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            serde_json::json!({
                "type": "function",
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.input_schema,
            })
        })
        .collect()
}
