//! Google ADK tool shapes.

use serde_json::Value;

use tb_domain::tool::ToolDefinition;

/// Convert discovered tools into ADK function declarations.
pub fn function_declarations(tools: &[ToolDefinition]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            serde_json::json!({
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.input_schema,
            })
        })
        .collect()
}
