//! Amazon Bedrock Converse API tool shapes.

use serde_json::Value;

use tb_domain::tool::ToolDefinition;

/// Convert discovered tools into Converse `toolSpec` records; the
/// schema nests under `inputSchema.json`.
pub fn tool_specs(tools: &[ToolDefinition]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            serde_json::json!({
                "toolSpec": {
                    "name": tool.name,
                    "description": tool.description,
                    "inputSchema": { "json": tool.input_schema },
                }
            })
        })
        .collect()
}
