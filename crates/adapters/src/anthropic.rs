//! Claude Agent SDK tool shapes.
//!
//! Claude can consume the tools two ways: as inline tool records
//! ([`tool_records`]) or by connecting to the MCP servers itself, in
//! which case it wants the server map ([`http_server_map`]) plus an
//! allow-list of `mcp__<server>__<tool>` names ([`allowed_tool_names`]).

use std::collections::HashMap;

use serde_json::Value;

use tb_domain::tool::ToolDefinition;
use tb_mcp_client::ServerConnection;

/// Inline tool records: `{name, description, input_schema}`.
pub fn tool_records(tools: &[ToolDefinition]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            serde_json::json!({
                "name": tool.name,
                "description": tool.description,
                "input_schema": tool.input_schema,
            })
        })
        .collect()
}

/// Server map in the SDK's `mcp_servers` shape:
/// `{server_name: {"type": "http", "url", "headers"}}`.
pub fn http_server_map(servers: &[ServerConnection]) -> HashMap<String, Value> {
    servers
        .iter()
        .map(|server| {
            (
                server.name.clone(),
                serde_json::json!({
                    "type": "http",
                    "url": server.url,
                    "headers": server.headers,
                }),
            )
        })
        .collect()
}

/// Allow-list using the SDK's `mcp__<server>__<tool>` convention.
pub fn allowed_tool_names(tools: &[ToolDefinition]) -> Vec<String> {
    tools.iter().map(ToolDefinition::prefixed_name).collect()
}
