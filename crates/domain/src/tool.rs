use serde::{Deserialize, Serialize};

/// One callable capability exposed by a remote tool server.
///
/// Created during discovery and immutable thereafter; looked up by name
/// at call time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON-Schema-like mapping describing the tool's arguments.
    pub input_schema: serde_json::Value,
    /// URL of the server that exposes this tool.
    pub server_url: String,
    /// Display name of the server that exposes this tool.
    pub server_name: String,
}

impl ToolDefinition {
    /// The `mcp__<server>__<tool>` form some SDKs use for allow-listing.
    pub fn prefixed_name(&self) -> String {
        format!("mcp__{}__{}", self.server_name, self.name)
    }
}
