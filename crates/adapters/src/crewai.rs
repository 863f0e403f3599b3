//! CrewAI tool shapes.
//!
//! CrewAI takes server endpoints rather than individual tool records
//! and connects to them itself over SSE.

use serde_json::Value;

use tb_mcp_client::ServerConnection;

/// Server descriptors in CrewAI's expected format.
pub fn server_descriptors(servers: &[ServerConnection]) -> Vec<Value> {
    servers
        .iter()
        .map(|server| {
            serde_json::json!({
                "id": server.name,
                "transport": "sse",
                "options": {
                    "url": server.url,
                    "headers": server.headers,
                },
            })
        })
        .collect()
}
