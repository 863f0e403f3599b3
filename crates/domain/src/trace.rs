use serde::Serialize;

/// Structured trace events emitted across all ToolBridge crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    TokenResolved {
        source: String,
        cache_hit: bool,
    },
    ServerConnected {
        server: String,
        url: String,
        tool_count: usize,
    },
    ServerSkipped {
        server: String,
        reason: String,
    },
    DiscoveryCompleted {
        servers: usize,
        tools: usize,
        from_manifest: bool,
    },
    ToolCall {
        tool: String,
        server: String,
        status: u16,
        duration_ms: u64,
        attempts: u32,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "tb_event");
    }
}
