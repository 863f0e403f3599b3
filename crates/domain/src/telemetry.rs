//! Tracing subscriber setup for hosts that embed the tooling client.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install a JSON-formatted tracing subscriber.
///
/// Honors `RUST_LOG`; defaults to `info` with debug output from the
/// ToolBridge crates. Returns an error string if a global subscriber is
/// already installed (common in tests), which callers may ignore.
pub fn init_tracing() -> Result<(), String> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tb_mcp_client=debug,tb_domain=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .map_err(|e| e.to_string())
}
