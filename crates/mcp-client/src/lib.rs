//! `tb-mcp-client` — MCP tool discovery and invocation client.
//!
//! One canonical implementation of the pattern the hosted agent samples
//! each carried a private copy of: discover tool servers for an agent
//! (configuration service, with a local manifest fallback), connect to
//! each over Streamable HTTP, list their tools, and execute named tools
//! via JSON-RPC with bounded retry.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tb_domain::{ToolingConfig, ToolingContext};
//! use tb_mcp_client::ToolRegistry;
//!
//! let mut registry = ToolRegistry::new(ToolingConfig::from_env())?;
//! let ctx = ToolingContext::new("mail-agent", "contoso");
//!
//! let tools = registry.discover_and_connect(&ctx).await?;
//! for tool in &tools {
//!     println!("{} ({})", tool.name, tool.server_name);
//! }
//!
//! let result = registry
//!     .call_tool("send_email", serde_json::json!({"to": "a@b.com", "body": "hi"}))
//!     .await?;
//! ```

pub mod auth;
pub mod discovery;
pub mod protocol;
pub mod registry;
pub mod sse;
pub mod transport;

// Re-exports for convenience.
pub use auth::{TokenCache, TokenExchanger, TokenResolution, TokenSource};
pub use discovery::{ConfigurationService, ServerDescriptor};
pub use registry::{ServerConnection, ToolRegistry};
pub use transport::{HttpTransport, TransportError};
