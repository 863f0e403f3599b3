//! `tb-adapters` — per-SDK tool-shape adapters.
//!
//! Pure data transformations from discovered [`tb_domain::ToolDefinition`]s
//! (and, where an SDK wants server endpoints rather than tool records,
//! [`tb_mcp_client::ServerConnection`]s) into each LLM SDK's native
//! tool-calling format. No I/O, no logic beyond field mapping; the
//! discovery/invocation client stays SDK-agnostic.

pub mod anthropic;
pub mod bedrock;
pub mod crewai;
pub mod google;
pub mod openai;
