//! `tb-domain` — shared types for the ToolBridge workspace.
//!
//! This crate defines the vocabulary the other crates speak:
//! - [`error::Error`] / [`error::Result`] — the single error type.
//! - [`config::ToolingConfig`] — platform endpoint, auth policy, timeouts.
//! - [`tool::ToolDefinition`] — one callable capability on a remote server.
//! - [`context::ToolingContext`] — per-request identity + token, passed
//!   explicitly instead of living in process-global state.
//! - [`trace::TraceEvent`] — structured trace events emitted via `tracing`.

pub mod config;
pub mod context;
pub mod error;
pub mod telemetry;
pub mod tool;
pub mod trace;

pub use config::{AuthSource, ToolingConfig};
pub use context::ToolingContext;
pub use error::{Error, Result};
pub use tool::ToolDefinition;
