//! Per-request identity carried through the tooling subsystem.
//!
//! The context replaces the module-level token caches and singleton
//! clients the original samples leaned on: everything a request needs
//! travels with it, so concurrent conversations cannot leak state into
//! each other.

use serde::{Deserialize, Serialize};

/// Identity and credentials for one discovery/invocation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolingContext {
    /// The agent application id servers are registered under.
    pub agent_id: String,
    /// Tenant the conversation belongs to.
    pub tenant_id: String,
    /// Pre-resolved auth token, if the host already has one. When unset
    /// the client walks the configured auth chain instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl ToolingContext {
    pub fn new(agent_id: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            tenant_id: tenant_id.into(),
            auth_token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Cache key for exchanged tokens, matching the `agent:tenant` format
    /// the platform uses.
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.agent_id, self.tenant_id)
    }
}
