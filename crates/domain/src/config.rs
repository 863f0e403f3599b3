//! Configuration for the tooling subsystem.
//!
//! Every field has a serde default so a partial (or empty) document
//! deserializes to something usable. [`ToolingConfig::from_env`] layers
//! the environment variables the hosting platform sets on top of the
//! defaults, which is how the sample agents are configured in practice.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level tooling config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolingConfig {
    /// Base endpoint of the tool platform. Relative server paths returned
    /// by the configuration service are resolved against this.
    #[serde(default = "d_platform_endpoint")]
    pub platform_endpoint: String,

    /// Authentication policy.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Local manifest used when the configuration service is unreachable
    /// or returns no servers (development fallback).
    #[serde(default = "d_manifest_path")]
    pub manifest_path: PathBuf,

    /// Total per-request budget, milliseconds.
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,

    /// Connect budget, milliseconds.
    #[serde(default = "d_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Additional attempts after the first for `tools/call`.
    #[serde(default = "d_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between retry attempts, milliseconds.
    #[serde(default = "d_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// When true, discovery errors degrade to an empty tool set instead
    /// of propagating (bare-LLM fallback).
    #[serde(default)]
    pub fail_open: bool,

    /// Orchestrator tag included in the User-Agent header
    /// (e.g. "OpenAI", "Claude", "CrewAI").
    #[serde(default = "d_orchestrator")]
    pub orchestrator: String,
}

impl Default for ToolingConfig {
    fn default() -> Self {
        Self {
            platform_endpoint: d_platform_endpoint(),
            auth: AuthConfig::default(),
            manifest_path: d_manifest_path(),
            timeout_ms: d_timeout_ms(),
            connect_timeout_ms: d_connect_timeout_ms(),
            max_retries: d_max_retries(),
            retry_delay_ms: d_retry_delay_ms(),
            fail_open: false,
            orchestrator: d_orchestrator(),
        }
    }
}

impl ToolingConfig {
    /// Build a config from the environment variables the host sets.
    ///
    /// - `MCP_PLATFORM_ENDPOINT` — platform base endpoint override.
    /// - `USE_AGENTIC_AUTH` — `"true"` keeps token exchange first in the
    ///   auth chain; anything else drops exchange entirely.
    /// - `SKIP_TOOLING_ON_ERRORS` — `"true"` enables fail-open degradation.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(endpoint) = std::env::var("MCP_PLATFORM_ENDPOINT") {
            let endpoint = endpoint.trim().to_owned();
            if !endpoint.is_empty() {
                cfg.platform_endpoint = endpoint;
            }
        }

        let use_exchange = std::env::var("USE_AGENTIC_AUTH")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if !use_exchange {
            cfg.auth.order.retain(|s| *s != AuthSource::Exchange);
        }

        cfg.fail_open = std::env::var("SKIP_TOOLING_ON_ERRORS")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        cfg
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Auth
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One step in the token resolution chain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthSource {
    /// Exchange a token against the platform authorization service.
    Exchange,
    /// Static bearer token from the configured environment variable.
    Static,
    /// Empty token; only unauthenticated localhost servers will connect.
    Anonymous,
}

/// Authentication policy for the tooling subsystem.
///
/// The sample agents disagree on fallback priority, so the chain is
/// configuration rather than contract: sources are tried in `order` and
/// the first that yields a token wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token sources, in priority order.
    #[serde(default = "d_auth_order")]
    pub order: Vec<AuthSource>,

    /// Scope requested during token exchange.
    #[serde(default = "d_auth_scope")]
    pub scope: String,

    /// Environment variable holding the static bearer token.
    #[serde(default = "d_bearer_token_env")]
    pub bearer_token_env: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            order: d_auth_order(),
            scope: d_auth_scope(),
            bearer_token_env: d_bearer_token_env(),
        }
    }
}

// ── serde default helpers ──────────────────────────────────────────

fn d_platform_endpoint() -> String {
    "https://tooling.svc.cloud.example".into()
}

fn d_manifest_path() -> PathBuf {
    PathBuf::from("ToolingManifest.json")
}

fn d_timeout_ms() -> u64 {
    30_000
}

fn d_connect_timeout_ms() -> u64 {
    10_000
}

fn d_max_retries() -> u32 {
    2
}

fn d_retry_delay_ms() -> u64 {
    1_000
}

fn d_orchestrator() -> String {
    "generic".into()
}

fn d_auth_order() -> Vec<AuthSource> {
    vec![AuthSource::Exchange, AuthSource::Static, AuthSource::Anonymous]
}

fn d_auth_scope() -> String {
    "api://tooling-platform/.default".into()
}

fn d_bearer_token_env() -> String {
    "BEARER_TOKEN".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg: ToolingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.timeout_ms, 30_000);
        assert_eq!(cfg.connect_timeout_ms, 10_000);
        assert_eq!(cfg.max_retries, 2);
        assert_eq!(cfg.retry_delay_ms, 1_000);
        assert!(!cfg.fail_open);
        assert_eq!(cfg.manifest_path, PathBuf::from("ToolingManifest.json"));
    }

    #[test]
    fn default_auth_chain_is_exchange_static_anonymous() {
        let cfg = ToolingConfig::default();
        assert_eq!(
            cfg.auth.order,
            vec![AuthSource::Exchange, AuthSource::Static, AuthSource::Anonymous]
        );
    }

    #[test]
    fn auth_order_is_configurable() {
        let raw = r#"{ "auth": { "order": ["static", "anonymous"] } }"#;
        let cfg: ToolingConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.auth.order, vec![AuthSource::Static, AuthSource::Anonymous]);
    }

    // One test mutates the real variable names `from_env` reads, so all
    // overlay assertions live in a single case rather than racing each
    // other across threads.
    #[test]
    fn env_overlay_gates_exchange_and_maps_flags() {
        std::env::set_var("MCP_PLATFORM_ENDPOINT", "http://platform.test");
        std::env::set_var("USE_AGENTIC_AUTH", "true");
        std::env::set_var("SKIP_TOOLING_ON_ERRORS", "true");
        let cfg = ToolingConfig::from_env();
        assert_eq!(cfg.platform_endpoint, "http://platform.test");
        assert!(cfg.auth.order.contains(&AuthSource::Exchange));
        assert!(cfg.fail_open);

        std::env::remove_var("MCP_PLATFORM_ENDPOINT");
        std::env::remove_var("USE_AGENTIC_AUTH");
        std::env::remove_var("SKIP_TOOLING_ON_ERRORS");
        let cfg = ToolingConfig::from_env();
        assert_eq!(cfg.platform_endpoint, d_platform_endpoint());
        // Without the agentic-auth opt-in the chain loses exchange but
        // keeps the rest in order.
        assert!(!cfg.auth.order.contains(&AuthSource::Exchange));
        assert_eq!(cfg.auth.order, vec![AuthSource::Static, AuthSource::Anonymous]);
        assert!(!cfg.fail_open);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let raw = r#"{ "max_retries": 5, "fail_open": true }"#;
        let cfg: ToolingConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.max_retries, 5);
        assert!(cfg.fail_open);
        assert_eq!(cfg.timeout_ms, 30_000);
    }
}
