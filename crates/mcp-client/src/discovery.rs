//! Tool-server discovery: configuration service plus manifest fallback.
//!
//! Production asks the platform's configuration service which servers
//! are registered for an agent application id. Local development uses a
//! `ToolingManifest.json` in the working directory. Both sources share
//! one record shape, so a single serde type decodes either.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use tb_domain::config::ToolingConfig;
use tb_domain::error::{Error, Result};

use crate::transport::HttpTransport;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Record shapes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One server record as both the configuration service and the manifest
/// emit it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawServerRecord {
    #[serde(default, rename = "mcpServerName")]
    pub name: Option<String>,
    #[serde(default, rename = "mcpServerUniqueName")]
    pub unique_name: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub audience: String,
}

impl RawServerRecord {
    /// Display name: `mcpServerName` wins over `mcpServerUniqueName`.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.unique_name.as_deref())
            .unwrap_or("unknown")
    }

    /// URL or, failing that, the unique name as a relative server path.
    fn url_or_path(&self) -> &str {
        if !self.url.is_empty() {
            &self.url
        } else {
            self.unique_name.as_deref().unwrap_or(self.display_name())
        }
    }
}

/// The `ToolingManifest.json` document.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ToolingManifest {
    #[serde(default, rename = "mcpServers")]
    pub mcp_servers: Vec<RawServerRecord>,
}

/// A discovered server, URL fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerDescriptor {
    pub name: String,
    pub url: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// URL resolution
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Resolve a server URL or path against the platform endpoint.
///
/// - Full `http(s)` URLs pass through untouched.
/// - `agents/...` paths (with or without leading slash) join the base.
/// - Bare names are assumed to live under `{base}/agents/servers/`.
pub fn resolve_server_url(platform_endpoint: &str, server_path: &str) -> String {
    if server_path.is_empty() {
        return String::new();
    }
    if server_path.starts_with("http://") || server_path.starts_with("https://") {
        return server_path.to_owned();
    }

    let path = server_path.trim_start_matches('/');
    let base = platform_endpoint.trim_end_matches('/');
    if path.starts_with("agents/") {
        format!("{base}/{path}")
    } else {
        format!("{base}/agents/servers/{path}")
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Manifest fallback
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Load server descriptors from the local manifest.
///
/// A missing or unreadable manifest is not an error: this path only
/// exists for local development, so it degrades to an empty list.
pub fn load_manifest_servers(path: &Path) -> Vec<ServerDescriptor> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "tooling manifest not readable");
            return Vec::new();
        }
    };

    let manifest: ToolingManifest = match serde_json::from_str(&raw) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to parse tooling manifest");
            return Vec::new();
        }
    };

    tracing::info!(path = %path.display(), "loaded tooling manifest fallback");
    manifest
        .mcp_servers
        .iter()
        .filter(|record| !record.url.is_empty())
        .map(|record| ServerDescriptor {
            name: record.display_name().to_owned(),
            url: record.url.clone(),
        })
        .collect()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Configuration service
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The service response: either wrapped in `mcpServers` (the manifest
/// shape) or a bare array of records.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListServersResponse {
    Wrapped(ToolingManifest),
    Bare(Vec<RawServerRecord>),
}

impl ListServersResponse {
    fn into_records(self) -> Vec<RawServerRecord> {
        match self {
            ListServersResponse::Wrapped(m) => m.mcp_servers,
            ListServersResponse::Bare(records) => records,
        }
    }
}

/// Client for the platform's tool-server configuration service.
#[derive(Debug, Clone)]
pub struct ConfigurationService {
    transport: HttpTransport,
}

impl ConfigurationService {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// List the tool servers registered for `agent_id`, URLs resolved
    /// against the platform endpoint.
    pub async fn list_tool_servers(
        &self,
        cfg: &ToolingConfig,
        agent_id: &str,
        auth_token: &str,
    ) -> Result<Vec<ServerDescriptor>> {
        let base = cfg.platform_endpoint.trim_end_matches('/');
        let url = format!("{base}/agents/{agent_id}/servers");

        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_owned(), "application/json".to_owned());
        if !auth_token.is_empty() {
            headers.insert("Authorization".to_owned(), format!("Bearer {auth_token}"));
        }

        let body: Value = self.transport.get_json(&url, &headers).await?;
        let response: ListServersResponse = serde_json::from_value(body)
            .map_err(|e| Error::Protocol(format!("malformed server list response: {e}")))?;

        let servers = response
            .into_records()
            .iter()
            .map(|record| {
                let resolved = resolve_server_url(&cfg.platform_endpoint, record.url_or_path());
                ServerDescriptor {
                    name: record.display_name().to_owned(),
                    url: resolved,
                }
            })
            .filter(|descriptor| !descriptor.url.is_empty())
            .collect::<Vec<_>>();

        tracing::info!(agent_id, count = servers.len(), "configuration service listed servers");
        Ok(servers)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://tooling.svc.cloud.example";

    #[test]
    fn full_urls_pass_through() {
        assert_eq!(
            resolve_server_url(BASE, "http://localhost:9000"),
            "http://localhost:9000"
        );
        assert_eq!(
            resolve_server_url(BASE, "https://other.example/mcp"),
            "https://other.example/mcp"
        );
    }

    #[test]
    fn agents_paths_join_the_base() {
        assert_eq!(
            resolve_server_url(BASE, "/agents/servers/mcp_MailTools"),
            format!("{BASE}/agents/servers/mcp_MailTools")
        );
        assert_eq!(
            resolve_server_url(BASE, "agents/servers/mcp_MailTools"),
            format!("{BASE}/agents/servers/mcp_MailTools")
        );
    }

    #[test]
    fn bare_names_land_under_agents_servers() {
        assert_eq!(
            resolve_server_url(BASE, "mcp_MailTools"),
            format!("{BASE}/agents/servers/mcp_MailTools")
        );
    }

    #[test]
    fn trailing_slash_on_base_is_tolerated() {
        assert_eq!(
            resolve_server_url("https://x.example/", "tools"),
            "https://x.example/agents/servers/tools"
        );
    }

    #[test]
    fn empty_path_stays_empty() {
        assert_eq!(resolve_server_url(BASE, ""), "");
    }

    #[test]
    fn record_prefers_server_name_over_unique_name() {
        let raw = r#"{ "mcpServerName": "MailTools", "mcpServerUniqueName": "mcp_MailTools", "url": "x" }"#;
        let record: RawServerRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.display_name(), "MailTools");
    }

    #[test]
    fn record_falls_back_to_unique_name() {
        let raw = r#"{ "mcpServerUniqueName": "mcp_MailTools", "url": "x" }"#;
        let record: RawServerRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.display_name(), "mcp_MailTools");
    }

    #[test]
    fn record_without_names_is_unknown() {
        let record: RawServerRecord = serde_json::from_str(r#"{ "url": "x" }"#).unwrap();
        assert_eq!(record.display_name(), "unknown");
    }

    #[test]
    fn manifest_parses_and_skips_urlless_servers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ToolingManifest.json");
        std::fs::write(
            &path,
            r#"{
                "mcpServers": [
                    { "mcpServerName": "MailTools", "url": "http://localhost:9000", "scope": "s", "audience": "a" },
                    { "mcpServerName": "NoUrl" }
                ]
            }"#,
        )
        .unwrap();

        let servers = load_manifest_servers(&path);
        assert_eq!(
            servers,
            vec![ServerDescriptor {
                name: "MailTools".into(),
                url: "http://localhost:9000".into(),
            }]
        );
    }

    #[test]
    fn missing_manifest_is_empty_not_error() {
        let servers = load_manifest_servers(Path::new("/nonexistent/ToolingManifest.json"));
        assert!(servers.is_empty());
    }

    #[test]
    fn malformed_manifest_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ToolingManifest.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_manifest_servers(&path).is_empty());
    }

    #[test]
    fn wrapped_and_bare_responses_decode() {
        let wrapped: ListServersResponse = serde_json::from_str(
            r#"{ "mcpServers": [{ "mcpServerName": "A", "url": "http://a" }] }"#,
        )
        .unwrap();
        assert_eq!(wrapped.into_records().len(), 1);

        let bare: ListServersResponse =
            serde_json::from_str(r#"[{ "mcpServerName": "A", "url": "http://a" }]"#).unwrap();
        assert_eq!(bare.into_records().len(), 1);
    }
}
