//! Tool registry — owns server connections and the tool index, and
//! orchestrates the discover → connect → list → call lifecycle.
//!
//! One registry serves one hosted agent. State is rebuilt on every
//! discovery pass (the hosting platform runs one pass per conversation
//! turn); nothing persists across process restarts.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

use tb_domain::config::ToolingConfig;
use tb_domain::context::ToolingContext;
use tb_domain::error::{Error, Result};
use tb_domain::tool::ToolDefinition;
use tb_domain::trace::TraceEvent;

use crate::auth::{self, TokenCache, TokenExchanger};
use crate::discovery::{load_manifest_servers, ConfigurationService};
use crate::protocol::{self, JsonRpcRequest, ToolsListResult};
use crate::transport::{HttpTransport, TransportError};

/// How many tool names an unknown-tool error samples.
const MAX_REPORTED_TOOL_NAMES: usize = 10;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ServerConnection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One successfully contacted remote tool server, held for the lifetime
/// of a discovery pass.
#[derive(Debug, Clone)]
pub struct ServerConnection {
    pub name: String,
    pub url: String,
    /// Request headers used for every call to this server.
    pub headers: HashMap<String, String>,
    /// Tools listed by the server, in listing order.
    pub tools: Vec<ToolDefinition>,
    pub connected: bool,
}

fn is_local_url(url: &str) -> bool {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h == "localhost" || h == "127.0.0.1"))
        .unwrap_or(false)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ToolRegistry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Discovery and invocation client for MCP tool servers.
pub struct ToolRegistry {
    cfg: ToolingConfig,
    transport: HttpTransport,
    config_service: ConfigurationService,
    exchanger: Option<Arc<dyn TokenExchanger>>,
    token_cache: TokenCache,
    connected_servers: Vec<ServerConnection>,
    tools_by_name: HashMap<String, ToolDefinition>,
}

impl ToolRegistry {
    pub fn new(cfg: ToolingConfig) -> Result<Self> {
        let transport = HttpTransport::new(&cfg)?;
        let config_service = ConfigurationService::new(transport.clone());
        Ok(Self {
            cfg,
            transport,
            config_service,
            exchanger: None,
            token_cache: TokenCache::new(),
            connected_servers: Vec::new(),
            tools_by_name: HashMap::new(),
        })
    }

    /// Wire a token exchanger for the `Exchange` auth source.
    pub fn with_exchanger(mut self, exchanger: Arc<dyn TokenExchanger>) -> Self {
        self.exchanger = Some(exchanger);
        self
    }

    // ── discovery ────────────────────────────────────────────────────

    /// Discover servers for the context's agent, connect to each, and
    /// return every tool that listed successfully.
    ///
    /// Per-server failures are logged and skipped; total exhaustion of
    /// both the configuration service and the manifest fallback yields
    /// `Ok(vec![])`. The one hard failure is the configuration service
    /// rejecting our credentials: that is a deployment problem the
    /// manifest must not paper over, so it propagates (or degrades via
    /// [`Self::discover_or_degrade`]).
    pub async fn discover_and_connect(
        &mut self,
        ctx: &ToolingContext,
    ) -> Result<Vec<ToolDefinition>> {
        self.connected_servers.clear();
        self.tools_by_name.clear();

        let resolution = auth::resolve_token(
            &self.cfg.auth,
            ctx,
            self.exchanger.as_deref(),
            &self.token_cache,
        )
        .await;
        tracing::info!(
            agent_id = %ctx.agent_id,
            token_source = resolution.source.as_str(),
            "discovering tool servers"
        );

        let mut from_manifest = false;
        let descriptors = match self
            .config_service
            .list_tool_servers(&self.cfg, &ctx.agent_id, &resolution.token)
            .await
        {
            Ok(servers) if !servers.is_empty() => servers,
            Ok(_) => {
                tracing::info!("configuration service returned no servers, trying manifest");
                from_manifest = true;
                load_manifest_servers(&self.cfg.manifest_path)
            }
            Err(e @ Error::Auth(_)) => {
                tracing::error!(error = %e, "configuration service rejected credentials");
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(error = %e, "configuration service failed, trying manifest");
                from_manifest = true;
                load_manifest_servers(&self.cfg.manifest_path)
            }
        };

        let mut all_tools = Vec::new();
        for descriptor in &descriptors {
            let Some(connection) = self
                .connect_server(&descriptor.name, &descriptor.url, &resolution.token)
                .await
            else {
                continue;
            };

            // Last listing wins on a name collision; no conflict check.
            for tool in &connection.tools {
                self.tools_by_name.insert(tool.name.clone(), tool.clone());
            }
            all_tools.extend(connection.tools.iter().cloned());

            TraceEvent::ServerConnected {
                server: connection.name.clone(),
                url: connection.url.clone(),
                tool_count: connection.tools.len(),
            }
            .emit();
            self.connected_servers.push(connection);
        }

        TraceEvent::DiscoveryCompleted {
            servers: self.connected_servers.len(),
            tools: all_tools.len(),
            from_manifest,
        }
        .emit();
        Ok(all_tools)
    }

    /// [`Self::discover_and_connect`] with the fail-open policy applied:
    /// any error degrades to an empty tool set (bare-LLM fallback) when
    /// `fail_open` is set, and propagates otherwise.
    pub async fn discover_or_degrade(
        &mut self,
        ctx: &ToolingContext,
    ) -> Result<Vec<ToolDefinition>> {
        match self.discover_and_connect(ctx).await {
            Ok(tools) => Ok(tools),
            Err(e) if self.cfg.fail_open => {
                tracing::error!(error = %e, "tooling discovery failed, degrading to bare LLM");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    // ── connection ───────────────────────────────────────────────────

    /// Build per-server headers, or `None` when the server must be
    /// skipped (remote endpoint without a token).
    fn build_headers(&self, url: &str, token: &str) -> Option<HashMap<String, String>> {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_owned(), "application/json".to_owned());
        headers.insert(
            "User-Agent".to_owned(),
            format!(
                "ToolBridge/{} ({})",
                env!("CARGO_PKG_VERSION"),
                self.cfg.orchestrator
            ),
        );

        if is_local_url(url) {
            // Local trust: only Authorization is dropped for localhost.
            return Some(headers);
        }
        if token.is_empty() {
            return None;
        }

        headers.insert("Authorization".to_owned(), format!("Bearer {token}"));
        Some(headers)
    }

    /// Connect to one server. Listing its tools doubles as the liveness
    /// probe; any failure is logged and surfaces as `None`.
    async fn connect_server(
        &self,
        name: &str,
        url: &str,
        token: &str,
    ) -> Option<ServerConnection> {
        let Some(headers) = self.build_headers(url, token) else {
            tracing::warn!(server = name, url, "skipping remote server without auth token");
            TraceEvent::ServerSkipped {
                server: name.to_owned(),
                reason: "no auth token for remote server".into(),
            }
            .emit();
            return None;
        };

        match self.list_server_tools(url, &headers, name).await {
            Ok(tools) => {
                tracing::info!(server = name, tool_count = tools.len(), "connected to tool server");
                Some(ServerConnection {
                    name: name.to_owned(),
                    url: url.to_owned(),
                    headers,
                    tools,
                    connected: true,
                })
            }
            Err(e) => {
                tracing::warn!(server = name, url, error = %e, "failed to connect to tool server");
                TraceEvent::ServerSkipped {
                    server: name.to_owned(),
                    reason: e.to_string(),
                }
                .emit();
                None
            }
        }
    }

    /// `tools/list` against one server. Single attempt: listing is the
    /// liveness probe, so a dead server is reported, not retried.
    async fn list_server_tools(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        server_name: &str,
    ) -> Result<Vec<ToolDefinition>> {
        let result = self
            .transport
            .rpc_request(url, headers, &JsonRpcRequest::tools_list())
            .await
            .map_err(Error::from)?;

        let listed: ToolsListResult = serde_json::from_value(result)
            .map_err(|e| Error::Protocol(format!("malformed tools/list result: {e}")))?;

        Ok(listed
            .tools
            .into_iter()
            .map(|tool| ToolDefinition {
                name: tool.name,
                description: tool.description,
                input_schema: tool.input_schema,
                server_url: url.to_owned(),
                server_name: server_name.to_owned(),
            })
            .collect())
    }

    // ── invocation ───────────────────────────────────────────────────

    /// Execute a discovered tool and return its text result.
    ///
    /// An unknown name fails locally, before any network traffic.
    /// Transient failures (502/503/504, timeouts, connection errors)
    /// are retried up to `max_retries` extra attempts with a fixed
    /// delay; everything else fails on the first attempt.
    pub async fn call_tool(&self, tool_name: &str, arguments: Value) -> Result<String> {
        let Some(tool) = self.tools_by_name.get(tool_name) else {
            let mut available: Vec<String> = self.tools_by_name.keys().cloned().collect();
            available.sort();
            available.truncate(MAX_REPORTED_TOOL_NAMES);
            return Err(Error::ToolNotFound {
                name: tool_name.to_owned(),
                available,
            });
        };

        let connection = self
            .connected_servers
            .iter()
            .find(|c| c.url == tool.server_url)
            .ok_or_else(|| {
                Error::Other(format!("no connection held for tool '{tool_name}'"))
            })?;

        tracing::info!(
            tool = tool_name,
            server = %connection.name,
            "calling MCP tool"
        );

        let start = Instant::now();
        let mut last_err: Option<TransportError> = None;
        let mut attempts = 0u32;

        for attempt in 0..=self.cfg.max_retries {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(self.cfg.retry_delay_ms)).await;
            }
            attempts = attempt + 1;

            let request = JsonRpcRequest::tools_call(tool_name, arguments.clone());
            match self
                .transport
                .rpc_request(&connection.url, &connection.headers, &request)
                .await
            {
                Ok(result) => {
                    TraceEvent::ToolCall {
                        tool: tool_name.to_owned(),
                        server: connection.name.clone(),
                        status: 200,
                        duration_ms: start.elapsed().as_millis() as u64,
                        attempts,
                    }
                    .emit();
                    return Ok(protocol::extract_call_text(&result));
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(
                        tool = tool_name,
                        attempt = attempts,
                        error = %e,
                        "transient tool call failure"
                    );
                    last_err = Some(e);
                }
                Err(e) => {
                    TraceEvent::ToolCall {
                        tool: tool_name.to_owned(),
                        server: connection.name.clone(),
                        status: e.status(),
                        duration_ms: start.elapsed().as_millis() as u64,
                        attempts,
                    }
                    .emit();
                    return Err(e.into());
                }
            }
        }

        let err = last_err
            .map(Error::from)
            .unwrap_or_else(|| Error::Other(format!("tool call '{tool_name}' failed")));
        TraceEvent::ToolCall {
            tool: tool_name.to_owned(),
            server: connection.name.clone(),
            status: 0,
            duration_ms: start.elapsed().as_millis() as u64,
            attempts,
        }
        .emit();
        tracing::error!(tool = tool_name, attempts, error = %err, "tool call exhausted retries");
        Err(err)
    }

    // ── introspection ────────────────────────────────────────────────

    /// All connected servers from the last discovery pass.
    pub fn servers(&self) -> &[ServerConnection] {
        &self.connected_servers
    }

    /// Names of every indexed tool.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools_by_name.keys().cloned().collect()
    }

    /// Look up one tool by name.
    pub fn tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools_by_name.get(name)
    }

    /// Number of indexed tools.
    pub fn tool_count(&self) -> usize {
        self.tools_by_name.len()
    }

    /// Drop all connections and the tool index.
    pub fn reset(&mut self) {
        self.connected_servers.clear();
        self.tools_by_name.clear();
        self.token_cache.clear();
        tracing::info!("tool registry reset");
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
