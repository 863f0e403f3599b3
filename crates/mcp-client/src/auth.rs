//! Token resolution for the tooling platform.
//!
//! The samples this replaces disagreed about fallback priority, so the
//! chain is driven by `AuthConfig::order` rather than hard-coded:
//! each [`AuthSource`] is tried in turn and the first that yields a
//! token wins. An exhausted chain degrades to an empty token, which
//! still permits unauthenticated localhost servers.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use tb_domain::config::{AuthConfig, AuthSource};
use tb_domain::context::ToolingContext;
use tb_domain::error::Result;
use tb_domain::trace::TraceEvent;

/// Placeholder values the static-token env var must not carry.
const PLACEHOLDER_TOKENS: &[&str] = &["", "your_bearer_token_here"];

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Exchanger seam
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Exchanges an agent identity for a platform access token.
///
/// Production wires the platform's authorization service here; tests
/// use a stub.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    async fn exchange(&self, ctx: &ToolingContext, scope: &str) -> Result<String>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Token cache
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Cache of exchanged tokens keyed `"{agent_id}:{tenant_id}"`.
///
/// Owned by the registry instance, never process-global, so two hosted
/// agents in one process cannot see each other's tokens.
#[derive(Debug, Default)]
pub struct TokenCache {
    exchanged: Mutex<HashMap<String, String>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, token: &str) {
        self.exchanged.lock().insert(key.to_owned(), token.to_owned());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.exchanged.lock().get(key).cloned()
    }

    pub fn clear(&self) {
        self.exchanged.lock().clear();
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Resolution
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where the resolved token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// The caller supplied it on the context.
    Context,
    Exchange,
    Static,
    Anonymous,
}

impl TokenSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenSource::Context => "context",
            TokenSource::Exchange => "exchange",
            TokenSource::Static => "static",
            TokenSource::Anonymous => "anonymous",
        }
    }
}

/// The outcome of walking the auth chain.
#[derive(Debug, Clone)]
pub struct TokenResolution {
    /// May be empty (anonymous); callers treat an empty token as
    /// localhost-only.
    pub token: String,
    pub source: TokenSource,
}

/// Walk the configured auth chain and produce a token.
///
/// A token already present on the context short-circuits the chain.
/// Exchange failures log a warning and fall through to the next source.
pub async fn resolve_token(
    auth: &AuthConfig,
    ctx: &ToolingContext,
    exchanger: Option<&dyn TokenExchanger>,
    cache: &TokenCache,
) -> TokenResolution {
    if let Some(ref token) = ctx.auth_token {
        if !token.is_empty() {
            return TokenResolution {
                token: token.clone(),
                source: TokenSource::Context,
            };
        }
    }

    for source in &auth.order {
        match source {
            AuthSource::Exchange => {
                let key = ctx.cache_key();
                if let Some(token) = cache.get(&key) {
                    TraceEvent::TokenResolved { source: "exchange".into(), cache_hit: true }
                        .emit();
                    return TokenResolution { token, source: TokenSource::Exchange };
                }
                let Some(exchanger) = exchanger else {
                    tracing::debug!("no token exchanger wired, skipping exchange");
                    continue;
                };
                match exchanger.exchange(ctx, &auth.scope).await {
                    Ok(token) if !token.is_empty() => {
                        cache.insert(&key, &token);
                        TraceEvent::TokenResolved { source: "exchange".into(), cache_hit: false }
                            .emit();
                        return TokenResolution { token, source: TokenSource::Exchange };
                    }
                    Ok(_) => {
                        tracing::warn!("token exchange returned an empty token");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "token exchange failed, trying next source");
                    }
                }
            }
            AuthSource::Static => {
                if let Ok(token) = std::env::var(&auth.bearer_token_env) {
                    if !PLACEHOLDER_TOKENS.contains(&token.as_str()) {
                        tracing::info!(
                            env_var = %auth.bearer_token_env,
                            "using static bearer token for tool platform auth"
                        );
                        TraceEvent::TokenResolved { source: "static".into(), cache_hit: false }
                            .emit();
                        return TokenResolution { token, source: TokenSource::Static };
                    }
                }
            }
            AuthSource::Anonymous => {
                tracing::info!("no auth token resolved; localhost servers only");
                return TokenResolution {
                    token: String::new(),
                    source: TokenSource::Anonymous,
                };
            }
        }
    }

    // Chain exhausted without an explicit Anonymous step; degrade the
    // same way rather than failing discovery outright.
    tracing::warn!("auth chain exhausted without a token; localhost servers only");
    TokenResolution {
        token: String::new(),
        source: TokenSource::Anonymous,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
