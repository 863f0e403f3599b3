//! HTTP transport for JSON-RPC requests to MCP servers.
//!
//! One pooled `reqwest::Client` serves every server; per-request state
//! (headers, trace id) is built fresh for each call so nothing leaks
//! between conversations.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;

use tb_domain::config::ToolingConfig;
use tb_domain::error::Error;

use crate::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::sse;

/// Errors from a single JSON-RPC exchange. The retry loop in the
/// registry keys off [`TransportError::is_retryable`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport: {0}")]
    Network(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("{0}")]
    Rpc(#[from] crate::protocol::JsonRpcError),

    #[error("protocol: {0}")]
    Protocol(String),
}

impl TransportError {
    /// 502/503/504 and transport-level failures are transient; anything
    /// else (4xx, RPC errors, malformed envelopes) fails immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Status { status, .. } => matches!(status, 502 | 503 | 504),
            TransportError::Network(_) | TransportError::Timeout(_) => true,
            TransportError::Rpc(_) | TransportError::Protocol(_) => false,
        }
    }

    /// HTTP status of the failed attempt, 0 when the request never got a
    /// response. Used for trace events.
    pub fn status(&self) -> u16 {
        match self {
            TransportError::Status { status, .. } => *status,
            _ => 0,
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Status { status: 401 | 403, body } => {
                Error::Auth(format!("tool server rejected credentials: {body}"))
            }
            TransportError::Status { status, body } => {
                Error::Http(format!("tool server returned {status}: {body}"))
            }
            TransportError::Network(msg) => Error::Http(msg),
            TransportError::Timeout(msg) => Error::Timeout(msg),
            TransportError::Rpc(err) => Error::Protocol(err.to_string()),
            TransportError::Protocol(msg) => Error::Protocol(msg),
        }
    }
}

fn from_reqwest(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else {
        TransportError::Network(e.to_string())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HttpTransport
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// HTTP JSON-RPC transport with the platform's fixed timeout budget.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(cfg: &ToolingConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .connect_timeout(Duration::from_millis(cfg.connect_timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self { http })
    }

    /// POST a JSON-RPC request and decode the envelope, returning the
    /// `result` member.
    ///
    /// The `Accept` header advertises both framings because servers are
    /// free to answer either as plain JSON or as an SSE stream.
    pub async fn rpc_request(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        request: &JsonRpcRequest,
    ) -> Result<Value, TransportError> {
        let trace_id = uuid::Uuid::new_v4().to_string();
        let mut rb = self
            .http
            .post(url)
            .header("Accept", "text/event-stream, application/json")
            .header("X-Trace-Id", &trace_id)
            .json(request);
        for (name, value) in headers {
            rb = rb.header(name, value);
        }

        tracing::debug!(url, method = %request.method, trace_id, "sending JSON-RPC request");
        let response = rb.send().await.map_err(from_reqwest)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope = sse::read_rpc_envelope(response).await.map_err(|e| match e {
            Error::Timeout(msg) => TransportError::Timeout(msg),
            Error::Http(msg) => TransportError::Network(msg),
            other => TransportError::Protocol(other.to_string()),
        })?;

        let parsed: JsonRpcResponse = serde_json::from_value(envelope)
            .map_err(|e| TransportError::Protocol(format!("malformed JSON-RPC envelope: {e}")))?;
        parsed.into_result().map_err(TransportError::Rpc)
    }

    /// Plain GET returning a JSON body. Used by the configuration
    /// service, which is ordinary REST rather than JSON-RPC.
    pub async fn get_json(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<Value, Error> {
        let trace_id = uuid::Uuid::new_v4().to_string();
        let mut rb = self.http.get(url).header("X-Trace-Id", &trace_id);
        for (name, value) in headers {
            rb = rb.header(name, value);
        }

        tracing::debug!(url, trace_id, "fetching JSON document");
        let response = rb.send().await.map_err(|e| Error::from(from_reqwest(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status: status.as_u16(), body }.into());
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::Protocol(format!("invalid JSON body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_5xx_statuses_are_retryable() {
        for status in [502, 503, 504] {
            let err = TransportError::Status { status, body: String::new() };
            assert!(err.is_retryable(), "{status} should be retryable");
        }
    }

    #[test]
    fn client_errors_are_not_retryable() {
        for status in [400, 401, 404, 422] {
            let err = TransportError::Status { status, body: String::new() };
            assert!(!err.is_retryable(), "{status} should not be retryable");
        }
    }

    #[test]
    fn network_and_timeout_are_retryable() {
        assert!(TransportError::Network("reset".into()).is_retryable());
        assert!(TransportError::Timeout("30s".into()).is_retryable());
    }

    #[test]
    fn rpc_and_protocol_errors_are_not_retryable() {
        let rpc = TransportError::Rpc(crate::protocol::JsonRpcError {
            code: -32601,
            message: "Method not found".into(),
            data: None,
        });
        assert!(!rpc.is_retryable());
        assert!(!TransportError::Protocol("bad envelope".into()).is_retryable());
    }

    #[test]
    fn auth_statuses_map_to_auth_error() {
        let err: Error = TransportError::Status { status: 401, body: "denied".into() }.into();
        assert!(matches!(err, Error::Auth(_)));
        let err: Error = TransportError::Status { status: 500, body: String::new() }.into();
        assert!(matches!(err, Error::Http(_)));
    }
}
