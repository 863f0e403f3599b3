//! Response decoding for MCP servers using Streamable HTTP transport.
//!
//! A server may answer a JSON-RPC POST either as a single
//! `application/json` document or as an SSE stream
//! (`text/event-stream`). The decoding rule here must stay bit-exact:
//! both framings of the same envelope have to produce identical parsed
//! results.

use serde_json::Value;

use tb_domain::error::{Error, Result};

/// Decide whether a parsed object qualifies as the authoritative
/// JSON-RPC response: it must carry a `result`, `error`, or `jsonrpc`
/// key.
fn is_rpc_envelope(value: &Value) -> bool {
    value.get("result").is_some() || value.get("error").is_some() || value.get("jsonrpc").is_some()
}

/// Examine one SSE line and return the envelope if this line carries it.
///
/// - Blank lines and `:` comments are skipped.
/// - `data:` lines are stripped and JSON-parsed.
/// - Bare JSON-object lines are accepted too, for servers that omit the
///   SSE framing.
/// - Parse failures are skipped, not fatal; a later line may qualify.
pub(crate) fn scan_line(line: &str) -> Option<Value> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    let payload = match line.strip_prefix("data:") {
        Some(rest) => rest.trim(),
        None if line.starts_with('{') => line,
        None => return None,
    };
    if payload.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(payload) {
        Ok(parsed) if is_rpc_envelope(&parsed) => Some(parsed),
        _ => None,
    }
}

/// Read the JSON-RPC envelope out of an HTTP response.
///
/// `Content-Type: application/json` bodies parse directly; anything else
/// is treated as an SSE stream and scanned line by line until the first
/// qualifying envelope, after which reading stops.
pub async fn read_rpc_envelope(response: reqwest::Response) -> Result<Value> {
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_owned();

    if content_type.contains("application/json") {
        let body = response
            .text()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        return serde_json::from_str(&body)
            .map_err(|e| Error::Protocol(format!("invalid JSON-RPC body: {e}")));
    }

    let mut response = response;
    let mut buffer = String::new();
    loop {
        match response.chunk().await {
            Ok(Some(bytes)) => {
                buffer.push_str(&String::from_utf8_lossy(&bytes));
                while let Some(pos) = buffer.find('\n') {
                    let line: String = buffer.drain(..=pos).collect();
                    if let Some(envelope) = scan_line(&line) {
                        return Ok(envelope);
                    }
                }
            }
            Ok(None) => {
                // Stream ended; a final line may lack its newline.
                if let Some(envelope) = scan_line(&buffer) {
                    return Ok(envelope);
                }
                return Err(Error::Protocol(
                    "no JSON-RPC envelope found in SSE stream".into(),
                ));
            }
            Err(e) => return Err(Error::Http(e.to_string())),
        }
    }
}

/// Scan a complete SSE body held in memory. Used by tests and by callers
/// that already buffered the response.
pub fn scan_sse_body(body: &str) -> Option<Value> {
    body.lines().find_map(scan_line)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_line_with_result_key() {
        let found = scan_line("data: {\"result\":{\"tools\":[]}}").unwrap();
        assert!(found.get("result").is_some());
    }

    #[test]
    fn data_line_with_error_key() {
        let found = scan_line("data: {\"error\":{\"code\":-1,\"message\":\"x\"}}").unwrap();
        assert!(found.get("error").is_some());
    }

    #[test]
    fn data_line_with_jsonrpc_key_only() {
        let found = scan_line("data: {\"jsonrpc\":\"2.0\"}").unwrap();
        assert_eq!(found.get("jsonrpc").unwrap(), "2.0");
    }

    #[test]
    fn bare_json_line_accepted() {
        let found = scan_line("{\"jsonrpc\":\"2.0\",\"result\":1}").unwrap();
        assert_eq!(found.get("result").unwrap(), 1);
    }

    #[test]
    fn comment_and_blank_lines_skipped() {
        assert!(scan_line(": keep-alive").is_none());
        assert!(scan_line("").is_none());
        assert!(scan_line("   ").is_none());
    }

    #[test]
    fn event_lines_skipped() {
        assert!(scan_line("event: message").is_none());
        assert!(scan_line("id: 42").is_none());
        assert!(scan_line("retry: 5000").is_none());
    }

    #[test]
    fn non_envelope_object_skipped() {
        // Parses fine but has none of the qualifying keys.
        assert!(scan_line("data: {\"progress\": 0.5}").is_none());
    }

    #[test]
    fn malformed_data_payload_skipped() {
        assert!(scan_line("data: {not json").is_none());
    }

    #[test]
    fn empty_data_payload_skipped() {
        assert!(scan_line("data:").is_none());
        assert!(scan_line("data:   ").is_none());
    }

    #[test]
    fn body_scan_returns_first_qualifying_object() {
        let body = ": hello\n\
                    event: message\n\
                    data: {\"progress\": 1}\n\
                    data: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"a\":1}}\n\
                    data: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"a\":2}}\n";
        let found = scan_sse_body(body).unwrap();
        assert_eq!(found["result"]["a"], 1);
    }

    #[test]
    fn body_scan_exhausted_returns_none() {
        assert!(scan_sse_body(": nothing here\nevent: done\n").is_none());
    }
}
