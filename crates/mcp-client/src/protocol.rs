//! JSON-RPC 2.0 types for the MCP protocol.
//!
//! Remote tool servers speak JSON-RPC over HTTP POST; the response body
//! is either a plain JSON document or an SSE stream (see [`crate::sse`]).

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Requests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            method: method.into(),
            params,
        }
    }

    /// The `tools/list` request.
    pub fn tools_list() -> Self {
        Self::new(1, "tools/list", Some(serde_json::json!({})))
    }

    /// The `tools/call` request for a named tool.
    pub fn tools_call(name: &str, arguments: Value) -> Self {
        Self::new(
            1,
            "tools/call",
            Some(serde_json::json!({ "name": name, "arguments": arguments })),
        )
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Responses
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Extract the result value, or the error object if present.
    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        if let Some(err) = self.error {
            Err(err)
        } else {
            Ok(self.result.unwrap_or(Value::Null))
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcError {}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// MCP payloads
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A single tool record inside a `tools/list` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpToolDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_schema")]
    pub input_schema: Value,
}

fn default_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

/// The result payload of `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsListResult {
    #[serde(default)]
    pub tools: Vec<McpToolDef>,
}

/// Flatten a `tools/call` result value into the string handed back to
/// the hosting SDK.
///
/// Rule (matches what the deployed servers expect callers to do):
/// take `content[0].text` if present; stringify the first content
/// element if it has no `text` field; stringify the whole result when
/// `content` is empty or missing.
pub fn extract_call_text(result: &Value) -> String {
    if let Some(first) = result
        .get("content")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
    {
        if let Some(text) = first.get("text").and_then(Value::as_str) {
            return text.to_owned();
        }
        return first.to_string();
    }

    match result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_tools_list_request() {
        let json = serde_json::to_string(&JsonRpcRequest::tools_list()).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"method\":\"tools/list\""));
    }

    #[test]
    fn serialize_tools_call_request() {
        let req = JsonRpcRequest::tools_call("send_email", serde_json::json!({"to": "a@b.com"}));
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"method\":\"tools/call\""));
        assert!(json.contains("\"name\":\"send_email\""));
        assert!(json.contains("\"arguments\""));
    }

    #[test]
    fn deserialize_success_response() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"result":{"tools":[]}}"#;
        let resp: JsonRpcResponse = serde_json::from_str(raw).unwrap();
        assert!(!resp.is_error());
        assert!(resp.into_result().unwrap().get("tools").is_some());
    }

    #[test]
    fn deserialize_error_response() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found"}}"#;
        let resp: JsonRpcResponse = serde_json::from_str(raw).unwrap();
        let err = resp.into_result().unwrap_err();
        assert_eq!(err.code, -32601);
        assert_eq!(format!("{err}"), "JSON-RPC error -32601: Method not found");
    }

    #[test]
    fn tools_list_missing_description_and_schema_default() {
        let raw = r#"{ "tools": [{ "name": "ping" }] }"#;
        let result: ToolsListResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.tools[0].description, "");
        assert_eq!(
            result.tools[0].input_schema,
            serde_json::json!({ "type": "object", "properties": {} })
        );
    }

    #[test]
    fn tools_list_preserves_order() {
        let raw = r#"{ "tools": [{ "name": "b" }, { "name": "a" }, { "name": "c" }] }"#;
        let result: ToolsListResult = serde_json::from_str(raw).unwrap();
        let names: Vec<&str> = result.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn extract_text_from_first_content_item() {
        let result = serde_json::json!({ "content": [{ "type": "text", "text": "sent" }] });
        assert_eq!(extract_call_text(&result), "sent");
    }

    #[test]
    fn extract_stringifies_content_without_text_field() {
        let result = serde_json::json!({ "content": [{ "type": "image", "url": "x" }] });
        let out = extract_call_text(&result);
        assert!(out.contains("image"));
        assert!(out.contains("x"));
    }

    #[test]
    fn extract_stringifies_result_when_content_empty() {
        let result = serde_json::json!({ "content": [], "status": "ok" });
        let out = extract_call_text(&result);
        assert!(out.contains("\"status\":\"ok\""));
    }

    #[test]
    fn extract_plain_string_result() {
        let result = serde_json::json!("done");
        assert_eq!(extract_call_text(&result), "done");
    }
}
