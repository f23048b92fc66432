//! JSON-RPC 2.0 request and response envelopes.
//!
//! The runtime is transport-agnostic: hosts hand a [`Request`] to the
//! dispatcher and get a [`Response`] back, regardless of whether the payload
//! arrived over HTTP, a lambda invocation, or a test harness.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub const JSONRPC_VERSION: &str = "2.0";

/// A single inbound call. Immutable once dispatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Caller-chosen correlation id; echoed back verbatim. JSON-RPC allows
    /// both strings and numbers here.
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub meta: Option<RequestMeta>,
}

/// Caller metadata travelling alongside the request payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMeta {
    /// Permission verdict already computed by an outer layer. When granted,
    /// built-in permission evaluation is skipped entirely.
    #[serde(default)]
    pub permission_state: Option<PermissionGrant>,
    /// Identity of the caller as resolved by the outer layer.
    #[serde(default)]
    pub identity: Option<String>,
    /// Opaque tracing carrier for span linkage.
    #[serde(default)]
    pub tracing: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub status: String,
}

impl PermissionGrant {
    pub fn is_granted(&self) -> bool {
        self.status == "granted"
    }
}

/// The response envelope: exactly one of `result` or `error` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Response headers set by the function body, as name -> values.
    pub headers: HashMap<String, Vec<String>>,
}

impl Response {
    pub fn success(id: Value, result: Value, headers: HashMap<String, Vec<String>>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
            meta: Some(ResponseMeta { headers }),
        }
    }

    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(ResponseError {
                code,
                message: message.into(),
            }),
            meta: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_parses_with_camel_case_meta() {
        let request: Request = serde_json::from_value(json!({
            "id": 7,
            "method": "createPost",
            "params": {"title": "hello"},
            "meta": {
                "permissionState": {"status": "granted"},
                "identity": "usr_123"
            }
        }))
        .unwrap();

        assert_eq!(request.method, "createPost");
        let meta = request.meta.unwrap();
        assert!(meta.permission_state.unwrap().is_granted());
        assert_eq!(meta.identity.as_deref(), Some("usr_123"));
    }

    #[test]
    fn test_request_meta_is_optional() {
        let request: Request =
            serde_json::from_value(json!({"id": "abc", "method": "listPosts"})).unwrap();
        assert!(request.meta.is_none());
        assert!(request.params.is_null());
    }

    #[test]
    fn test_success_envelope_shape() {
        let response = Response::success(json!(1), json!({"ok": true}), HashMap::new());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["result"]["ok"], true);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_error_envelope_shape() {
        let response = Response::error(json!(1), -32601, "no such method");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"]["code"], -32601);
        assert!(value.get("result").is_none());
        assert!(value.get("meta").is_none());
    }
}
