//! JSON message types for the hostlink wire protocol.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single command request.
///
/// Wire shape: `{"command": "<name>", "params": {...}}`. `params` is
/// handler-specific and defaults to an empty object when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Name selecting the handler in the command table.
    pub command: String,

    /// Handler-specific parameters.
    #[serde(default = "empty_params")]
    pub params: Value,
}

fn empty_params() -> Value {
    Value::Object(Map::new())
}

impl Request {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            params: empty_params(),
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }
}

/// A single command response.
///
/// Wire shape: `{"success": <bool>, "data": {...}?, "error": "<msg>"?}`.
/// `data` and `error` are omitted entirely when unset; an error response
/// never carries a `data` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Whether the command completed.
    pub success: bool,

    /// Result payload (for successful responses).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Human-readable error message (for failed responses).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    /// A successful response carrying `data`.
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// A successful response with no payload.
    pub fn ok_empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    /// A failed response carrying an error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// The error sent back for an unparseable payload.
    pub fn invalid_json() -> Self {
        Self::error("Invalid JSON")
    }

    /// The error sent back for JSON that lacks a string `command` field.
    pub fn missing_command() -> Self {
        Self::error("Missing 'command' field")
    }

    /// The error sent back for a command name not in the table.
    pub fn unknown_command(name: &str) -> Self {
        Self::error(format!("Unknown command: {}", name))
    }

    pub fn is_ok(&self) -> bool {
        self.success
    }

    pub fn is_error(&self) -> bool {
        !self.success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let req = Request::new("ping");
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains(r#""command":"ping""#));
        assert!(json.contains(r#""params":{}"#));
    }

    #[test]
    fn test_request_params_default_on_deserialize() {
        let req: Request = serde_json::from_str(r#"{"command":"ping"}"#).unwrap();
        assert_eq!(req.params, json!({}));
    }

    #[test]
    fn test_response_ok_omits_error_key() {
        let resp = Response::ok(json!({"message": "pong"}));
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""success":true"#));
        assert!(json.contains(r#""message":"pong""#));
        assert!(!json.contains("error"));
    }

    #[test]
    fn test_response_error_omits_data_key() {
        let resp = Response::error("boom");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""success":false"#));
        assert!(json.contains(r#""error":"boom""#));
        assert!(!json.contains("data"));
    }

    #[test]
    fn test_response_ok_empty() {
        let resp = Response::ok_empty();
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"success":true}"#);
    }

    #[test]
    fn test_unknown_command_message() {
        let resp = Response::unknown_command("frobnicate");
        assert_eq!(resp.error.as_deref(), Some("Unknown command: frobnicate"));
        assert!(resp.is_error());
    }
}
