//! JSON-RPC 2.0 envelope for `message/send`, shaped after the A2A protocol.
//!
//! Only text parts are supported. Shared by [`super::HttpChannel`] and the
//! participant server so both ends agree on the format.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";
pub const METHOD_SEND: &str = "message/send";

/// JSON-RPC error codes used by the server
pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Part {
    Text { text: String },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: MessageRole,
    pub parts: Vec<Part>,
    pub message_id: String,
}

impl Message {
    pub fn text(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part::Text { text: text.into() }],
            message_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// All text parts joined with newlines, or `None` if there are none
    pub fn joined_text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .parts
            .iter()
            .filter_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                Part::Unsupported => None,
            })
            .collect();

        if texts.is_empty() {
            None
        } else {
            Some(texts.join("\n"))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendParams {
    pub message: Message,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Build a `message/send` request carrying `text` as a user message
    pub fn send_text(text: &str) -> Self {
        let params = SendParams {
            message: Message::text(MessageRole::User, text),
        };
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Value::String(uuid::Uuid::new_v4().to_string()),
            method: METHOD_SEND.to_string(),
            params: serde_json::to_value(params).ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, message: &Message) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: serde_json::to_value(message).ok(),
            error: None,
        }
    }

    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_request_shape() {
        let request = JsonRpcRequest::send_text("hello");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "message/send");
        assert_eq!(json["params"]["message"]["role"], "user");
        assert_eq!(json["params"]["message"]["parts"][0]["kind"], "text");
        assert_eq!(json["params"]["message"]["parts"][0]["text"], "hello");
        assert!(json["params"]["message"]["messageId"].is_string());
    }

    #[test]
    fn test_joined_text_skips_unsupported_parts() {
        let message: Message = serde_json::from_value(serde_json::json!({
            "role": "agent",
            "messageId": "m1",
            "parts": [
                {"kind": "text", "text": "first"},
                {"kind": "file", "file": {"uri": "x"}},
                {"kind": "text", "text": "second"}
            ]
        }))
        .unwrap();

        assert_eq!(message.joined_text().as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn test_joined_text_none_without_text() {
        let message = Message {
            role: MessageRole::Agent,
            parts: vec![Part::Unsupported],
            message_id: "m".to_string(),
        };
        assert_eq!(message.joined_text(), None);
    }
}
