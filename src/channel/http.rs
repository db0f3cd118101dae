use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::wire::{JsonRpcRequest, JsonRpcResponse, Message};
use super::{ChannelError, MessageChannel};

/// Remote channel posting JSON-RPC `message/send` requests over HTTP
#[derive(Debug, Clone)]
pub struct HttpChannel {
    client: Client,
}

impl HttpChannel {
    /// Create a channel whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, ChannelError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChannelError::unreachable("-", format!("HTTP client setup failed: {e}")))?;
        Ok(Self { client })
    }

    /// Use a preconfigured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessageChannel for HttpChannel {
    async fn send(&self, endpoint: &str, context: &str) -> Result<String, ChannelError> {
        let request = JsonRpcRequest::send_text(context);
        debug!("POST {} ({} chars)", endpoint, context.len());

        let response = self
            .client
            .post(endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    format!("request failed: {e}")
                };
                ChannelError::unreachable(endpoint, reason)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::unreachable(
                endpoint,
                format!("HTTP status {status}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ChannelError::unreachable(endpoint, format!("reading body failed: {e}")))?;

        parse_reply(endpoint, &body)
    }
}

/// Turn a JSON-RPC reply body into the participant's text message
fn parse_reply(endpoint: &str, body: &str) -> Result<String, ChannelError> {
    let reply: JsonRpcResponse = serde_json::from_str(body)
        .map_err(|e| ChannelError::malformed(endpoint, format!("invalid JSON-RPC body: {e}")))?;

    if let Some(error) = reply.error {
        return Err(ChannelError::unreachable(
            endpoint,
            format!("remote error {}: {}", error.code, error.message),
        ));
    }

    let result = reply
        .result
        .ok_or_else(|| ChannelError::malformed(endpoint, "reply has neither result nor error"))?;

    let message: Message = serde_json::from_value(result)
        .map_err(|e| ChannelError::malformed(endpoint, format!("result is not a message: {e}")))?;

    let text = message
        .joined_text()
        .ok_or_else(|| ChannelError::malformed(endpoint, "message has no text part"))?;
    if text.trim().is_empty() {
        return Err(ChannelError::malformed(endpoint, "message has empty text"));
    }

    debug!("Reply from {}: {}", endpoint, text);
    Ok(text)
}
