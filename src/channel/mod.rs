//! Transport between the orchestrator and a participant.
//!
//! A channel delivers one context string to an endpoint and returns the single
//! text message produced there. Failures are reported, never retried here.

mod http;
mod local;
pub mod wire;

pub use http::HttpChannel;
pub use local::LocalChannel;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single send
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelError {
    /// Transport failure, timeout, or the remote reported an error
    #[error("participant at {endpoint} is unreachable: {reason}")]
    UnreachableParticipant { endpoint: String, reason: String },
    /// The remote answered but the reply could not be read as text
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
}

impl ChannelError {
    pub fn unreachable(endpoint: &str, reason: impl Into<String>) -> Self {
        Self::UnreachableParticipant {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed(endpoint: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            Self::UnreachableParticipant { endpoint, .. } => endpoint,
            Self::MalformedResponse { endpoint, .. } => endpoint,
        }
    }
}

/// Send a context to a participant endpoint and wait for its reply
#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn send(&self, endpoint: &str, context: &str) -> Result<String, ChannelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let err = ChannelError::unreachable("http://a", "timed out");
        assert_eq!(err.endpoint(), "http://a");
        assert_eq!(
            err.to_string(),
            "participant at http://a is unreachable: timed out"
        );

        let err = ChannelError::malformed("http://b", "no text part");
        assert!(matches!(err, ChannelError::MalformedResponse { .. }));
        assert_eq!(err.endpoint(), "http://b");
    }
}
