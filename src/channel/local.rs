use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{ChannelError, MessageChannel};
use crate::engine::{EngineError, ReasoningEngine};

/// In-process channel that hands the context straight to an engine.
///
/// The endpoint is only used to label errors and logs.
#[derive(Clone)]
pub struct LocalChannel {
    engine: Arc<dyn ReasoningEngine>,
}

impl LocalChannel {
    pub fn new(engine: Arc<dyn ReasoningEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl MessageChannel for LocalChannel {
    async fn send(&self, endpoint: &str, context: &str) -> Result<String, ChannelError> {
        debug!("Local call to {} via {}", endpoint, self.engine.name());

        match self.engine.generate(context).await {
            Ok(text) if text.trim().is_empty() => {
                Err(ChannelError::malformed(endpoint, "engine returned empty text"))
            }
            Ok(text) => Ok(text),
            Err(EngineError::Empty(engine)) => Err(ChannelError::malformed(
                endpoint,
                format!("{engine} produced an empty reply"),
            )),
            Err(e) => Err(ChannelError::unreachable(endpoint, e.to_string())),
        }
    }
}
