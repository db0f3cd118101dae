mod context;

pub use context::build_context;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::channel::{ChannelError, HttpChannel, LocalChannel, MessageChannel};
use crate::config::{CliConfig, ConfigError, Transport};
use crate::engine::create_engine;
use crate::models::{Speaker, Transcript};
use crate::prompts::load_objective;

/// One side of the conversation.
///
/// Implementations are a pure function of the transcript they are given:
/// no state is carried between calls.
#[async_trait]
pub trait Participant: Send + Sync {
    fn speaker(&self) -> Speaker;

    /// Endpoint label used when reporting failures
    fn endpoint(&self) -> &str;

    /// Produce the next outgoing message given the full visible history
    async fn next_message(&self, transcript: &Transcript) -> Result<String, ChannelError>;
}

/// Participant that prepends its objective to the transcript and delivers it
/// through a [`MessageChannel`], one send per turn.
pub struct ChannelParticipant {
    speaker: Speaker,
    name: String,
    objective: String,
    endpoint: String,
    channel: Arc<dyn MessageChannel>,
}

impl ChannelParticipant {
    pub fn new(
        speaker: Speaker,
        objective: String,
        endpoint: String,
        channel: Arc<dyn MessageChannel>,
    ) -> Self {
        Self {
            speaker,
            name: speaker.to_string(),
            objective,
            endpoint,
            channel,
        }
    }

    /// Set the display name used in logs
    pub fn with_name(mut self, name: String) -> Self {
        self.name = name;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn objective(&self) -> &str {
        &self.objective
    }

    /// Build a participant from configuration.
    ///
    /// Remote participants get an [`HttpChannel`]; in-process ones get a
    /// [`LocalChannel`] around a freshly created engine. Objective files are
    /// resolved relative to `base_dir`.
    pub fn from_config(
        config: &CliConfig,
        speaker: Speaker,
        base_dir: &Path,
    ) -> Result<Self, ConfigError> {
        let participant = config.participant(speaker);
        let objective = load_objective(
            participant.objective.as_deref(),
            base_dir,
            speaker,
            &config.simulation.forbidden_phrase,
        )?;

        let channel: Arc<dyn MessageChannel> = match participant.transport(speaker)? {
            Transport::Remote(endpoint) => {
                info!("{} is remote at {}", speaker, endpoint);
                let channel = HttpChannel::new(config.simulation.call_timeout())
                    .map_err(|e| ConfigError::Channel(e.to_string()))?;
                Arc::new(channel)
            }
            Transport::InProcess(engine) => {
                info!("{} runs in-process ({})", speaker, engine.provider());
                Arc::new(LocalChannel::new(create_engine(engine)?))
            }
        };

        Ok(Self::new(
            speaker,
            objective,
            participant.endpoint_label(speaker),
            channel,
        )
        .with_name(participant.display_name(speaker)))
    }
}

#[async_trait]
impl Participant for ChannelParticipant {
    fn speaker(&self) -> Speaker {
        self.speaker
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn next_message(&self, transcript: &Transcript) -> Result<String, ChannelError> {
        let context = build_context(&self.objective, self.speaker, transcript);
        debug!("{} context:\n{}", self.name, context);
        self.channel.send(&self.endpoint, &context).await
    }
}
