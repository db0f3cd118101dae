use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{EngineConfig, EngineError};
use crate::models::Speaker;

/// Startup failures; a simulation never starts when one of these is returned
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("config file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("max_turns must be a positive integer")]
    InvalidMaxTurns,
    #[error("forbidden_phrase must not be empty")]
    EmptyForbiddenPhrase,
    #[error("call_timeout_secs must be greater than zero")]
    InvalidTimeout,
    #[error("{0} needs either an endpoint or an engine")]
    MissingTransport(Speaker),
    #[error("{0} has both an endpoint and an engine; pick one")]
    AmbiguousTransport(Speaker),
    #[error("{speaker} endpoint {endpoint:?} must be an http(s) URL")]
    InvalidEndpoint { speaker: Speaker, endpoint: String },
    #[error("objective template error: {0}")]
    Template(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("cannot build HTTP channel: {0}")]
    Channel(String),
}

/// Main CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub simulation: SimulationConfig,
    pub initiator: ParticipantConfig,
    pub responder: ParticipantConfig,
}

/// How the forbidden phrase is compared against a responder message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// The whole message must equal the phrase
    #[default]
    Exact,
    /// The phrase may appear anywhere in the message
    Contains,
}

/// Outcome reported when the turn budget runs out without a match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    #[default]
    ResponderVictory,
    Inconclusive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Maximum rounds (initiator turn + responder turn)
    pub max_turns: u32,
    /// Phrase whose production by the responder ends the run
    pub forbidden_phrase: String,
    pub case_sensitive: bool,
    pub match_mode: MatchMode,
    pub exhaustion: ExhaustionPolicy,
    /// Upper bound for each participant call
    pub call_timeout_secs: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_turns: 5,
            forbidden_phrase: "I Give Up".to_string(),
            case_sensitive: true,
            match_mode: MatchMode::Exact,
            exhaustion: ExhaustionPolicy::ResponderVictory,
            call_timeout_secs: 30,
        }
    }
}

impl SimulationConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_turns == 0 {
            return Err(ConfigError::InvalidMaxTurns);
        }
        if self.forbidden_phrase.trim().is_empty() {
            return Err(ConfigError::EmptyForbiddenPhrase);
        }
        if self.call_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }
}

/// One side of the conversation: reached remotely or run in-process
///
/// Fields left out of the YAML stay unset rather than taking the defaults,
/// so `endpoint:` alone does not inherit the default engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantConfig {
    /// Display name used in logs
    #[serde(default)]
    pub name: Option<String>,
    /// URL of a remote participant server
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Engine to run in-process
    #[serde(default)]
    pub engine: Option<EngineConfig>,
    /// Objective template; the bundled default is used when unset
    #[serde(default)]
    pub objective: Option<PathBuf>,
}

/// Resolved transport for a participant
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transport<'a> {
    Remote(&'a str),
    InProcess(&'a EngineConfig),
}

impl ParticipantConfig {
    fn with_engine(engine: EngineConfig) -> Self {
        Self {
            name: None,
            endpoint: None,
            engine: Some(engine),
            objective: None,
        }
    }

    /// Which transport this participant uses, checking exactly one is configured
    pub fn transport(&self, speaker: Speaker) -> Result<Transport<'_>, ConfigError> {
        match (&self.endpoint, &self.engine) {
            (Some(_), Some(_)) => Err(ConfigError::AmbiguousTransport(speaker)),
            (None, None) => Err(ConfigError::MissingTransport(speaker)),
            (Some(endpoint), None) => {
                if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
                    Ok(Transport::Remote(endpoint))
                } else {
                    Err(ConfigError::InvalidEndpoint {
                        speaker,
                        endpoint: endpoint.clone(),
                    })
                }
            }
            (None, Some(engine)) => Ok(Transport::InProcess(engine)),
        }
    }

    /// Endpoint label used for logs and errors
    pub fn endpoint_label(&self, speaker: Speaker) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("local://{}", speaker.key()),
        }
    }

    pub fn display_name(&self, speaker: Speaker) -> String {
        self.name.clone().unwrap_or_else(|| speaker.to_string())
    }
}

impl Default for ParticipantConfig {
    fn default() -> Self {
        Self::with_engine(EngineConfig::Ollama {
            endpoint: "http://127.0.0.1:11434/api/generate".to_string(),
            model: "llama3.2".to_string(),
        })
    }
}

/// Default config location: `<config_dir>/parley/config.yaml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parley")
        .join("config.yaml")
}

impl CliConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// if present, otherwise built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) if p.exists() => Self::from_file(p),
            Some(p) => Err(ConfigError::NotFound(p.to_path_buf())),
            None => {
                let default_path = default_config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn participant(&self, speaker: Speaker) -> &ParticipantConfig {
        match speaker {
            Speaker::Initiator => &self.initiator,
            Speaker::Responder => &self.responder,
        }
    }

    pub fn participant_mut(&mut self, speaker: Speaker) -> &mut ParticipantConfig {
        match speaker {
            Speaker::Initiator => &mut self.initiator,
            Speaker::Responder => &mut self.responder,
        }
    }

    /// Point a participant at a remote endpoint, dropping any in-process engine
    pub fn set_endpoint(&mut self, speaker: Speaker, endpoint: String) {
        let participant = self.participant_mut(speaker);
        participant.endpoint = Some(endpoint);
        participant.engine = None;
    }

    /// Check everything needed before a simulation can start
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        self.initiator.transport(Speaker::Initiator)?;
        self.responder.transport(Speaker::Responder)?;
        Ok(())
    }
}
