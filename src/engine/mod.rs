//! Reasoning engines: the text generators behind a participant.
//!
//! The engine is selected at configuration time through [`EngineConfig`] and
//! built with [`create_engine`]. Every variant exposes the same narrow
//! `generate(context) -> text` capability.

mod ollama;
mod openai;
mod scripted;

pub use ollama::OllamaEngine;
pub use openai::OpenAiEngine;
pub use scripted::ScriptedEngine;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{engine} request failed: {source}")]
    Request {
        engine: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{engine} returned HTTP {status}: {body}")]
    Status {
        engine: String,
        status: u16,
        body: String,
    },
    #[error("{engine} response could not be decoded: {reason}")]
    Decode { engine: String, reason: String },
    #[error("environment variable {0} is not set")]
    MissingApiKey(String),
    #[error("{0} produced an empty reply")]
    Empty(String),
}

/// Text generation capability used by participants
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// Generate the next message for the given context
    async fn generate(&self, context: &str) -> Result<String, EngineError>;

    /// Short name for logs, e.g. `ollama:llama3.2`
    fn name(&self) -> String;
}

fn default_ollama_endpoint() -> String {
    "http://127.0.0.1:11434/api/generate".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.9
}

/// Engine selection, tagged by `provider` in YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum EngineConfig {
    /// Ollama-style `POST /api/generate`
    Ollama {
        #[serde(default = "default_ollama_endpoint")]
        endpoint: String,
        model: String,
    },
    /// OpenAI-compatible chat completions (OpenAI, Gemini compat, LiteLLM, ...)
    Openai {
        #[serde(default = "default_openai_base_url")]
        base_url: String,
        model: String,
        #[serde(default = "default_api_key_env")]
        api_key_env: String,
        #[serde(default = "default_temperature")]
        temperature: f32,
    },
    /// Canned replies, in order
    Scripted { lines: Vec<String> },
}

impl EngineConfig {
    pub fn provider(&self) -> &'static str {
        match self {
            EngineConfig::Ollama { .. } => "ollama",
            EngineConfig::Openai { .. } => "openai",
            EngineConfig::Scripted { .. } => "scripted",
        }
    }
}

/// Build the engine described by `config`.
///
/// Fails only when a required credential is missing from the environment.
pub fn create_engine(config: &EngineConfig) -> Result<Arc<dyn ReasoningEngine>, EngineError> {
    let engine: Arc<dyn ReasoningEngine> = match config {
        EngineConfig::Ollama { endpoint, model } => {
            Arc::new(OllamaEngine::new(endpoint.clone(), model.clone()))
        }
        EngineConfig::Openai {
            base_url,
            model,
            api_key_env,
            temperature,
        } => {
            let api_key = std::env::var(api_key_env)
                .map_err(|_| EngineError::MissingApiKey(api_key_env.clone()))?;
            Arc::new(OpenAiEngine::new(
                base_url.clone(),
                model.clone(),
                api_key,
                *temperature,
            ))
        }
        EngineConfig::Scripted { lines } => Arc::new(ScriptedEngine::new(lines.clone())),
    };

    info!("Created {} engine: {}", config.provider(), engine.name());
    Ok(engine)
}
