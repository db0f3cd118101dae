//! Bundled default objectives for the two participants.
//!
//! Objectives are embedded in the binary using include_str! and used when no
//! external objective file is configured. They are minijinja templates; the
//! only variable is `forbidden_phrase`.

use std::path::{Path, PathBuf};

use minijinja::{Environment, context};
use tracing::debug;

use crate::config::ConfigError;
use crate::models::Speaker;

/// Bundled default initiator objective
pub const DEFAULT_INITIATOR_OBJECTIVE: &str = include_str!("../prompts/initiator.md");

/// Bundled default responder objective
pub const DEFAULT_RESPONDER_OBJECTIVE: &str = include_str!("../prompts/responder.md");

/// Where an objective template comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectiveSource {
    /// Objective loaded from a file path
    File(PathBuf),
    /// Objective bundled with the binary
    Bundled(&'static str),
}

impl ObjectiveSource {
    /// Read the raw template text
    pub fn content(&self) -> Result<String, ConfigError> {
        match self {
            ObjectiveSource::File(path) => {
                std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })
            }
            ObjectiveSource::Bundled(content) => Ok((*content).to_string()),
        }
    }
}

/// Resolve the objective for a participant.
///
/// Resolution priority:
/// 1. Configured path (relative paths resolve against `base_dir`)
/// 2. Bundled default for the role
pub fn resolve_objective(
    configured: Option<&Path>,
    base_dir: &Path,
    speaker: Speaker,
) -> ObjectiveSource {
    if let Some(path) = configured {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        };
        debug!("Using {} objective from {:?}", speaker.key(), path);
        return ObjectiveSource::File(path);
    }

    debug!("Using bundled {} objective", speaker.key());
    match speaker {
        Speaker::Initiator => ObjectiveSource::Bundled(DEFAULT_INITIATOR_OBJECTIVE),
        Speaker::Responder => ObjectiveSource::Bundled(DEFAULT_RESPONDER_OBJECTIVE),
    }
}

/// Render an objective template with the forbidden phrase substituted
pub fn render_objective(template: &str, forbidden_phrase: &str) -> Result<String, ConfigError> {
    let env = Environment::new();
    env.render_str(template, context! { forbidden_phrase => forbidden_phrase })
        .map(|s| s.trim().to_string())
        .map_err(|e| ConfigError::Template(e.to_string()))
}

/// Resolve, read and render a participant objective in one step
pub fn load_objective(
    configured: Option<&Path>,
    base_dir: &Path,
    speaker: Speaker,
    forbidden_phrase: &str,
) -> Result<String, ConfigError> {
    let template = resolve_objective(configured, base_dir, speaker).content()?;
    render_objective(&template, forbidden_phrase)
}
