use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{EngineError, ReasoningEngine};

/// Replays a fixed list of replies, one per call, repeating the last one.
///
/// Ignores the context entirely, which makes runs reproducible without a model.
#[derive(Debug)]
pub struct ScriptedEngine {
    lines: Vec<String>,
    cursor: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            cursor: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ReasoningEngine for ScriptedEngine {
    async fn generate(&self, _context: &str) -> Result<String, EngineError> {
        let position = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.lines
            .get(position)
            .or_else(|| self.lines.last())
            .cloned()
            .ok_or_else(|| EngineError::Empty(self.name()))
    }

    fn name(&self) -> String {
        "scripted".to_string()
    }
}
