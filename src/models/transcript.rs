use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which side of the conversation produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// Tries to provoke the forbidden phrase
    Initiator,
    /// Tries to never say it
    Responder,
}

impl Speaker {
    /// The other participant
    pub fn opponent(self) -> Self {
        match self {
            Speaker::Initiator => Speaker::Responder,
            Speaker::Responder => Speaker::Initiator,
        }
    }

    /// Lowercase identifier used in config keys and CLI arguments
    pub fn key(self) -> &'static str {
        match self {
            Speaker::Initiator => "initiator",
            Speaker::Responder => "responder",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::Initiator => f.write_str("Initiator"),
            Speaker::Responder => f.write_str("Responder"),
        }
    }
}

/// One message produced by one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// 1-based position in the transcript
    pub index: u32,
    pub speaker: Speaker,
    pub text: String,
    /// When the turn was appended
    pub at: DateTime<Utc>,
}

/// Append-only record of the conversation.
///
/// Participants only ever see `&Transcript`; the orchestrator is the single
/// writer. Turns cannot be removed or edited once pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn, assigning the next index
    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) -> &ConversationTurn {
        let index = self.next_index();
        self.turns.push(ConversationTurn {
            index,
            speaker,
            text: text.into(),
            at: Utc::now(),
        });
        &self.turns[self.turns.len() - 1]
    }

    /// Index the next appended turn will receive
    pub fn next_index(&self) -> u32 {
        self.turns.len() as u32 + 1
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Turns produced by one side, in order
    pub fn by(&self, speaker: Speaker) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter().filter(move |t| t.speaker == speaker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_increase_by_one() {
        let mut transcript = Transcript::new();
        assert_eq!(transcript.next_index(), 1);

        for i in 0..7 {
            let speaker = if i % 2 == 0 {
                Speaker::Initiator
            } else {
                Speaker::Responder
            };
            transcript.push(speaker, format!("message {i}"));
        }

        let indices: Vec<u32> = transcript.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(transcript.next_index(), 8);
    }

    #[test]
    fn test_push_keeps_earlier_turns() {
        let mut transcript = Transcript::new();
        transcript.push(Speaker::Initiator, "hello");
        let snapshot = transcript.clone();

        transcript.push(Speaker::Responder, "hi");

        assert_eq!(&transcript.turns()[..1], snapshot.turns());
        assert_eq!(transcript.last().map(|t| t.text.as_str()), Some("hi"));
    }

    #[test]
    fn test_by_speaker() {
        let mut transcript = Transcript::new();
        transcript.push(Speaker::Initiator, "a");
        transcript.push(Speaker::Responder, "b");
        transcript.push(Speaker::Initiator, "c");

        let initiator: Vec<&str> = transcript
            .by(Speaker::Initiator)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(initiator, vec!["a", "c"]);
        assert_eq!(transcript.by(Speaker::Responder).count(), 1);
    }

    #[test]
    fn test_speaker_opponent_and_display() {
        assert_eq!(Speaker::Initiator.opponent(), Speaker::Responder);
        assert_eq!(Speaker::Responder.opponent(), Speaker::Initiator);
        assert_eq!(Speaker::Responder.to_string(), "Responder");
        assert_eq!(Speaker::Initiator.key(), "initiator");
    }
}
