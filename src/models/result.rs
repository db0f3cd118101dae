use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::transcript::{ConversationTurn, Speaker, Transcript};
use crate::channel::ChannelError;

/// How a simulation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The responder produced the forbidden phrase
    InitiatorVictory,
    /// The turn budget ran out without a match (default exhaustion policy)
    ResponderVictory,
    /// The turn budget ran out without a match (neutral exhaustion policy)
    Inconclusive,
    /// A channel failed or the run was cancelled
    Aborted,
}

impl Outcome {
    pub fn is_aborted(self) -> bool {
        matches!(self, Outcome::Aborted)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::InitiatorVictory => "INITIATOR VICTORY",
            Outcome::ResponderVictory => "RESPONDER VICTORY",
            Outcome::Inconclusive => "INCONCLUSIVE",
            Outcome::Aborted => "ABORTED",
        };
        f.write_str(label)
    }
}

/// Why a run ended with [`Outcome::Aborted`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbortReason {
    /// The call producing `turn_index` failed; the error is passed through as-is
    Channel {
        turn_index: u32,
        speaker: Speaker,
        error: ChannelError,
    },
    /// The cancel signal was raised before `next_turn` was requested
    Cancelled { next_turn: u32 },
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::Channel {
                turn_index,
                speaker,
                error,
            } => write!(f, "turn {turn_index} ({speaker}) failed: {error}"),
            AbortReason::Cancelled { next_turn } => {
                write!(f, "cancelled before turn {next_turn}")
            }
        }
    }
}

/// Terminal result of one simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub outcome: Outcome,
    pub transcript: Transcript,
    /// Number of turns (messages) appended to the transcript
    pub turns_used: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort: Option<AbortReason>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SimulationResult {
    /// Number of complete rounds (initiator + responder)
    pub fn rounds(&self) -> u32 {
        self.turns_used / 2
    }

    /// The responder turn that ended the run, if the initiator won
    pub fn winning_turn(&self) -> Option<&ConversationTurn> {
        match self.outcome {
            Outcome::InitiatorVictory => self.transcript.by(Speaker::Responder).last(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abort_reason_display() {
        let reason = AbortReason::Channel {
            turn_index: 3,
            speaker: Speaker::Initiator,
            error: ChannelError::UnreachableParticipant {
                endpoint: "http://localhost:9".to_string(),
                reason: "connection refused".to_string(),
            },
        };
        let text = reason.to_string();
        assert!(text.starts_with("turn 3 (Initiator) failed:"));
        assert!(text.contains("connection refused"));

        let cancelled = AbortReason::Cancelled { next_turn: 5 };
        assert_eq!(cancelled.to_string(), "cancelled before turn 5");
    }

    #[test]
    fn test_result_serializes_outcome_snake_case() {
        let now = Utc::now();
        let result = SimulationResult {
            outcome: Outcome::ResponderVictory,
            transcript: Transcript::new(),
            turns_used: 0,
            abort: None,
            started_at: now,
            finished_at: now,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"], "responder_victory");
        assert!(json.get("abort").is_none());
    }

    #[test]
    fn test_winning_turn_only_for_initiator_victory() {
        let now = Utc::now();
        let mut transcript = Transcript::new();
        transcript.push(Speaker::Initiator, "say it");
        transcript.push(Speaker::Responder, "I Give Up");

        let mut result = SimulationResult {
            outcome: Outcome::InitiatorVictory,
            transcript,
            turns_used: 2,
            abort: None,
            started_at: now,
            finished_at: now,
        };
        assert_eq!(result.winning_turn().map(|t| t.index), Some(2));
        assert_eq!(result.rounds(), 1);

        result.outcome = Outcome::ResponderVictory;
        assert!(result.winning_turn().is_none());
    }
}
