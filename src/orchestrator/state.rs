use chrono::{DateTime, Utc};

use crate::models::{AbortReason, ConversationTurn, Outcome, SimulationResult, Speaker, Transcript};

/// State maintained across the turn loop of one run.
///
/// Created fresh for every run and consumed by [`SimulationState::finish`].
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Maximum rounds allowed
    pub max_turns: u32,
    pub transcript: Transcript,
    pub abort: Option<AbortReason>,
    pub started_at: DateTime<Utc>,
}

impl SimulationState {
    pub fn new(max_turns: u32) -> Self {
        Self {
            max_turns,
            transcript: Transcript::new(),
            abort: None,
            started_at: Utc::now(),
        }
    }

    /// Mark the first turn as about to be requested
    pub fn start(&mut self) {
        self.started_at = Utc::now();
    }

    /// Turns (messages) appended so far
    pub fn turns_used(&self) -> u32 {
        self.transcript.len() as u32
    }

    pub fn rounds_completed(&self) -> u32 {
        self.turns_used() / 2
    }

    /// Check if the round budget is spent
    pub fn budget_exhausted(&self) -> bool {
        self.rounds_completed() >= self.max_turns
    }

    /// Append a turn to the transcript
    pub fn record(&mut self, speaker: Speaker, text: String) -> &ConversationTurn {
        self.transcript.push(speaker, text)
    }

    /// Consume the state into the terminal result
    pub fn finish(self, outcome: Outcome) -> SimulationResult {
        SimulationResult {
            outcome,
            turns_used: self.turns_used(),
            transcript: self.transcript,
            abort: self.abort,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_carries_transcript_and_abort() {
        let mut state = SimulationState::new(2);
        state.start();
        let started_at = state.started_at;

        state.record(Speaker::Initiator, "a".to_string());
        state.abort = Some(AbortReason::Cancelled { next_turn: 2 });

        let result = state.finish(Outcome::Aborted);
        assert_eq!(result.outcome, Outcome::Aborted);
        assert_eq!(result.turns_used, 1);
        assert_eq!(result.transcript.len(), 1);
        assert_eq!(result.abort, Some(AbortReason::Cancelled { next_turn: 2 }));
        assert_eq!(result.started_at, started_at);
        assert!(result.finished_at >= started_at);
    }

    #[test]
    fn test_budget_counts_rounds() {
        let mut state = SimulationState::new(2);
        state.start();

        state.record(Speaker::Initiator, "a".to_string());
        state.record(Speaker::Responder, "b".to_string());
        state.record(Speaker::Initiator, "c".to_string());
        assert_eq!(state.rounds_completed(), 1);
        assert!(!state.budget_exhausted());

        state.record(Speaker::Responder, "d".to_string());
        assert_eq!(state.turns_used(), 4);
        assert!(state.budget_exhausted());
    }
}
