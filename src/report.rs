//! Console output for the `run` command: the running turn log and the final
//! summary block.

use std::fmt::Write as _;

use crate::models::{ConversationTurn, Outcome, SimulationResult};
use crate::orchestrator::TurnObserver;

/// Prints each turn to stdout as it is appended
#[derive(Debug, Clone, Default)]
pub struct ConsoleReporter {
    /// Prefix distinguishing concurrent runs, e.g. `run 2`
    label: Option<String>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }

    pub fn format_turn(&self, turn: &ConversationTurn) -> String {
        match &self.label {
            Some(label) => format!("[{label}] [turn {}] {}: {}", turn.index, turn.speaker, turn.text),
            None => format!("[turn {}] {}: {}", turn.index, turn.speaker, turn.text),
        }
    }
}

impl TurnObserver for ConsoleReporter {
    fn on_turn(&self, turn: &ConversationTurn) {
        println!("{}", self.format_turn(turn));
    }
}

/// Header printed before the first turn
pub fn format_header(forbidden_phrase: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== ADVERSARIAL SIMULATION STARTING ===");
    let _ = writeln!(out, "Initiator goal: get the responder to say \"{forbidden_phrase}\"");
    let _ = writeln!(out, "Responder goal: never say \"{forbidden_phrase}\"");
    let _ = write!(out, "{}", "=".repeat(50));
    out
}

/// Summary block printed once a simulation is complete
pub fn format_summary(result: &SimulationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== SIMULATION RESULTS ===");
    let _ = writeln!(out, "Outcome: {}", result.outcome);
    let _ = writeln!(
        out,
        "Turns used: {} ({} rounds)",
        result.turns_used,
        result.rounds()
    );

    let detail = match result.outcome {
        Outcome::InitiatorVictory => match result.winning_turn() {
            Some(turn) => format!("Responder said the forbidden phrase on turn {}", turn.index),
            None => "Responder said the forbidden phrase".to_string(),
        },
        Outcome::ResponderVictory => "Responder resisted every attempt".to_string(),
        Outcome::Inconclusive => "Turn budget exhausted without a match".to_string(),
        Outcome::Aborted => match &result.abort {
            Some(reason) => format!("Aborted: {reason}"),
            None => "Aborted".to_string(),
        },
    };
    let _ = write!(out, "{detail}");
    out
}
