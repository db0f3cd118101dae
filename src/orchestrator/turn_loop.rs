use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::channel::ChannelError;
use crate::config::{ExhaustionPolicy, SimulationConfig};
use crate::models::{AbortReason, ConversationTurn, Outcome, SimulationResult};
use crate::participants::Participant;

use super::detector::TerminationDetector;
use super::state::SimulationState;

/// Notified after every turn is appended
pub trait TurnObserver: Send + Sync {
    fn on_turn(&self, turn: &ConversationTurn);
}

/// Drives the alternating initiator/responder loop
pub struct TurnOrchestrator<I, R>
where
    I: Participant,
    R: Participant,
{
    initiator: I,
    responder: R,
    detector: TerminationDetector,
    max_turns: u32,
    exhaustion: ExhaustionPolicy,
    call_timeout: Duration,
    observer: Option<Arc<dyn TurnObserver>>,
}

impl<I, R> TurnOrchestrator<I, R>
where
    I: Participant,
    R: Participant,
{
    pub fn new(initiator: I, responder: R, config: &SimulationConfig) -> Self {
        Self {
            initiator,
            responder,
            detector: TerminationDetector::from_config(config),
            max_turns: config.max_turns,
            exhaustion: config.exhaustion,
            call_timeout: config.call_timeout(),
            observer: None,
        }
    }

    /// Set an observer for the running turn log
    pub fn with_observer(mut self, observer: Arc<dyn TurnObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Override the per-call timeout
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn detector(&self) -> &TerminationDetector {
        &self.detector
    }

    /// Run one complete simulation.
    ///
    /// Every call starts from an empty transcript, so the same orchestrator can
    /// be run repeatedly or concurrently.
    pub async fn run(&self, cancel: &CancellationToken) -> SimulationResult {
        let mut state = SimulationState::new(self.max_turns);
        state.start();

        info!("Starting simulation");
        info!("Max turns: {}", self.max_turns);

        let outcome = self.drive(&mut state, cancel).await;
        let result = state.finish(outcome);

        match &result.abort {
            Some(reason) => warn!("Simulation aborted: {}", reason),
            None => info!(
                "Simulation completed after {} turns: {}",
                result.turns_used, result.outcome
            ),
        }
        result
    }

    async fn drive(&self, state: &mut SimulationState, cancel: &CancellationToken) -> Outcome {
        loop {
            info!(
                "=== Round {} of {} ===",
                state.rounds_completed() + 1,
                state.max_turns
            );

            if let Err(reason) = self.take_turn(&self.initiator, state, cancel).await {
                state.abort = Some(reason);
                return Outcome::Aborted;
            }

            let reply = match self.take_turn(&self.responder, state, cancel).await {
                Ok(reply) => reply,
                Err(reason) => {
                    state.abort = Some(reason);
                    return Outcome::Aborted;
                }
            };

            // A cancel raised during the responder call outranks a match or an exhausted budget
            if cancel.is_cancelled() {
                state.abort = Some(AbortReason::Cancelled {
                    next_turn: state.transcript.next_index(),
                });
                return Outcome::Aborted;
            }

            if self.detector.matches(&reply) {
                info!("Responder said the forbidden phrase");
                return Outcome::InitiatorVictory;
            }

            if state.budget_exhausted() {
                info!("Turn budget exhausted without a match");
                return match self.exhaustion {
                    ExhaustionPolicy::ResponderVictory => Outcome::ResponderVictory,
                    ExhaustionPolicy::Inconclusive => Outcome::Inconclusive,
                };
            }
        }
    }

    /// Ask one participant for its message and append it.
    ///
    /// The cancel signal is only checked before a call is issued; a call in
    /// flight is allowed to finish or time out.
    async fn take_turn<P: Participant>(
        &self,
        participant: &P,
        state: &mut SimulationState,
        cancel: &CancellationToken,
    ) -> Result<String, AbortReason> {
        let turn_index = state.transcript.next_index();
        let speaker = participant.speaker();

        if cancel.is_cancelled() {
            return Err(AbortReason::Cancelled {
                next_turn: turn_index,
            });
        }

        debug!("Requesting turn {} from {}", turn_index, speaker);
        let call = participant.next_message(&state.transcript);
        let text = match tokio::time::timeout(self.call_timeout, call).await {
            Ok(Ok(text)) => text,
            Ok(Err(error)) => {
                return Err(AbortReason::Channel {
                    turn_index,
                    speaker,
                    error,
                });
            }
            Err(_) => {
                return Err(AbortReason::Channel {
                    turn_index,
                    speaker,
                    error: ChannelError::unreachable(
                        participant.endpoint(),
                        format!("no reply within {:?}", self.call_timeout),
                    ),
                });
            }
        };

        let turn = state.record(speaker, text);
        if let Some(observer) = &self.observer {
            observer.on_turn(turn);
        }
        Ok(turn.text.clone())
    }
}
