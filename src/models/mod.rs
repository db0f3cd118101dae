mod result;
mod transcript;

pub use result::{AbortReason, Outcome, SimulationResult};
pub use transcript::{ConversationTurn, Speaker, Transcript};
