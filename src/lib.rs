pub mod channel;
pub mod config;
pub mod engine;
pub mod models;
pub mod orchestrator;
pub mod participants;
pub mod prompts;
pub mod report;
pub mod server;

// Re-export main types
pub use channel::{ChannelError, HttpChannel, LocalChannel, MessageChannel};
pub use config::{CliConfig, ConfigError, SimulationConfig};
pub use engine::{EngineConfig, EngineError, ReasoningEngine, create_engine};
pub use models::{AbortReason, ConversationTurn, Outcome, SimulationResult, Speaker, Transcript};
pub use orchestrator::{TerminationDetector, TurnObserver, TurnOrchestrator};
pub use participants::{ChannelParticipant, Participant};
pub use report::ConsoleReporter;
