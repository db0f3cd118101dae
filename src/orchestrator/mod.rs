pub mod detector;
pub mod state;
pub mod turn_loop;

pub use detector::TerminationDetector;
pub use state::SimulationState;
pub use turn_loop::{TurnObserver, TurnOrchestrator};
