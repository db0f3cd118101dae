mod settings;

pub use settings::{
    CliConfig, ConfigError, ExhaustionPolicy, MatchMode, ParticipantConfig, SimulationConfig, Transport,
    default_config_path,
};
