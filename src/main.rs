use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use parley::config::Transport;
use parley::report::{format_header, format_summary};
use parley::server::{self, AgentCard, ServerState};
use parley::{
    ChannelParticipant, CliConfig, ConfigError, ConsoleReporter, SimulationResult, Speaker,
    TurnOrchestrator, create_engine,
};

/// Parley CLI: relay an adversarial conversation between two agents
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a simulation between the configured initiator and responder
    #[command(name = "run")]
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Host one participant's engine over HTTP
    #[command(name = "serve")]
    Serve {
        #[command(flatten)]
        args: ServeArgs,
    },
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the maximum number of rounds
    #[arg(long)]
    max_turns: Option<u32>,

    /// Override the forbidden phrase
    #[arg(long)]
    phrase: Option<String>,

    /// Reach the initiator at this URL instead of running it in-process
    #[arg(long)]
    initiator_endpoint: Option<String>,

    /// Reach the responder at this URL instead of running it in-process
    #[arg(long)]
    responder_endpoint: Option<String>,

    /// Number of independent simulations to run concurrently
    #[arg(long, default_value = "1")]
    runs: usize,

    /// Print results as JSON instead of the turn log and summary
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Side {
    Initiator,
    Responder,
}

impl From<Side> for Speaker {
    fn from(side: Side) -> Self {
        match side {
            Side::Initiator => Speaker::Initiator,
            Side::Responder => Speaker::Responder,
        }
    }
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Which participant's engine to host
    #[arg(long, value_enum, default_value = "responder")]
    participant: Side,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind (0 picks a free port)
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Run { args }) => handle_run_command(args).await,
        Some(Command::Serve { args }) => handle_serve_command(args).await,
        None => {
            // Default behavior: show help
            eprintln!("No command specified. Use --help for usage information.");
            eprintln!("Example: parley run --max-turns 5");
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr so stdout only carries the turn log and summary
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Base directory for relative objective paths: the config file's directory
fn base_dir_for(config_path: Option<&Path>) -> PathBuf {
    config_path
        .and_then(|p| p.parent())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default())
}

/// Cancel `token` on Ctrl-C
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current call");
            token.cancel();
        }
    });
}

fn load_run_config(args: &RunArgs) -> Result<CliConfig, ConfigError> {
    let mut config = CliConfig::load_or_default(args.config.as_deref())?;

    // Apply CLI overrides
    if let Some(max_turns) = args.max_turns {
        config.simulation.max_turns = max_turns;
    }
    if let Some(phrase) = &args.phrase {
        config.simulation.forbidden_phrase = phrase.clone();
    }
    if let Some(endpoint) = &args.initiator_endpoint {
        config.set_endpoint(Speaker::Initiator, endpoint.clone());
    }
    if let Some(endpoint) = &args.responder_endpoint {
        config.set_endpoint(Speaker::Responder, endpoint.clone());
    }

    config.validate()?;
    Ok(config)
}

type Orchestrator = TurnOrchestrator<ChannelParticipant, ChannelParticipant>;

fn build_orchestrators(
    config: &CliConfig,
    base_dir: &Path,
    runs: usize,
    console: bool,
) -> Result<Vec<Orchestrator>, ConfigError> {
    (1..=runs)
        .map(|run| {
            let initiator = ChannelParticipant::from_config(config, Speaker::Initiator, base_dir)?;
            let responder = ChannelParticipant::from_config(config, Speaker::Responder, base_dir)?;
            let orchestrator = TurnOrchestrator::new(initiator, responder, &config.simulation);

            Ok(match (console, runs) {
                (false, _) => orchestrator,
                (true, 1) => orchestrator.with_observer(Arc::new(ConsoleReporter::new())),
                (true, _) => orchestrator
                    .with_observer(Arc::new(ConsoleReporter::labelled(format!("run {run}")))),
            })
        })
        .collect()
}

async fn handle_run_command(args: RunArgs) -> Result<()> {
    init_logging(args.verbose);
    info!("Parley starting");

    if args.runs == 0 {
        eprintln!("Configuration error: --runs must be at least 1");
        std::process::exit(2);
    }

    let config = load_run_config(&args);
    let orchestrators = config.and_then(|config| {
        let base_dir = base_dir_for(args.config.as_deref());
        build_orchestrators(&config, &base_dir, args.runs, !args.json).map(|o| (config, o))
    });

    // Configuration errors are fatal before any turn is taken
    let (config, orchestrators) = match orchestrators {
        Ok(ready) => ready,
        Err(e) => {
            error!("Configuration error: {}", e);
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    info!("Forbidden phrase: {:?}", config.simulation.forbidden_phrase);
    info!("Simulations: {}", orchestrators.len());

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    if !args.json {
        println!("{}", format_header(&config.simulation.forbidden_phrase));
    }

    // Simulations share no mutable state; each awaits only its own calls
    let results: Vec<SimulationResult> =
        join_all(orchestrators.iter().map(|o| o.run(&cancel))).await;

    print_results(&results, args.json)
}

fn print_results(results: &[SimulationResult], json: bool) -> Result<()> {
    if json {
        let rendered = if let [single] = results {
            serde_json::to_string_pretty(single)
        } else {
            serde_json::to_string_pretty(results)
        };
        println!("{}", rendered.context("Failed to serialize results")?);
    } else {
        for (i, result) in results.iter().enumerate() {
            if results.len() > 1 {
                println!("\n--- run {} ---", i + 1);
            }
            println!("{}", format_summary(result));
        }
    }

    let aborted = results.iter().filter(|r| r.outcome.is_aborted()).count();
    if aborted > 0 {
        eprintln!("\n{aborted} simulation(s) aborted");
        std::process::exit(1);
    }

    Ok(())
}

async fn handle_serve_command(args: ServeArgs) -> Result<()> {
    init_logging(args.verbose);

    let speaker = Speaker::from(args.participant);
    let config = CliConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    let participant = config.participant(speaker);

    let engine_config = match participant.transport(speaker)? {
        Transport::InProcess(engine) => engine,
        Transport::Remote(endpoint) => {
            anyhow::bail!(
                "{} is configured as remote ({}); serve needs an engine",
                speaker,
                endpoint
            )
        }
    };
    let engine = create_engine(engine_config).context("Failed to create engine")?;

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let local_addr = listener.local_addr()?;

    let card = AgentCard {
        name: participant.display_name(speaker),
        description: format!("Parley {} participant", speaker.key()),
        url: format!("http://{local_addr}/"),
    };
    println!("{} endpoint: {}", card.name, card.url);

    let shutdown = CancellationToken::new();
    cancel_on_ctrl_c(shutdown.clone());

    server::serve(listener, ServerState::new(engine, card), shutdown)
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}
