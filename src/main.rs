//! GreenRoute CLI
//!
//! - `plan`: plan a trip from a JSON request file, print the itinerary
//! - `prompt`: print the compiled generation request without calling a model

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use greenroute::{
    compile, logging, GreenRouteConfig, PlanError, TerminalError, TripPlanner, TripRequest,
    WireTripRequest,
};

/// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_CONFIG_ERROR: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "greenroute", version, about = "Plan sustainable trips with an LLM, validated")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan a trip and print the accepted itinerary as JSON
    Plan {
        /// TOML configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Trip request JSON file
        #[arg(long)]
        request: PathBuf,
    },
    /// Print the generation request for a trip
    Prompt {
        #[arg(long)]
        request: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(cli.json_logs) {
        eprintln!("Warning: logging not initialized: {}", e);
    }

    let code = match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_CONFIG_ERROR
        }
    };
    std::process::exit(code);
}

async fn run(command: Command) -> anyhow::Result<i32> {
    match command {
        Command::Prompt { request } => {
            let trip = load_request(&request)?;
            let compiled = compile(&trip, &[]);
            println!("{}\n\n{}", compiled.system(), compiled.prompt());
            Ok(EXIT_SUCCESS)
        }
        Command::Plan { config, request } => {
            let config = match config {
                Some(path) => GreenRouteConfig::load(&path)?,
                None => GreenRouteConfig::default(),
            };
            let planner =
                TripPlanner::from_config(&config).context("failed to set up generation service")?;
            let trip = load_request(&request)?;

            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("interrupt received");
                    on_signal.cancel();
                }
            });

            match planner.plan_trip_with_cancel(&trip, &cancel).await {
                Ok(itinerary) => {
                    println!("{}", serde_json::to_string_pretty(&itinerary)?);
                    Ok(EXIT_SUCCESS)
                }
                Err(PlanError::Terminal(err)) => {
                    report_terminal(&err);
                    Ok(EXIT_FAILURE)
                }
                Err(PlanError::Cancelled) => {
                    eprintln!("Cancelled");
                    Ok(EXIT_FAILURE)
                }
            }
        }
    }
}

fn load_request(path: &Path) -> anyhow::Result<TripRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request {}", path.display()))?;
    let wire: WireTripRequest = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse request {}", path.display()))?;
    Ok(TripRequest::from_wire(wire)?)
}

fn report_terminal(err: &TerminalError) {
    error!(attempts = err.attempt_count(), "planning failed");
    eprintln!("Error: {}", err);
    for record in err.attempts() {
        eprintln!(
            "  attempt {}: {} failure: {}",
            record.attempt,
            record.failure.kind(),
            record.failure
        );
    }
}
