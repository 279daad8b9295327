//! Replay one planning request from a scenario file
//!
//! Usage:
//!   marga-replay --scenario demos/scenarios/block_on_route.yaml
//!   marga-replay --scenario demos/scenarios/block_on_route.yaml --config demos/marga.toml --detour right
//!
//! Enable debug logging to see every relaxation round:
//!   RUST_LOG=debug marga-replay --scenario ...

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

use marga::{DetourMode, LogSink, Planner, PlannerConfig, Result, Scenario};

/// Replay a path repair scenario and print the plan as JSON
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario YAML file
    #[arg(short, long)]
    scenario: PathBuf,

    /// Planner configuration TOML (defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Detour mode override: left, right or ignore
    #[arg(short, long)]
    detour: Option<DetourMode>,

    /// Print the raw working path instead of the resampled route
    #[arg(long)]
    raw: bool,
}

fn run(args: &Args) -> Result<String> {
    let mut config = match &args.config {
        Some(path) => PlannerConfig::load(path)?,
        None => PlannerConfig::default(),
    };
    let scenario = Scenario::load(&args.scenario)?;
    info!("Scenario '{}'", scenario.name);

    if let Some(detour) = args.detour.or(scenario.detour) {
        config.solver.detour = detour;
    }
    if args.raw {
        config.path.normalize_output = false;
    }

    let mut planner = Planner::with_sink(config, Box::new(LogSink))?;
    planner.configure()?;
    planner.activate()?;
    planner.set_cost_grid(scenario.cost_grid()?);
    planner.set_path(scenario.reference_route());

    let plan = planner.create_plan(scenario.start, scenario.goal)?;
    serde_json::to_string_pretty(&plan).map_err(|e| marga::PlannerError::Config(e.to_string()))
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("{}", e);
            eprintln!("marga-replay: {}", e);
            std::process::exit(1);
        }
    }
}
