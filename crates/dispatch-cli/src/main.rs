//! heli-dispatch - compare greedy and optimal helicopter dispatch for a scenario.
//!
//! Usage:
//!   heli-dispatch --scenario demos/scenario.json --config demos/config.json

use anyhow::{Context, Result};
use clap::Parser;
use heli_dispatch::{load_scenario, run_strategies, AppConfig, SolverChoice, StrategyChoice};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "heli_dispatch=info,dispatch_core=info,dispatch_cbc=info";

#[derive(Parser, Debug)]
#[command(author, version, about = "Wildfire helicopter dispatch: basic vs optimized")]
struct Args {
    /// Scenario JSON with fires, bases, units and model specs
    #[arg(long)]
    scenario: PathBuf,

    /// Configuration JSON; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// MILP solver used for optimized dispatch
    #[arg(long, value_enum, default_value_t = SolverChoice::Cbc)]
    solver: SolverChoice,

    /// Path to the CBC executable (overrides config and environment)
    #[arg(long)]
    solver_path: Option<String>,

    #[arg(long, value_enum, default_value_t = StrategyChoice::Both)]
    strategy: StrategyChoice,

    /// Print both results as JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(path) = args.solver_path {
        config.solver.executable_path = path;
    }

    let scenario = load_scenario(&args.scenario, &config)?;
    tracing::info!(
        fires = scenario.fires.len(),
        bases = scenario.bases.len(),
        solver = ?args.solver,
        "Loaded scenario"
    );

    let scenario = Arc::new(scenario);
    let report = run_strategies(scenario.clone(), &config, args.solver, args.strategy).await?;

    if args.json {
        println!("{}", report.to_json().context("failed to encode report")?);
    } else {
        print!("{}", report.render_text(&scenario));
    }
    Ok(())
}
