//! Governance Scenario Simulator
//!
//! Builds a world from a TOML configuration, replays a JSON list of steps
//! against it and prints a JSON summary of what happened.

mod scenario;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use dao_core::Amount;
use dao_runtime::{RuntimeConfig, World, WorldReport};
use scenario::{Scenario, StepOutcome};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// World configuration (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Steps to replay (JSON)
    #[arg(short, long, value_name = "FILE")]
    scenario: PathBuf,

    /// Continue past steps that do not behave as expected
    #[arg(long)]
    keep_going: bool,

    /// Include per-account balances and proposals in the summary
    #[arg(short, long)]
    report: bool,

    /// Write the summary to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Summary {
    scenario: String,
    total_steps: usize,
    replayed_steps: usize,
    unexpected: usize,
    #[serde(with = "dao_core::serde_amount")]
    total_supply: Amount,
    proposals: u64,
    outcomes: Vec<StepOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    world: Option<WorldReport>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = RuntimeConfig::load_from_file(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    let contents = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("Failed to read scenario {}", args.scenario.display()))?;
    let scenario: Scenario =
        serde_json::from_str(&contents).context("Failed to parse scenario")?;

    let mut world = World::from_config(&config).context("Failed to build world")?;
    info!(
        scenario = %scenario.name,
        steps = scenario.steps.len(),
        "replaying scenario"
    );

    let summary = replay(&mut world, &config, &scenario, &args);
    let json = serde_json::to_string_pretty(&summary)?;
    match &args.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write summary {}", path.display()))?,
        None => println!("{}", json),
    }

    if summary.unexpected > 0 {
        anyhow::bail!("{} step(s) did not behave as expected", summary.unexpected);
    }
    Ok(())
}

fn replay(world: &mut World, config: &RuntimeConfig, scenario: &Scenario, args: &Args) -> Summary {
    let mut outcomes = Vec::new();
    let mut accounts: BTreeSet<_> = config.genesis.iter().map(|a| a.account).collect();

    for (index, step) in scenario.steps.iter().enumerate() {
        step.op.accounts(&mut accounts);
        let (success, detail) = match step.op.apply(world) {
            Ok(detail) => (true, detail),
            Err(e) => (false, e.to_string()),
        };
        let outcome = StepOutcome {
            index,
            op: step.op.name(),
            success,
            expect_failure: step.expect_failure,
            detail,
        };

        if outcome.as_expected() {
            info!(step = index, op = outcome.op, "{}", outcome.detail);
        } else if success {
            warn!(step = index, op = outcome.op, "expected failure, succeeded: {}", outcome.detail);
        } else {
            error!(step = index, op = outcome.op, "failed: {}", outcome.detail);
        }

        let stop = !outcome.as_expected() && !args.keep_going;
        outcomes.push(outcome);
        if stop {
            break;
        }
    }

    let accounts: Vec<_> = accounts.into_iter().collect();
    Summary {
        scenario: scenario.name.clone(),
        total_steps: scenario.steps.len(),
        replayed_steps: outcomes.len(),
        unexpected: outcomes.iter().filter(|o| !o.as_expected()).count(),
        total_supply: world.ledger().total_supply(),
        proposals: world.engine().proposals_count(),
        outcomes,
        world: args.report.then(|| world.report(&accounts)),
    }
}
