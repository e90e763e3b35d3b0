use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dolina::{engine::Engine, recorder::RunLedger, scenario::Scenario};

#[derive(Debug, Parser)]
#[command(author, version, about = "Doline growth simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/karst_plain.yaml")]
    scenario: PathBuf,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the step budget (scenario total_time / dt when omitted)
    #[arg(long)]
    steps: Option<u64>,

    /// Enable merging regardless of the scenario setting
    #[arg(long)]
    merge: bool,

    /// Directory for the CSV series, checkpoints, and the run ledger
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut scenario = Scenario::load_from_path(&cli.scenario)?;
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    if cli.merge {
        scenario.merge_enabled = true;
    }

    let ledger = RunLedger::open(cli.out_dir.join("simulation_index.tsv"))?;
    ledger.append(&scenario)?;

    let mut engine = Engine::new(scenario, Some(cli.out_dir.as_path()))?;
    let summary = engine.run(cli.steps)?;

    println!(
        "Scenario '{}' stopped after {} steps ({:?}): {} depressions remain \
         (largest area {:.3}, {} went extinct). Series in {}",
        summary.scenario_name,
        summary.steps_run,
        summary.termination,
        summary.final_count,
        summary.max_area,
        summary.extinct_total,
        cli.out_dir.join(format!("{}.csv", summary.scenario_name)).display(),
    );
    Ok(())
}
