use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod overrides;
mod run_result;
mod runner;
mod scenario;
mod summary;

#[derive(Parser)]
#[command(
    name = "eco_bench",
    about = "Runs competing eco strategies from one starting point and compares them"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every strategy in a scenario file in parallel.
    Run {
        /// Path to the scenario JSON file.
        #[arg(long)]
        scenario: String,
        /// Output directory (default: runs/).
        #[arg(long, default_value = "runs")]
        output_dir: String,
    },
}

fn run(scenario_path: &str, output_dir: &str) -> Result<PathBuf> {
    let scenario = scenario::load_scenario(Path::new(scenario_path))?;

    println!(
        "Loading scenario '{}': {} strategies to round {}",
        scenario.name,
        scenario.strategies.len(),
        scenario.target_round
    );

    // Load content and apply overrides, then re-check what the overrides touched.
    let mut catalog = eco_world::load_catalog(&scenario.content_dir)?;
    overrides::apply_overrides(&mut catalog.constants, &scenario.overrides)?;
    eco_world::validate_catalog(&catalog).context("validating overridden constants")?;

    let initial = eco_world::build_initial_state(&catalog, &scenario.initial)?;

    let scenario_params = serde_json::json!({
        "target_round": scenario.target_round,
        "interval": scenario.interval,
        "content_dir": scenario.content_dir,
        "overrides": scenario.overrides,
    });

    // Create timestamped output directory.
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let run_dir = PathBuf::from(output_dir).join(format!("{}_{}", scenario.name, timestamp));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("creating output directory: {}", run_dir.display()))?;
    std::fs::copy(scenario_path, run_dir.join("scenario.json")).context("copying scenario file")?;

    println!("Output: {}", run_dir.display());
    println!("Running {} strategies in parallel...", scenario.strategies.len());

    let results: Vec<Result<runner::StrategyRun>> = scenario
        .strategies
        .par_iter()
        .map(|strategy| {
            runner::run_plan(
                &catalog,
                &initial,
                strategy,
                scenario.target_round,
                scenario.interval,
                &run_dir.join(scenario::strategy_dir_name(&strategy.name)),
                &scenario.name,
                &scenario_params,
            )
        })
        .collect();

    // Collect results, reporting any failures.
    let mut outcomes = Vec::new();
    let mut run_ids = Vec::new();
    for (strategy, result) in scenario.strategies.iter().zip(results) {
        match result {
            Ok(run) => {
                run_ids.push(run.run_id);
                outcomes.push(run.outcome);
            }
            Err(err) => eprintln!("Strategy '{}' failed: {err:#}", strategy.name),
        }
    }
    if outcomes.is_empty() {
        anyhow::bail!("all strategies failed");
    }

    let comparison = eco_core::compare::summarize(outcomes);
    let report = summary::build_report(
        &comparison,
        &run_ids,
        Uuid::new_v4().to_string(),
        &scenario.name,
        &scenario_params,
    );
    summary::print_table(&scenario.name, scenario.target_round, &report);

    let comparison_path = run_dir.join("comparison.json");
    run_result::write_json_atomic(&comparison_path, &report)
        .with_context(|| format!("writing {}", comparison_path.display()))?;
    println!("Comparison written to {}", comparison_path.display());
    Ok(run_dir)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            scenario,
            output_dir,
        } => {
            run(&scenario, &output_dir)?;
        }
    }
    Ok(())
}
