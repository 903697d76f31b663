use crate::run_result::{self, RunResult};
use anyhow::{Context, Result};
use eco_core::{Catalog, EcoState, Strategy, StrategyOutcome, Target};
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

pub struct StrategyRun {
    pub outcome: StrategyOutcome,
    pub run_id: String,
}

/// Simulate one strategy and write its trajectory and result under `strategy_dir`.
#[allow(clippy::too_many_arguments)]
pub fn run_plan(
    catalog: &Catalog,
    initial: &EcoState,
    strategy: &Strategy,
    target_round: f64,
    interval: f64,
    strategy_dir: &Path,
    scenario_name: &str,
    scenario_params: &serde_json::Value,
) -> Result<StrategyRun> {
    let run_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    std::fs::create_dir_all(strategy_dir)
        .with_context(|| format!("creating strategy directory: {}", strategy_dir.display()))?;

    let outcome = eco_core::run_strategy(
        initial,
        catalog,
        strategy,
        Target::Round(target_round),
        interval,
    );

    let trajectory_path = strategy_dir.join("trajectory.csv");
    let mut writer = csv::Writer::from_path(&trajectory_path)
        .with_context(|| format!("opening {}", trajectory_path.display()))?;
    for sample in &outcome.state.trajectory {
        writer.serialize(sample).context("writing trajectory row")?;
    }
    writer.flush().context("flushing trajectory")?;

    #[allow(clippy::cast_possible_truncation)]
    let wall_time_ms = start.elapsed().as_millis() as u64;

    let result = RunResult {
        run_schema_version: 1,
        run_status: "completed".to_string(),
        run_id: run_id.clone(),
        git_sha: run_result::git_sha(),
        git_dirty: run_result::git_dirty(),
        scenario_name: scenario_name.to_string(),
        strategy_name: strategy.name.clone(),
        scenario_params: scenario_params.clone(),
        time_start: initial.meta.time,
        time_end: outcome.state.meta.time,
        round_start: initial.meta.round,
        round_end: outcome.state.meta.round,
        wall_time_ms,
        summary: outcome.summary.clone(),
        markers: outcome.state.markers.clone(),
        warnings: outcome.state.log.warnings().map(str::to_string).collect(),
        trajectory_path: "trajectory.csv".to_string(),
        trajectory_samples: outcome.state.trajectory.len(),
    };
    result
        .write_atomic(&strategy_dir.join("result.json"))
        .context("writing result.json")?;

    tracing::info!(
        strategy = %strategy.name,
        cash = outcome.summary.cash,
        eco = outcome.summary.eco,
        wall_time_ms,
        "strategy finished"
    );

    Ok(StrategyRun { outcome, run_id })
}
