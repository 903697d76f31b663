use eco_core::{EcoSummary, Marker};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Per-strategy record written to `<strategy>/result.json`.
#[derive(Debug, Serialize)]
pub struct RunResult {
    pub run_schema_version: u32,
    pub run_status: String,
    pub run_id: String,
    pub git_sha: String,
    pub git_dirty: bool,
    pub scenario_name: String,
    pub strategy_name: String,
    pub scenario_params: serde_json::Value,
    pub time_start: f64,
    pub time_end: f64,
    pub round_start: u32,
    pub round_end: u32,
    pub wall_time_ms: u64,
    pub summary: EcoSummary,
    pub markers: Vec<Marker>,
    pub warnings: Vec<String>,
    pub trajectory_path: String,
    pub trajectory_samples: usize,
}

impl RunResult {
    pub fn write_atomic(&self, path: &Path) -> anyhow::Result<()> {
        write_json_atomic(path, self)
    }
}

/// Write JSON atomically: write to `.tmp` then rename.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(value)?;
    let mut file = std::fs::File::create(&tmp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

pub fn git_sha() -> String {
    env!("GIT_SHA").to_string()
}

pub fn git_dirty() -> bool {
    env!("GIT_DIRTY") == "true"
}
