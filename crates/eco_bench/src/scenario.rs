use anyhow::{bail, Context, Result};
use eco_core::{InitialSnapshot, Strategy};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub target_round: f64,
    #[serde(default = "default_interval")]
    pub interval: f64,
    #[serde(default = "default_content_dir")]
    pub content_dir: String,
    #[serde(default)]
    pub overrides: HashMap<String, serde_json::Value>,
    /// Shared starting point for every strategy.
    #[serde(default)]
    pub initial: InitialSnapshot,
    pub strategies: Vec<Strategy>,
}

fn default_interval() -> f64 {
    eco_core::DEFAULT_INTERVAL
}

fn default_content_dir() -> String {
    "./content".to_string()
}

/// Directory name for a strategy's outputs.
pub fn strategy_dir_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario file: {}", path.display()))?;
    let scenario: Scenario = serde_json::from_str(&json)
        .with_context(|| format!("parsing scenario file: {}", path.display()))?;
    if scenario.name.is_empty() {
        bail!("scenario 'name' must not be empty");
    }
    if !scenario.target_round.is_finite() || scenario.target_round <= 0.0 {
        bail!("scenario 'target_round' must be > 0");
    }
    if scenario.strategies.is_empty() {
        bail!("scenario 'strategies' must list at least one strategy");
    }
    let mut dirs = HashSet::new();
    for strategy in &scenario.strategies {
        if strategy.name.is_empty() {
            bail!("every strategy needs a non-empty 'name'");
        }
        if !dirs.insert(strategy_dir_name(&strategy.name)) {
            bail!(
                "strategy name '{}' collides with another strategy's output directory",
                strategy.name
            );
        }
    }
    Ok(scenario)
}
