use anyhow::{bail, Result};
use eco_core::Constants;
use std::collections::HashMap;

const VALID_KEYS: &[&str] = &[
    "eco_interval",
    "eco_delay",
    "max_send_slots",
    "sellback_rate",
    "fortified_multiplier",
    "camo_multiplier",
    "regrow_multiplier",
    "fortified_round",
    "camo_round",
    "regrow_round",
];

pub fn apply_overrides(
    constants: &mut Constants,
    overrides: &HashMap<String, serde_json::Value>,
) -> Result<()> {
    for (key, value) in overrides {
        match key.as_str() {
            "eco_interval" => constants.eco_interval = as_f64(key, value)?,
            "eco_delay" => constants.eco_delay = as_f64(key, value)?,
            "max_send_slots" => constants.max_send_slots = as_usize(key, value)?,
            "sellback_rate" => constants.sellback_rate = as_f64(key, value)?,
            "fortified_multiplier" => constants.fortified_multiplier = as_f64(key, value)?,
            "camo_multiplier" => constants.camo_multiplier = as_f64(key, value)?,
            "regrow_multiplier" => constants.regrow_multiplier = as_f64(key, value)?,
            "fortified_round" => constants.fortified_round = as_u32(key, value)?,
            "camo_round" => constants.camo_round = as_u32(key, value)?,
            "regrow_round" => constants.regrow_round = as_u32(key, value)?,
            _ => bail!(
                "unknown override key '{key}'. Valid keys: {}",
                VALID_KEYS.join(", ")
            ),
        }
    }
    Ok(())
}

fn as_f64(key: &str, value: &serde_json::Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| anyhow::anyhow!("override '{key}': expected a number, got {value}"))
}

fn as_u64(key: &str, value: &serde_json::Value) -> Result<u64> {
    value.as_u64().ok_or_else(|| {
        anyhow::anyhow!("override '{key}': expected a positive integer, got {value}")
    })
}

fn as_u32(key: &str, value: &serde_json::Value) -> Result<u32> {
    let val = as_u64(key, value)?;
    u32::try_from(val)
        .map_err(|_| anyhow::anyhow!("override '{key}': value {val} exceeds u32 range"))
}

fn as_usize(key: &str, value: &serde_json::Value) -> Result<usize> {
    let val = as_u64(key, value)?;
    usize::try_from(val)
        .map_err(|_| anyhow::anyhow!("override '{key}': value {val} exceeds usize range"))
}
