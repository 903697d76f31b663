//! Content loading and snapshot construction shared between eco_cli and eco_bench.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use eco_core::{
    BoatDef, Catalog, CatalogIndex, Constants, DropperClass, DropperDef, EcoState, FarmDef,
    FarmPath, HeroDef, InitialSnapshot, RoundTable, StrategyDef, StrategyId, Upgrades,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Deserialize)]
struct ConstantsFile {
    content_version: String,
    constants: Constants,
}

#[derive(Deserialize)]
struct StrategiesFile {
    strategies: Vec<StrategyDef>,
}

#[derive(Deserialize)]
struct AltEcoFile {
    boat: BoatDef,
    druid: DropperDef,
    supply_drop: DropperDef,
    heli: DropperDef,
    hero: HeroDef,
}

fn read_json<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<T> {
    let text = std::fs::read_to_string(dir.join(name)).with_context(|| format!("reading {name}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {name}"))
}

/// Checks the catalog for authoring errors the engine cannot recover from.
///
/// Catches mistakes like: a missing `Zero` strategy, a strategy whose window
/// closes before it opens, a free dropper, a farm tier that cannot be reached by upgrading, or
/// a round table the clock cannot be built from.
pub fn validate_catalog(catalog: &Catalog) -> Result<()> {
    let c = &catalog.constants;
    ensure!(c.eco_interval > 0.0, "eco_interval must be positive, got {}", c.eco_interval);
    ensure!(c.eco_delay > 0.0, "eco_delay must be positive, got {}", c.eco_delay);
    ensure!(c.max_send_slots > 0, "max_send_slots must be at least 1");
    ensure!(
        (0.0..=1.0).contains(&c.sellback_rate),
        "sellback_rate {} is outside [0, 1]",
        c.sellback_rate
    );

    // Droppers: auto-buy loops spend until cash runs out, so a free dropper never stops.
    for class in DropperClass::ALL {
        let def = catalog.dropper(class);
        ensure!(def.cost > 0.0, "{} cost must be positive, got {}", class.label(), def.cost);
    }

    // Round table.
    let rounds = &catalog.rounds;
    ensure!(!rounds.natural_send_lengths.is_empty(), "round table is empty");
    ensure!(
        rounds.natural_send_lengths.len() == rounds.max_stall_times.len(),
        "round table has {} natural send lengths but {} stall times",
        rounds.natural_send_lengths.len(),
        rounds.max_stall_times.len()
    );
    for (round, length) in rounds.natural_send_lengths.iter().enumerate() {
        ensure!(*length > 0.0, "round {round} has non-positive natural send length {length}");
    }

    // Strategies.
    let mut seen = HashSet::new();
    for def in &catalog.strategies {
        ensure!(seen.insert(&def.id), "strategy '{}' is defined twice", def.id);
        ensure!(
            def.start_round <= def.end_round,
            "strategy '{}' ends (round {}) before it starts (round {})",
            def.id,
            def.end_round,
            def.start_round
        );
        ensure!(
            def.price >= 0.0 && def.duration >= 0.0,
            "strategy '{}' has a negative price or duration",
            def.id
        );
    }
    ensure!(
        seen.contains(&StrategyId::zero()),
        "strategy '{}' is missing",
        StrategyId::ZERO
    );

    // Farm tiers: the base farm exists and every tier is one upgrade away from another.
    let tiers: HashSet<Upgrades> = catalog.farm.tiers.iter().map(|t| t.upgrades).collect();
    ensure!(
        tiers.contains(&Upgrades::default()),
        "farm tier 0-0-0 is missing"
    );
    for upgrades in &tiers {
        if *upgrades == Upgrades::default() {
            continue;
        }
        let reachable = FarmPath::ALL.into_iter().any(|path| {
            let level = upgrades.level(path);
            if level == 0 {
                return false;
            }
            let mut lower = upgrades.0;
            lower[path.index()] = level - 1;
            tiers.contains(&Upgrades(lower))
        });
        ensure!(reachable, "farm tier {upgrades} cannot be reached by upgrading");
    }
    Ok(())
}

pub fn load_catalog(content_dir: &str) -> Result<Catalog> {
    let dir = Path::new(content_dir);
    let constants_file: ConstantsFile = read_json(dir, "constants.json")?;
    let rounds: RoundTable = read_json(dir, "rounds.json")?;
    let strategies_file: StrategiesFile = read_json(dir, "strategies.json")?;
    let farm: FarmDef = read_json(dir, "farms.json")?;
    let alt: AltEcoFile = read_json(dir, "alt_eco.json")?;

    let mut catalog = Catalog {
        content_version: constants_file.content_version,
        constants: constants_file.constants,
        rounds,
        strategies: strategies_file.strategies,
        farm,
        boat: alt.boat,
        druid: alt.druid,
        supply_drop: alt.supply_drop,
        heli: alt.heli,
        hero: alt.hero,
        index: CatalogIndex::default(),
    };
    catalog.reindex();
    validate_catalog(&catalog)
        .with_context(|| format!("validating content in {}", dir.display()))?;
    tracing::info!(
        version = %catalog.content_version,
        strategies = catalog.strategies.len(),
        farm_tiers = catalog.farm.tiers.len(),
        "loaded catalog"
    );
    Ok(catalog)
}

pub fn load_snapshot(path: &Path) -> Result<InitialSnapshot> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing snapshot {}", path.display()))
}

pub fn build_initial_state(catalog: &Catalog, snapshot: &InitialSnapshot) -> Result<EcoState> {
    EcoState::from_snapshot(snapshot, catalog).context("building initial state")
}
