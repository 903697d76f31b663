use super::*;
use crate::test_fixtures::{base_catalog, base_state, state_with_wallet, ROUND_LENGTH};

mod compare;
mod purchases;

// --- Shared test helpers ------------------------------------------------

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

/// Put `state` at the start of `round` without running anything in between.
fn at_round(state: &mut EcoState, round: u32) {
    state.meta.time = state.clock.round_start(round);
    state.meta.round = round;
    state.send_slots.unlock_time = state.meta.time;
}

fn add_farm(state: &mut EcoState, catalog: &Catalog, levels: [u8; 3], purchase_time: f64) -> AssetId {
    let upgrades = Upgrades(levels);
    let farm = Farm::from_catalog(catalog, upgrades, purchase_time).unwrap();
    if let Some(path) = upgrades.tier_five_path() {
        state.portfolio.singletons.farm_paths[path.index()] = true;
    }
    state
        .portfolio
        .insert_asset(purchase_time, AssetKind::Farm(farm))
}

fn add_dropper(state: &mut EcoState, class: DropperClass, purchase_time: f64) -> AssetId {
    state
        .portfolio
        .insert_asset(purchase_time, AssetKind::Dropper { class })
}

fn add_boat(state: &mut EcoState, tier: u8) -> AssetId {
    if tier == 5 {
        state.portfolio.singletons.trade_empire = true;
    }
    state
        .portfolio
        .insert_asset(0.0, AssetKind::Boat(Boat { tier }))
}

fn queue_buy(state: &mut EcoState, items: Vec<PurchaseItem>) {
    state.buy_queue.push_back(PurchaseBatch::from(items));
}

fn set_account(state: &mut EcoState, id: AssetId, value: f64) {
    let farm = state.portfolio.farm_mut(id).unwrap();
    farm.account.as_mut().unwrap().value = value;
}

/// Direct payouts in `events`, as `(time, amount, source)`.
fn direct_payouts(events: &[PayoutEvent]) -> Vec<(f64, f64, PayoutSource)> {
    events
        .iter()
        .filter_map(|event| match event.kind {
            PayoutKind::Direct { amount, source } => Some((event.time, amount, source)),
            _ => None,
        })
        .collect()
}
