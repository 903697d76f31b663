//! Payout scheduling: every income event due in `(now, target]`.
//!
//! The scheduler never mutates state. Each source is enumerated independently
//! and the result is stable-sorted by time, so events sharing a timestamp keep
//! source order: eco, farms (ability, then periodic), droppers, round-start
//! bonuses, Jericho, and finally the sentinel.

use crate::{
    Asset, AssetId, Catalog, DropperClass, EcoState, Farm, PayoutEvent, PayoutKind, PayoutSource,
};

pub fn schedule(state: &EcoState, catalog: &Catalog, target: f64) -> Vec<PayoutEvent> {
    let now = state.meta.time;
    let mut events = Vec::new();

    eco_payouts(now, target, catalog.constants.eco_interval, &mut events);
    for (asset, farm) in state.portfolio.farms() {
        ability_payouts(now, target, catalog, asset.id, farm, &mut events);
        farm_payouts(state, catalog, asset, farm, target, &mut events);
    }
    for class in DropperClass::ALL {
        dropper_payouts(state, catalog, class, target, &mut events);
    }
    round_start_payouts(state, catalog, target, &mut events);
    jericho_payouts(state, catalog, target, &mut events);
    events.push(PayoutEvent {
        time: target,
        kind: PayoutKind::Sentinel,
    });

    // Stable: bank interest stays directly ahead of its deposit.
    events.sort_by(|a, b| a.time.total_cmp(&b.time));
    events
}

fn direct(time: f64, amount: f64, source: PayoutSource) -> PayoutEvent {
    PayoutEvent {
        time,
        kind: PayoutKind::Direct { amount, source },
    }
}

/// Eco pays on a fixed grid of absolute time, independent of `now`.
fn eco_payouts(now: f64, target: f64, interval: f64, events: &mut Vec<PayoutEvent>) {
    if interval <= 0.0 {
        return;
    }
    let mut k = (now / interval).floor() + 1.0;
    while interval * k <= target {
        events.push(PayoutEvent {
            time: interval * k,
            kind: PayoutKind::Eco,
        });
        k += 1.0;
    }
}

/// First occurrence of `anchor + k * cooldown` (k >= 0) strictly after `now`.
fn first_after(anchor: f64, cooldown: f64, now: f64) -> f64 {
    if anchor > now {
        return anchor;
    }
    let k = ((now - anchor) / cooldown).floor() + 1.0;
    anchor + k * cooldown
}

fn ability_payouts(
    now: f64,
    target: f64,
    catalog: &Catalog,
    id: AssetId,
    farm: &Farm,
    events: &mut Vec<PayoutEvent>,
) {
    let cooldown = catalog.farm.monkeynomics_usage_cooldown;
    let Some(next) = farm.next_ability_time else {
        return;
    };
    if !farm.is_monkeynomics() || cooldown <= 0.0 {
        return;
    }
    let mut time = first_after(next, cooldown, now);
    while time <= target {
        events.push(direct(
            time,
            catalog.farm.monkeynomics_payout,
            PayoutSource::Ability(id),
        ));
        time += cooldown;
    }
}

/// Index range `[first, end)` of payouts still owed in the current round.
#[allow(clippy::cast_possible_truncation)] // payout indices are small
fn current_round_window(
    now: f64,
    purchase: f64,
    round_start: f64,
    length: f64,
    frequency: f64,
    bought_this_round: bool,
) -> (i64, i64) {
    if bought_this_round {
        let first = (frequency * (now - purchase) / length - 1.0).floor() as i64 + 1;
        let remaining = 1.0 - (purchase - round_start) / length;
        let end = (frequency * remaining - 1.0).ceil() as i64 - 1;
        (first, end)
    } else {
        let first = (frequency * (now - round_start) / length).floor() as i64 + 1;
        (first, frequency as i64)
    }
}

/// Periodic farm income, spread over each round's natural send length.
#[allow(clippy::cast_precision_loss)]
fn farm_payouts(
    state: &EcoState,
    catalog: &Catalog,
    asset: &Asset,
    farm: &Farm,
    target: f64,
    events: &mut Vec<PayoutEvent>,
) {
    if farm.frequency == 0 {
        return;
    }
    let clock = &state.clock;
    let now = state.meta.time;
    let frequency = f64::from(farm.frequency);
    let purchase = asset.purchase_time;
    let purchase_round = clock.round_for_time(purchase);
    let current_round = state.meta.round;

    let mut round = current_round.max(purchase_round);
    while round <= clock.last_round() {
        let start = clock.round_start(round);
        if start > target {
            return;
        }
        let length = clock.natural_send_length(round);
        let (first, end) = if round == current_round {
            current_round_window(now, purchase, start, length, frequency, round == purchase_round)
        } else {
            (0, i64::from(farm.frequency))
        };
        for i in first.max(0)..end {
            let time = if round == purchase_round {
                purchase + (i + 1) as f64 * length / frequency
            } else {
                start + i as f64 * length / frequency
            };
            if time > target {
                return;
            }
            if time > now {
                let fresh_round = i == 0 && round > purchase_round;
                push_farm_payout(state, catalog, asset.id, farm, time, fresh_round, events);
            }
        }
        round += 1;
    }
}

fn push_farm_payout(
    state: &EcoState,
    catalog: &Catalog,
    id: AssetId,
    farm: &Farm,
    time: f64,
    fresh_round: bool,
    events: &mut Vec<PayoutEvent>,
) {
    let def = &catalog.farm;
    if farm.is_bank() {
        if fresh_round {
            events.push(PayoutEvent {
                time,
                kind: PayoutKind::BankInterest { asset: id },
            });
        }
        events.push(PayoutEvent {
            time,
            kind: PayoutKind::BankDeposit {
                asset: id,
                amount: farm.payout,
            },
        });
        return;
    }
    let amount = if fresh_round && farm.upgrades.bottom() == 5 {
        farm.payout + def.wall_street_bonus
    } else if farm.upgrades.top() == 4 && state.portfolio.singletons.farm_paths[0] {
        farm.payout * def.banana_central_multiplier
    } else {
        farm.payout
    };
    events.push(direct(time, amount, PayoutSource::Farm(id)));
}

fn dropper_payouts(
    state: &EcoState,
    catalog: &Catalog,
    class: DropperClass,
    target: f64,
    events: &mut Vec<PayoutEvent>,
) {
    let def = catalog.dropper(class);
    if def.usage_cooldown <= 0.0 {
        return;
    }
    let now = state.meta.time;
    let specialist = state.portfolio.singletons.specialist(class);
    for asset in state.portfolio.droppers(class) {
        let amount = match def.specialist_payout {
            Some(payout) if specialist == Some(asset.id) => payout,
            _ => def.payout,
        };
        let anchor = asset.purchase_time + def.initial_cooldown;
        let mut time = first_after(anchor, def.usage_cooldown, now);
        while time <= target {
            events.push(direct(time, amount, PayoutSource::Dropper(asset.id)));
            time += def.usage_cooldown;
        }
    }
}

/// Boat income and the Spirit of the Forest bonus, paid at each round start.
fn round_start_payouts(
    state: &EcoState,
    catalog: &Catalog,
    target: f64,
    events: &mut Vec<PayoutEvent>,
) {
    let boat_total = boat_round_payout(state, catalog);
    let spirit_bonus = if state.portfolio.singletons.spirit_of_the_forest.is_some() {
        catalog.druid.specialist_round_bonus
    } else {
        0.0
    };
    if boat_total <= 0.0 && spirit_bonus <= 0.0 {
        return;
    }

    let clock = &state.clock;
    let now = state.meta.time;
    let mut round = state.meta.round + 1;
    while round <= clock.last_round() {
        let time = clock.round_start(round);
        if time > target {
            break;
        }
        if time > now {
            if boat_total > 0.0 {
                events.push(direct(time, boat_total, PayoutSource::Boats));
            }
            if spirit_bonus > 0.0 {
                events.push(direct(time, spirit_bonus, PayoutSource::SpiritBonus));
            }
        }
        round += 1;
    }
}

/// Total paid by the boat fleet at one round start, including the Trade Empire boost.
pub fn boat_round_payout(state: &EcoState, catalog: &Catalog) -> f64 {
    let def = &catalog.boat;
    let boats: Vec<_> = state.portfolio.boats().collect();
    if boats.is_empty() {
        return 0.0;
    }
    let multiplier = if state.portfolio.singletons.trade_empire {
        let boosted = u32::try_from(boats.len() - 1)
            .unwrap_or(u32::MAX)
            .min(def.trade_empire_max_boats);
        1.0 + def.trade_empire_bonus * f64::from(boosted)
    } else {
        1.0
    };
    boats
        .iter()
        .map(|boat| multiplier * def.payouts[Catalog::boat_slot(boat.tier)])
        .sum()
}

fn jericho_payouts(
    state: &EcoState,
    catalog: &Catalog,
    target: f64,
    events: &mut Vec<PayoutEvent>,
) {
    let Some(steal) = state.portfolio.jericho else {
        return;
    };
    let interval = catalog.hero.jericho_steal_interval;
    if catalog.hero.jericho_steals == 0 || interval <= 0.0 {
        return;
    }
    let last = steal.start + f64::from(catalog.hero.jericho_steals - 1) * interval;
    let end = target.min(last);
    let now = state.meta.time;
    let mut k = 0.0;
    while steal.start + k * interval <= end {
        let time = steal.start + k * interval;
        if time > now {
            events.push(direct(time, steal.amount, PayoutSource::Jericho));
        }
        k += 1.0;
    }
}
