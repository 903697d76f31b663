//! Purchase queue processing.
//!
//! A batch is staged against a clone of the portfolio. Nothing reaches the
//! live state unless every item validates, cash never dips below zero along
//! the way, and the remaining cash covers the batch's summed buffers.

use crate::ledger::impact;
use crate::{
    AssetId, AssetKind, AutoBuy, Boat, Catalog, DropperClass, EcoState, Farm, FarmPath,
    JerichoSteal, Marker, MarkerKind, Portfolio, Purchase, PurchaseBatch, PurchaseItem, Upgrades,
};

/// Why a batch could not be committed right now.
#[derive(Debug)]
enum Rejection {
    /// Cash ran out partway through. Retried on the next event.
    Unaffordable,
    /// Conflicts with a singleton that could later be sold. Retried on the next `fast_forward`.
    Blocked(String),
    /// Can never succeed. The batch is dropped.
    Invalid(String),
}

struct Staged {
    portfolio: Portfolio,
    buffer: f64,
    messages: Vec<String>,
}

/// Commit as many head batches as are due and affordable at `now`.
///
/// Returns true if anything was bought.
pub(crate) fn process_buy_queue(state: &mut EcoState, catalog: &Catalog, now: f64) -> bool {
    let mut committed = false;
    while !state.queue_blocked {
        let Some(batch) = state.buy_queue.front() else {
            break;
        };
        let gate = match state.buy_gate {
            Some(gate) => gate,
            None => match batch_gate(&state.portfolio, batch) {
                Ok(gate) => {
                    state.buy_gate = Some(gate);
                    gate
                }
                Err(reason) => {
                    drop_head(state, &reason);
                    continue;
                }
            },
        };
        if now < gate {
            break;
        }
        match stage_batch(&state.portfolio, batch, catalog, now) {
            Ok(staged) if staged.portfolio.wallet.cash >= staged.buffer => {
                commit(state, staged, now);
                committed = true;
            }
            Ok(_) | Err(Rejection::Unaffordable) => break,
            Err(Rejection::Blocked(reason)) => {
                state.log.warn(format!(
                    "{reason}; holding the buy queue until the next fast forward"
                ));
                state.queue_blocked = true;
            }
            Err(Rejection::Invalid(reason)) => drop_head(state, &reason),
        }
    }
    committed
}

/// Earliest time the batch may execute: its latest `min_time`, pushed back by
/// any IMF loan it activates that is still on cooldown.
fn batch_gate(portfolio: &Portfolio, batch: &PurchaseBatch) -> Result<f64, String> {
    let mut gate = batch
        .items
        .iter()
        .map(|item| item.min_time)
        .fold(f64::NEG_INFINITY, f64::max);
    for item in &batch.items {
        if let Purchase::ActivateImf { asset } = item.action {
            let farm = portfolio
                .farm(asset)
                .filter(|farm| farm.is_imf())
                .ok_or_else(|| format!("farm {asset} cannot take an IMF loan"))?;
            if let Some(ready) = farm.next_ability_time {
                gate = gate.max(ready);
            }
        }
    }
    Ok(gate)
}

fn drop_head(state: &mut EcoState, reason: &str) {
    state
        .log
        .warn(format!("{reason}; removing the batch from the buy queue"));
    state.buy_queue.pop_front();
    state.buy_gate = None;
}

fn commit(state: &mut EcoState, staged: Staged, now: f64) {
    state.portfolio = staged.portfolio;
    let summary = staged.messages.join(", ");
    for message in staged.messages {
        state.log.info(format!("{message} at time {now}"));
    }
    state.markers.push(Marker {
        time: now,
        message: summary,
        kind: MarkerKind::Buy,
    });
    state.buy_queue.pop_front();
    state.buy_gate = None;
}

fn stage_batch(
    portfolio: &Portfolio,
    batch: &PurchaseBatch,
    catalog: &Catalog,
    now: f64,
) -> Result<Staged, Rejection> {
    let mut shadow = portfolio.clone();
    let mut buffer = 0.0;
    let mut messages = Vec::with_capacity(batch.items.len());
    for item in &batch.items {
        messages.push(stage_item(&mut shadow, item, catalog, now)?);
        if shadow.wallet.cash < 0.0 {
            return Err(Rejection::Unaffordable);
        }
        buffer += item.buffer;
    }
    Ok(Staged {
        portfolio: shadow,
        buffer,
        messages,
    })
}

fn stage_item(
    shadow: &mut Portfolio,
    item: &PurchaseItem,
    catalog: &Catalog,
    now: f64,
) -> Result<String, Rejection> {
    match item.action {
        Purchase::BuyDefense { cost } => {
            impact(&mut shadow.wallet, -cost);
            Ok(format!("Bought a defense for {cost}"))
        }
        Purchase::BuyFarm => buy_farm(shadow, catalog, now),
        Purchase::UpgradeFarm { asset, path } => upgrade_farm(shadow, catalog, asset, path, now),
        Purchase::SellFarm { asset } => sell_farm(shadow, asset),
        Purchase::WithdrawBank { asset } => withdraw_bank(shadow, asset),
        Purchase::ActivateImf { asset } => activate_imf(shadow, catalog, asset, now),
        Purchase::BuyBoatFarm => {
            let id = shadow.insert_asset(now, AssetKind::Boat(Boat { tier: 3 }));
            spend(shadow, id, catalog.boat.cost);
            Ok(format!("Bought boat farm {id}"))
        }
        Purchase::UpgradeBoatFarm { asset } => upgrade_boat(shadow, catalog, asset),
        Purchase::SellBoatFarm { asset } => sell_boat(shadow, catalog, asset),
        Purchase::BuyDropper { class } => {
            let id = shadow.insert_asset(now, AssetKind::Dropper { class });
            spend(shadow, id, catalog.dropper(class).cost);
            Ok(format!("Bought {} {id}", class.label()))
        }
        Purchase::SellDropper { class, asset } => sell_dropper(shadow, catalog, class, asset),
        Purchase::BuySpecialist { class, asset } => buy_specialist(shadow, catalog, class, asset),
        Purchase::RepeatedlyBuy { class, until } => {
            *auto_buy_slot(shadow, class) = Some(AutoBuy {
                until,
                buffer: item.buffer,
            });
            Ok(format!("Buying {}s automatically until {until}", class.label()))
        }
        Purchase::JerichoSteal { amount } => {
            impact(&mut shadow.wallet, amount);
            shadow.jericho = Some(JerichoSteal {
                start: item.min_time,
                amount,
            });
            Ok(format!("Started Jericho steals of {amount}"))
        }
    }
}

fn spend(shadow: &mut Portfolio, id: AssetId, cost: f64) {
    impact(&mut shadow.wallet, -cost);
    shadow.ledger_mut(id).expenses += cost;
}

fn credit(shadow: &mut Portfolio, id: AssetId, amount: f64) {
    let delta = impact(&mut shadow.wallet, amount);
    shadow.ledger_mut(id).revenue += delta;
}

fn auto_buy_slot(shadow: &mut Portfolio, class: DropperClass) -> &mut Option<AutoBuy> {
    match class {
        DropperClass::Druid => &mut shadow.auto_buys.druid,
        DropperClass::SupplyDrop => &mut shadow.auto_buys.supply_drop,
        DropperClass::Heli => &mut shadow.auto_buys.heli,
    }
}

fn buy_farm(shadow: &mut Portfolio, catalog: &Catalog, now: f64) -> Result<String, Rejection> {
    let farm = Farm::from_catalog(catalog, Upgrades::default(), now)
        .ok_or_else(|| Rejection::Invalid("the catalog has no base farm".to_string()))?;
    let id = shadow.insert_asset(now, AssetKind::Farm(farm));
    spend(shadow, id, catalog.farm.cost);
    Ok(format!("Bought farm {id}"))
}

fn upgrade_farm(
    shadow: &mut Portfolio,
    catalog: &Catalog,
    id: AssetId,
    path: FarmPath,
    now: f64,
) -> Result<String, Rejection> {
    let Some(farm) = shadow.farm(id) else {
        return Err(Rejection::Invalid(format!("no farm {id} to upgrade")));
    };
    let current = farm.upgrades;
    let Some(upgrades) = current.raised(path) else {
        return Err(Rejection::Invalid(format!("farm {id} is maxed on {path:?}")));
    };
    if catalog.farm_tier(upgrades).is_none() {
        return Err(Rejection::Invalid(format!(
            "farm {id} cannot be upgraded to {upgrades}"
        )));
    }
    let reaches_five = upgrades.level(path) == 5;
    if reaches_five && shadow.singletons.farm_paths[path.index()] {
        return Err(Rejection::Blocked(format!(
            "a tier-5 farm on the {path:?} path already exists"
        )));
    }
    let cost = catalog
        .farm_upgrade_cost(path, current.level(path))
        .ok_or_else(|| Rejection::Invalid(format!("no upgrade price for {upgrades}")))?;

    spend(shadow, id, cost);
    if let Some(asset) = shadow.assets.get_mut(&id) {
        asset.purchase_time = now;
        if let AssetKind::Farm(farm) = &mut asset.kind {
            farm.retier(catalog, upgrades, now);
        }
    }
    if reaches_five {
        shadow.singletons.farm_paths[path.index()] = true;
    }
    Ok(format!("Upgraded farm {id} to {upgrades}"))
}

fn sell_farm(shadow: &mut Portfolio, id: AssetId) -> Result<String, Rejection> {
    let Some(farm) = shadow.farm(id) else {
        return Err(Rejection::Invalid(format!("no farm {id} to sell")));
    };
    let value = farm.sell_value;
    if let Some(path) = farm.upgrades.tier_five_path() {
        shadow.singletons.farm_paths[path.index()] = false;
    }
    credit(shadow, id, value);
    shadow.assets.remove(&id);
    Ok(format!("Sold farm {id}"))
}

fn withdraw_bank(shadow: &mut Portfolio, id: AssetId) -> Result<String, Rejection> {
    let Some(account) = shadow.farm_mut(id).and_then(|farm| farm.account.as_mut()) else {
        return Err(Rejection::Invalid(format!("farm {id} is not a bank")));
    };
    let value = std::mem::take(&mut account.value);
    credit(shadow, id, value);
    Ok(format!("Withdrew {value} from bank {id}"))
}

fn activate_imf(
    shadow: &mut Portfolio,
    catalog: &Catalog,
    id: AssetId,
    now: f64,
) -> Result<String, Rejection> {
    let Some(farm) = shadow.farm_mut(id).filter(|farm| farm.is_imf()) else {
        return Err(Rejection::Invalid(format!("farm {id} cannot take an IMF loan")));
    };
    farm.next_ability_time = Some(now + catalog.farm.imf_usage_cooldown);
    let amount = catalog.farm.imf_loan_amount;
    // Borrowed cash, not income: the farm's revenue ledger is left alone.
    impact(&mut shadow.wallet, amount);
    shadow.wallet.loan += amount;
    Ok(format!("Took out an IMF loan of {amount} from farm {id}"))
}

fn upgrade_boat(shadow: &mut Portfolio, catalog: &Catalog, id: AssetId) -> Result<String, Rejection> {
    let trade_empire = shadow.singletons.trade_empire;
    let Some(boat) = shadow.boat_mut(id) else {
        return Err(Rejection::Invalid(format!("no boat farm {id} to upgrade")));
    };
    if boat.tier >= 5 {
        return Err(Rejection::Invalid(format!("boat farm {id} is already maxed")));
    }
    if boat.tier + 1 == 5 && trade_empire {
        return Err(Rejection::Blocked("a Trade Empire already exists".to_string()));
    }
    let cost = catalog.boat.upgrade_costs[Catalog::boat_slot(boat.tier).min(1)];
    boat.tier += 1;
    let tier = boat.tier;
    spend(shadow, id, cost);
    if tier == 5 {
        shadow.singletons.trade_empire = true;
    }
    Ok(format!("Upgraded boat farm {id} to tier {tier}"))
}

fn sell_boat(shadow: &mut Portfolio, catalog: &Catalog, id: AssetId) -> Result<String, Rejection> {
    let Some(tier) = shadow.boat_mut(id).map(|boat| boat.tier) else {
        return Err(Rejection::Invalid(format!("no boat farm {id} to sell")));
    };
    credit(shadow, id, catalog.boat.sell_values[Catalog::boat_slot(tier)]);
    if tier == 5 {
        shadow.singletons.trade_empire = false;
    }
    shadow.assets.remove(&id);
    Ok(format!("Sold boat farm {id}"))
}

fn sell_dropper(
    shadow: &mut Portfolio,
    catalog: &Catalog,
    class: DropperClass,
    id: AssetId,
) -> Result<String, Rejection> {
    if shadow.dropper_class(id) != Some(class) {
        return Err(Rejection::Invalid(format!("no {} {id} to sell", class.label())));
    }
    let def = catalog.dropper(class);
    let is_specialist = shadow.singletons.specialist(class) == Some(id);
    let invested = if is_specialist {
        def.cost + def.specialist_cost
    } else {
        def.cost
    };
    credit(shadow, id, catalog.constants.sellback_rate * invested);
    if is_specialist {
        shadow.singletons.set_specialist(class, None);
    }
    shadow.assets.remove(&id);
    Ok(format!("Sold {} {id}", class.label()))
}

fn buy_specialist(
    shadow: &mut Portfolio,
    catalog: &Catalog,
    class: DropperClass,
    id: AssetId,
) -> Result<String, Rejection> {
    if shadow.dropper_class(id) != Some(class) {
        return Err(Rejection::Invalid(format!(
            "{id} is not a {} and cannot become {}",
            class.label(),
            class.specialist_label()
        )));
    }
    if shadow.singletons.specialist(class).is_some() {
        return Err(Rejection::Blocked(format!(
            "{} already exists",
            class.specialist_label()
        )));
    }
    spend(shadow, id, catalog.dropper(class).specialist_cost);
    shadow.singletons.set_specialist(class, Some(id));
    Ok(format!("Upgraded {id} to {}", class.specialist_label()))
}

/// Buy droppers for every class whose auto-buy window is open, while cash covers cost plus buffer.
pub(crate) fn run_auto_buys(state: &mut EcoState, catalog: &Catalog, now: f64) -> bool {
    let mut bought = false;
    for class in [DropperClass::SupplyDrop, DropperClass::Druid, DropperClass::Heli] {
        let Some(auto) = *auto_buy_slot(&mut state.portfolio, class) else {
            continue;
        };
        if now > auto.until {
            continue;
        }
        let cost = catalog.dropper(class).cost;
        if cost <= 0.0 {
            continue;
        }
        while state.portfolio.wallet.cash >= cost + auto.buffer {
            let id = state
                .portfolio
                .insert_asset(now, AssetKind::Dropper { class });
            spend(&mut state.portfolio, id, cost);
            state.log.info(format!(
                "Bought {} {id} at time {now} (automated)",
                class.label()
            ));
            bought = true;
        }
    }
    bought
}
