use crate::eco_queue::{change_strategy, correct_eco_queue};
use crate::ledger::impact;
use crate::purchases::{process_buy_queue, run_auto_buys};
use crate::schedule::schedule;
use crate::{
    AssetId, Catalog, EcoQueueEntry, EcoState, PayoutEvent, PayoutKind, PayoutSource, StrategyId,
    TrajectorySample,
};

/// What a single `advance` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Reached the (possibly clamped) target.
    Completed,
    /// Stopped early after a purchase or an exhausted send; call again to continue.
    Truncated,
    /// Target was not ahead of the current time. Nothing changed except the log.
    Skipped,
}

/// Where `fast_forward` should stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    Time(f64),
    Round(f64),
}

impl Target {
    pub fn resolve(self, state: &EcoState) -> f64 {
        match self {
            Target::Time(time) => time,
            Target::Round(round) => state.clock.time_for_round(round),
        }
    }
}

pub const DEFAULT_INTERVAL: f64 = 0.1;

/// Advance the simulation by one event window ending at `target`.
///
/// Order of operations:
/// 1. Correct the eco queue; shrink the window to the next queued switch.
/// 2. Drop to the Zero send if the active send's window has closed; clamp
///    the target to the send's last eligible moment.
/// 3. Schedule every payout in `(now, target]`.
/// 4. For each event: run sends up to its time, award it, and at the end of
///    each same-time run process the buy queue and auto-buys. Any purchase
///    ends the window at that event.
/// 5. Set time and round, and apply a queued switch that is now due.
pub fn advance(state: &mut EcoState, catalog: &Catalog, target: f64) -> AdvanceOutcome {
    let mut target = target;

    correct_eco_queue(state, catalog);
    if let Some(head) = state.eco_queue.front() {
        target = target.min(head.time);
    }
    target = clamp_to_send_window(state, catalog, target);

    // Queue correction runs even when nothing else does, so a skipped call can
    // still apply a due switch. A second skipped call changes only the log.
    if target <= state.meta.time {
        state.log.warn(format!(
            "Target time {target} is not after the current time {}; nothing to do",
            state.meta.time
        ));
        return AdvanceOutcome::Skipped;
    }

    let events = schedule(state, catalog, target);
    let mut outcome = AdvanceOutcome::Completed;
    for (i, event) in events.iter().enumerate() {
        accrue_eco(state, catalog, event.time);

        let mut stop_after_event = false;
        if state.send.send_cap_reached() || state.send.eco_cap_reached(state.portfolio.wallet.eco) {
            move_to_next_send(state, catalog);
            if state.meta.time < event.time {
                target = state.meta.time;
                outcome = AdvanceOutcome::Truncated;
                break;
            }
            stop_after_event = true;
        }

        apply_event(state, catalog, event);

        let end_of_run = events.get(i + 1).map_or(true, |next| event.time < next.time);
        if end_of_run {
            stop_after_event |= process_buy_queue(state, catalog, event.time);
            stop_after_event |= run_auto_buys(state, catalog, event.time);
        }

        state.trajectory.push(TrajectorySample {
            time: event.time,
            cash: state.portfolio.wallet.cash,
            eco: state.portfolio.wallet.eco,
        });
        state.meta.time = event.time;

        if stop_after_event {
            target = state.meta.time;
            outcome = AdvanceOutcome::Truncated;
            break;
        }
    }

    state.meta.time = target;
    state.meta.round = state.clock.advance_round(state.meta.round, target);
    correct_eco_queue(state, catalog);
    outcome
}

/// Step toward `target` in `interval`-sized windows until it is reached.
///
/// Windows snap to the interval grid; a window shorter than half an interval
/// is merged into the next one.
pub fn fast_forward(state: &mut EcoState, catalog: &Catalog, target: Target, interval: f64) {
    state.queue_blocked = false;
    let interval = if interval > 0.0 {
        interval
    } else {
        DEFAULT_INTERVAL
    };
    let target = target.resolve(state);
    if target < state.meta.time {
        state.log.warn(format!(
            "Cannot fast forward to {target}, which is before the current time {}",
            state.meta.time
        ));
        return;
    }
    while state.meta.time < target {
        let now = state.meta.time;
        let grid = ((now / interval).floor() + 1.0) * interval;
        let step = grid.max(now + interval / 2.0).min(target);
        if advance(state, catalog, step) == AdvanceOutcome::Skipped {
            break;
        }
    }
}

/// Re-stall the rounds that have not reached their stall phase yet.
pub fn change_stall_factor(state: &mut EcoState, stall_factor: f64) {
    let now = state.meta.time;
    state.clock.change_stall_factor(stall_factor, now);
    state.meta.round = state.clock.round_for_time(now);
    state.log.info(format!("Changed the stall factor to {stall_factor}"));
}

fn clamp_to_send_window(state: &mut EcoState, catalog: &Catalog, target: f64) -> f64 {
    let Some(def) = catalog.strategy(&state.send.strategy) else {
        return target;
    };
    if def.end_round < state.meta.round {
        state.log.warn(format!(
            "{} is no longer available in round {}; switching to the Zero send",
            def.id, state.meta.round
        ));
        change_strategy(state, catalog, &EcoQueueEntry::new(state.meta.time, StrategyId::zero()));
        return target;
    }
    let last_round = def.end_round + 1;
    if state.clock.round_for_time(target) >= last_round {
        let closes = state.clock.time_for_round(f64::from(last_round));
        if closes < target {
            state.log.info(format!(
                "{} stops at round {last_round}; shortening the window to {closes}",
                def.id
            ));
            return closes;
        }
    }
    target
}

/// Run sends from the current time up to `until`.
///
/// At most `max_send_slots` sends are in flight at once and consecutive sends
/// are at least `eco_delay` apart. A send needs its full cost in cash; when it
/// cannot be paid the loop gives up for this window.
fn accrue_eco(state: &mut EcoState, catalog: &Catalog, until: f64) {
    let max_slots = catalog.constants.max_send_slots;
    let delay = catalog.constants.eco_delay;
    loop {
        let send = &state.send;
        let wallet = &state.portfolio.wallet;
        if state.send_slots.unlock_time > until
            || send.strategy.is_zero()
            || send.send_cap_reached()
            || send.eco_cap_reached(wallet.eco)
        {
            return;
        }

        let now = state.meta.time.max(state.send_slots.unlock_time);
        state.meta.time = now;
        let slots = &mut state.send_slots;
        slots.resolves.retain(|resolve| *resolve > now);

        if state.portfolio.wallet.cash >= state.send.cost && slots.resolves.len() < max_slots {
            let start = slots.resolves.last().copied().unwrap_or(now);
            slots.resolves.push(start + state.send.duration);
            state.portfolio.wallet.cash -= state.send.cost;
            state.portfolio.wallet.eco += state.send.gain;
            state.send.sends_made += 1;
            slots.unlock_time = if slots.resolves.len() + 1 == max_slots {
                (now + delay).max(slots.resolves[0])
            } else {
                now + delay
            };
            state
                .log
                .info(format!("Sent a set of {} at time {now}", state.send.strategy));
        } else if slots.resolves.len() >= max_slots {
            slots.unlock_time = slots.resolves[0];
        } else {
            slots.unlock_time = until + delay / 2.0;
        }
    }
}

/// The active send hit its cap: bring the next queued send forward, or go idle.
///
/// A queued send that cannot start yet keeps its slot in the queue while the
/// Zero send fills the gap.
fn move_to_next_send(state: &mut EcoState, catalog: &Catalog) {
    state.log.info(format!(
        "Reached the eco limit for {}; moving to the next send",
        state.send.strategy
    ));
    let now = state.meta.time;
    let Some(head) = state.eco_queue.front_mut() else {
        state
            .log
            .info("No more sends in the eco queue; switching to the Zero send".to_string());
        state
            .eco_queue
            .push_back(EcoQueueEntry::new(now, StrategyId::zero()));
        return;
    };
    head.time = now;
    correct_eco_queue(state, catalog);
    if state.send.send_cap_reached() || state.send.eco_cap_reached(state.portfolio.wallet.eco) {
        change_strategy(state, catalog, &EcoQueueEntry::new(now, StrategyId::zero()));
    }
}

fn apply_event(state: &mut EcoState, catalog: &Catalog, event: &PayoutEvent) {
    let portfolio = &mut state.portfolio;
    match event.kind {
        PayoutKind::Eco => {
            let eco = portfolio.wallet.eco;
            impact(&mut portfolio.wallet, eco);
        }
        PayoutKind::Direct { amount, source } => {
            let delta = impact(&mut portfolio.wallet, amount);
            if let Some(id) = source.asset() {
                portfolio.ledger_mut(id).revenue += delta;
            }
            if let PayoutSource::Ability(id) = source {
                if let Some(farm) = portfolio.farm_mut(id) {
                    farm.next_ability_time =
                        Some(event.time + catalog.farm.monkeynomics_usage_cooldown);
                }
            }
        }
        PayoutKind::BankInterest { asset } => {
            let bonus = catalog.farm.bank_deposit_bonus;
            let rate = catalog.farm.bank_interest_rate;
            deposit(state, asset, |value| (value + bonus) * (1.0 + rate));
        }
        PayoutKind::BankDeposit { asset, amount } => {
            deposit(state, asset, |value| value + amount);
        }
        PayoutKind::Sentinel => {}
    }
}

/// Update a bank account and empty it into cash once it reaches capacity.
fn deposit(state: &mut EcoState, id: AssetId, update: impl FnOnce(f64) -> f64) {
    let portfolio = &mut state.portfolio;
    let Some(account) = portfolio.farm_mut(id).and_then(|farm| farm.account.as_mut()) else {
        return;
    };
    account.value = update(account.value);
    if account.value < account.capacity {
        return;
    }
    let capacity = account.capacity;
    account.value = 0.0;
    let delta = impact(&mut portfolio.wallet, capacity);
    portfolio.ledger_mut(id).revenue += delta;
    state.log.info(format!(
        "Bank {id} reached its capacity of {capacity}; withdrew it"
    ));
}
