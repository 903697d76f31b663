//! Eco queue correction and strategy switching.

use crate::{ActiveSend, Catalog, EcoQueueEntry, EcoState, Marker, MarkerKind, StrategyDef};

/// Repair the queue head against eligibility windows, then apply every entry that is due.
///
/// Stale entries are dropped, early ones are pushed to their window start, and
/// modifiers the strategy cannot use are stripped. Switching strategy can change
/// what is valid next, so the whole pass repeats after each applied entry.
pub(crate) fn correct_eco_queue(state: &mut EcoState, catalog: &Catalog) {
    loop {
        settle_head(state, catalog);
        match state.eco_queue.front() {
            Some(head) if head.time <= state.meta.time => {
                if let Some(entry) = state.eco_queue.pop_front() {
                    change_strategy(state, catalog, &entry);
                }
            }
            _ => return,
        }
    }
}

/// Drop or adjust entries until the head is valid or the queue is empty.
fn settle_head(state: &mut EcoState, catalog: &Catalog) {
    while let Some(head) = state.eco_queue.front() {
        if head.max_eco.is_some_and(|max| state.portfolio.wallet.eco >= max) {
            state.log.info(format!(
                "Eco {} already at the cap for {}; skipping it",
                state.portfolio.wallet.eco, head.strategy
            ));
            state.eco_queue.pop_front();
            continue;
        }
        let Some(def) = catalog.strategy(&head.strategy) else {
            state.log.warn(format!(
                "Unknown eco send {}; removing it from the eco queue",
                head.strategy
            ));
            state.eco_queue.pop_front();
            continue;
        };
        let closes = state.clock.time_for_round(f64::from(def.end_round + 1));
        if head.time >= closes {
            state.log.warn(format!(
                "Time {} is too late to use {}; removing it from the eco queue",
                head.time, head.strategy
            ));
            state.eco_queue.pop_front();
            continue;
        }
        let opens = state.clock.time_for_round(f64::from(def.start_round));
        if head.time < opens {
            state.log.warn(format!(
                "Time {} is too early to use {}; moving it to {opens}",
                head.time, head.strategy
            ));
            let next_time = state.eco_queue.get(1).map(|next| next.time);
            if next_time.is_some_and(|next| opens >= next) {
                state.log.warn(format!(
                    "{} at {opens} would run past the next queued send; removing it from the eco queue",
                    head.strategy
                ));
                state.eco_queue.pop_front();
                continue;
            }
            if let Some(head) = state.eco_queue.front_mut() {
                head.time = opens;
            }
        }
        strip_modifiers(state, catalog);
        return;
    }
}

/// Clear modifiers the head strategy cannot take, or that are not unlocked by its time.
fn strip_modifiers(state: &mut EcoState, catalog: &Catalog) {
    let clock = &state.clock;
    let constants = &catalog.constants;
    let Some(head) = state.eco_queue.front_mut() else {
        return;
    };
    let Some(def) = catalog.strategy(&head.strategy) else {
        return;
    };
    let unlocked = |round: u32| head.time >= clock.time_for_round(f64::from(round));
    let fortified = def.fortified && unlocked(constants.fortified_round);
    let camo = def.camo && unlocked(constants.camo_round);
    let regrow = def.regrow && unlocked(constants.regrow_round);
    head.fortified &= fortified;
    head.camo &= camo;
    head.regrow &= regrow;
}

/// Make `entry` the active strategy: recompute cost and gain, reset the send counter.
///
/// Performs no eligibility checks; the corrector is responsible for those.
pub fn change_strategy(state: &mut EcoState, catalog: &Catalog, entry: &EcoQueueEntry) {
    let Some(def) = catalog.strategy(&entry.strategy) else {
        state.log.warn(format!("Unknown eco send {}; keeping the current send", entry.strategy));
        return;
    };
    state.send = active_send(catalog, def, entry);
    state.log.info(format!(
        "Modified the eco send to {} at time {}",
        def.id, state.meta.time
    ));
    state.markers.push(Marker {
        time: state.meta.time,
        message: format!("Change eco to {}", def.id),
        kind: MarkerKind::Eco,
    });
}

pub(crate) fn active_send(catalog: &Catalog, def: &StrategyDef, entry: &EcoQueueEntry) -> ActiveSend {
    let constants = &catalog.constants;
    let mut cost_multiplier = 1.0;
    if entry.fortified {
        cost_multiplier *= constants.fortified_multiplier;
    }
    if entry.camo {
        cost_multiplier *= constants.camo_multiplier;
    }
    if entry.regrow {
        cost_multiplier *= constants.regrow_multiplier;
    }
    // Fortified MOABs double the eco penalty.
    let gain_multiplier = if def.moab_class && entry.fortified { 2.0 } else { 1.0 };

    ActiveSend {
        strategy: def.id.clone(),
        cost: cost_multiplier * def.price,
        gain: gain_multiplier * def.eco,
        duration: def.duration,
        max_sends: entry.max_sends,
        max_eco: entry.max_eco,
        sends_made: 0,
    }
}
