//! Run competing plans from one starting point and line up the results.

use serde::{Deserialize, Serialize};

use crate::engine::{fast_forward, Target};
use crate::metrics::{compute_summary, EcoSummary, Envelope};
use crate::{Catalog, EcoQueueEntry, EcoState, PurchaseBatch};

/// One plan: the eco switches and purchases to make, in order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Strategy {
    pub name: String,
    #[serde(default)]
    pub eco_queue: Vec<EcoQueueEntry>,
    #[serde(default)]
    pub buy_queue: Vec<PurchaseBatch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyOutcome {
    pub name: String,
    pub summary: EcoSummary,
    pub state: EcoState,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub outcomes: Vec<StrategyOutcome>,
    /// Index of the outcome with the most cash at the end.
    pub best: Option<usize>,
    pub envelope: Option<Envelope>,
}

/// Simulate `strategy` from a private copy of `initial`.
pub fn run_strategy(
    initial: &EcoState,
    catalog: &Catalog,
    strategy: &Strategy,
    target: Target,
    interval: f64,
) -> StrategyOutcome {
    let mut state = initial.clone();
    state.eco_queue = strategy.eco_queue.iter().cloned().collect();
    state.buy_queue = strategy.buy_queue.iter().cloned().collect();
    state.buy_gate = None;
    state.queue_blocked = false;

    tracing::debug!(strategy = %strategy.name, "simulating");
    fast_forward(&mut state, catalog, target, interval);

    StrategyOutcome {
        name: strategy.name.clone(),
        summary: compute_summary(&state, catalog),
        state,
    }
}

/// Run every strategy one after another and pick the one ending with the most cash.
pub fn compare_strategies(
    initial: &EcoState,
    catalog: &Catalog,
    strategies: &[Strategy],
    target: Target,
    interval: f64,
) -> Comparison {
    let outcomes: Vec<StrategyOutcome> = strategies
        .iter()
        .map(|strategy| run_strategy(initial, catalog, strategy, target, interval))
        .collect();
    summarize(outcomes)
}

/// Rank finished outcomes, however they were produced.
pub fn summarize(outcomes: Vec<StrategyOutcome>) -> Comparison {
    let best = outcomes
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.summary.cash.total_cmp(&b.summary.cash))
        .map(|(i, _)| i);
    let envelope = outcomes
        .iter()
        .filter_map(|outcome| Envelope::of(&outcome.state.trajectory))
        .reduce(Envelope::merge);
    Comparison {
        outcomes,
        best,
        envelope,
    }
}
