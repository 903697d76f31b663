//! End-of-run summaries and trajectory envelopes for reporting.

use serde::{Deserialize, Serialize};

use crate::schedule::boat_round_payout;
use crate::{AssetKind, Catalog, DropperClass, EcoState, TrajectorySample};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcoSummary {
    pub time: f64,
    pub round: u32,
    pub cash: f64,
    pub eco: f64,
    pub loan: f64,
    pub farm_count: u32,
    pub bank_balance: f64,
    pub boat_count: u32,
    pub druid_count: u32,
    pub supply_drop_count: u32,
    pub heli_count: u32,
    /// Rough income per round from farms alone.
    pub farm_income: f64,
    /// Income per round from boats at the current fleet.
    pub boat_income: f64,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub warning_count: u32,
}

pub fn compute_summary(state: &EcoState, catalog: &Catalog) -> EcoSummary {
    let portfolio = &state.portfolio;
    let mut farm_count = 0u32;
    let mut boat_count = 0u32;
    let mut dropper_counts = [0u32; 3];
    for asset in portfolio.assets.values() {
        match asset.kind {
            AssetKind::Farm(_) => farm_count += 1,
            AssetKind::Boat(_) => boat_count += 1,
            AssetKind::Dropper { class } => {
                let slot = DropperClass::ALL
                    .iter()
                    .position(|c| *c == class)
                    .unwrap_or_default();
                dropper_counts[slot] += 1;
            }
        }
    }
    let bank_balance = portfolio
        .farms()
        .filter_map(|(_, farm)| farm.account)
        .map(|account| account.value)
        .sum();

    EcoSummary {
        time: state.meta.time,
        round: state.meta.round,
        cash: portfolio.wallet.cash,
        eco: portfolio.wallet.eco,
        loan: portfolio.wallet.loan,
        farm_count,
        bank_balance,
        boat_count,
        druid_count: dropper_counts[0],
        supply_drop_count: dropper_counts[1],
        heli_count: dropper_counts[2],
        farm_income: estimated_farm_income(state, catalog),
        boat_income: boat_round_payout(state, catalog),
        total_revenue: portfolio.ledgers.values().map(|l| l.revenue).sum(),
        total_expenses: portfolio.ledgers.values().map(|l| l.expenses).sum(),
        warning_count: u32::try_from(state.log.warnings().count()).unwrap_or(u32::MAX),
    }
}

/// Per-round farm income at the current roster.
///
/// Banks are estimated from one round of deposits plus the round-start
/// interest, which is only a rough guide once accounts start hitting capacity.
pub fn estimated_farm_income(state: &EcoState, catalog: &Catalog) -> f64 {
    let def = &catalog.farm;
    let banana_central = state.portfolio.singletons.farm_paths[0];
    state
        .portfolio
        .farms()
        .map(|(_, farm)| {
            let per_round = farm.payout * f64::from(farm.frequency);
            if banana_central && farm.upgrades.top() == 4 {
                def.banana_central_multiplier * per_round
            } else if farm.upgrades.bottom() == 5 {
                def.wall_street_bonus + per_round
            } else if farm.is_bank() {
                (1.0 + def.bank_interest_rate) * (per_round + def.bank_deposit_bonus)
            } else {
                per_round
            }
        })
        .sum()
}

/// Extremes of cash and eco over a trajectory, for scaling plots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub cash_min: f64,
    pub cash_max: f64,
    pub eco_min: f64,
    pub eco_max: f64,
}

impl Envelope {
    pub fn of(samples: &[TrajectorySample]) -> Option<Self> {
        let first = samples.first()?;
        let seed = Self {
            cash_min: first.cash,
            cash_max: first.cash,
            eco_min: first.eco,
            eco_max: first.eco,
        };
        Some(samples.iter().fold(seed, |env, s| env.merge_sample(s)))
    }

    fn merge_sample(self, sample: &TrajectorySample) -> Self {
        Self {
            cash_min: self.cash_min.min(sample.cash),
            cash_max: self.cash_max.max(sample.cash),
            eco_min: self.eco_min.min(sample.eco),
            eco_max: self.eco_max.max(sample.eco),
        }
    }

    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            cash_min: self.cash_min.min(other.cash_min),
            cash_max: self.cash_max.max(other.cash_max),
            eco_min: self.eco_min.min(other.eco_min),
            eco_max: self.eco_max.max(other.eco_max),
        }
    }
}
