//! Shared fixtures for unit and integration tests.
//!
//! The round table is deliberately flat: every round is 30 s long with no
//! stall, so round `r` starts at `30 * r`.

use crate::{
    ActiveSend, AdvisoryLog, BoatDef, Catalog, CatalogIndex, Constants, DropperDef, EcoState, FarmDef,
    FarmTierDef, HeroDef, MetaState, Portfolio, RoundClock, RoundTable, SendSlots, StrategyDef,
    StrategyId, Upgrades, Wallet,
};

pub const ROUND_LENGTH: f64 = 30.0;
pub const ROUNDS: usize = 40;

pub fn base_catalog() -> Catalog {
    let mut catalog = Catalog {
        content_version: "test".to_string(),
        constants: Constants {
            eco_interval: 6.0,
            eco_delay: 0.2,
            max_send_slots: 6,
            sellback_rate: 0.7,
            fortified_multiplier: 2.0,
            camo_multiplier: 2.0,
            regrow_multiplier: 1.5,
            fortified_round: 10,
            camo_round: 12,
            regrow_round: 8,
        },
        rounds: RoundTable {
            natural_send_lengths: vec![ROUND_LENGTH; ROUNDS],
            max_stall_times: vec![10.0; ROUNDS],
            min_stall: 0.0,
        },
        strategies: vec![
            strategy("Zero", 0.0, 0.0, 0.0, 0, 39),
            strategy("Grouped Reds", 150.0, 6.75, 1.2, 1, 10),
            strategy("Grouped Blues", 240.0, 10.0, 1.2, 3, 10),
            StrategyDef {
                fortified: true,
                camo: true,
                regrow: true,
                ..strategy("Grouped Pinks", 1800.0, 69.0, 1.2, 9, 30)
            },
            StrategyDef {
                fortified: true,
                moab_class: true,
                ..strategy("Grouped Ceramics", 10_000.0, 45.0, 1.2, 16, 30)
            },
        ],
        farm: FarmDef {
            cost: 1050.0,
            upgrade_costs: [
                [600.0, 550.0, 2700.0, 16_000.0, 68_000.0],
                [200.0, 700.0, 5500.0, 7500.0, 50_000.0],
                [250.0, 200.0, 3000.0, 13_000.0, 43_500.0],
            ],
            bank_capacity: [0.0, 0.0, 0.0, 14_000.0, 20_000.0, 30_000.0],
            bank_deposit_bonus: 400.0,
            bank_interest_rate: 0.2,
            monkeynomics_payout: 20_000.0,
            monkeynomics_initial_cooldown: 20.0,
            monkeynomics_usage_cooldown: 60.0,
            imf_loan_amount: 10_000.0,
            imf_usage_cooldown: 90.0,
            wall_street_bonus: 10_000.0,
            banana_central_multiplier: 1.25,
            tiers: farm_tiers(),
        },
        boat: BoatDef {
            cost: 2800.0,
            upgrade_costs: [5400.0, 19_000.0],
            payouts: [300.0, 1000.0, 3000.0],
            sell_values: [1960.0, 6560.0, 21_760.0],
            trade_empire_bonus: 0.05,
            trade_empire_max_boats: 20,
        },
        druid: DropperDef {
            cost: 4150.0,
            payout: 1000.0,
            initial_cooldown: 20.0,
            usage_cooldown: 40.0,
            specialist_cost: 35_000.0,
            specialist_payout: None,
            specialist_round_bonus: 3000.0,
        },
        supply_drop: DropperDef {
            cost: 9850.0,
            payout: 2000.0,
            initial_cooldown: 20.0,
            usage_cooldown: 40.0,
            specialist_cost: 12_600.0,
            specialist_payout: Some(5000.0),
            specialist_round_bonus: 0.0,
        },
        heli: DropperDef {
            cost: 12_000.0,
            payout: 3000.0,
            initial_cooldown: 20.0,
            usage_cooldown: 45.0,
            specialist_cost: 30_000.0,
            specialist_payout: Some(7500.0),
            specialist_round_bonus: 0.0,
        },
        hero: HeroDef {
            jericho_steal_interval: 20.0,
            jericho_steals: 3,
        },
        index: CatalogIndex::default(),
    };
    catalog.reindex();
    catalog
}

fn strategy(id: &str, price: f64, eco: f64, duration: f64, start: u32, end: u32) -> StrategyDef {
    StrategyDef {
        id: StrategyId::from(id),
        price,
        eco,
        duration,
        start_round: start,
        end_round: end,
        fortified: false,
        camo: false,
        regrow: false,
        moab_class: false,
    }
}

/// Every legal crosspath: at most two paths upgraded, at most one past level 2.
pub fn farm_tiers() -> Vec<FarmTierDef> {
    let costs = [
        [600.0, 550.0, 2700.0, 16_000.0, 68_000.0],
        [200.0, 700.0, 5500.0, 7500.0, 50_000.0],
        [250.0, 200.0, 3000.0, 13_000.0, 43_500.0],
    ];
    let mut tiers = Vec::new();
    for top in 0..=5u8 {
        for middle in 0..=5u8 {
            for bottom in 0..=5u8 {
                let levels = [top, middle, bottom];
                let upgraded = levels.iter().filter(|&&l| l > 0).count();
                let advanced = levels.iter().filter(|&&l| l > 2).count();
                if upgraded > 2 || advanced > 1 {
                    continue;
                }
                let spent: f64 = 1050.0
                    + (0..3)
                        .map(|p| costs[p][..usize::from(levels[p])].iter().sum::<f64>())
                        .sum::<f64>();
                let rate = if bottom >= 2 { 0.8 } else { 0.7 };
                let (payout, frequency) = farm_payout(levels);
                tiers.push(FarmTierDef {
                    upgrades: Upgrades(levels),
                    payout,
                    frequency,
                    sell_value: spent * rate,
                });
            }
        }
    }
    tiers
}

fn farm_payout([top, middle, bottom]: [u8; 3]) -> (f64, u32) {
    let frequency = match (top, bottom) {
        (3, _) => 16,
        (4 | 5, _) => 5,
        (_, 3..=5) => 14 + 2 * u32::from(top),
        _ => [3, 5, 7][usize::from(top)],
    };
    let base = match (top, bottom) {
        (4, _) => 600.0,
        (5, _) => 3000.0,
        (_, 4 | 5) => 160.0,
        _ => 40.0,
    };
    let valuable = if middle >= 2 { 1.25 } else { 1.0 };
    (base * valuable, frequency)
}

/// Round 0, time 0, no cash, idle strategy, empty roster.
pub fn base_state(catalog: &Catalog) -> EcoState {
    EcoState {
        meta: MetaState {
            time: 0.0,
            round: 0,
            content_version: catalog.content_version.clone(),
        },
        clock: RoundClock::new(&catalog.rounds, 0.0).expect("fixture round table is valid"),
        portfolio: Portfolio::default(),
        send: ActiveSend::idle(),
        send_slots: SendSlots::default(),
        eco_queue: std::collections::VecDeque::new(),
        buy_queue: std::collections::VecDeque::new(),
        buy_gate: None,
        queue_blocked: false,
        trajectory: Vec::new(),
        markers: Vec::new(),
        log: AdvisoryLog::default(),
    }
}

/// `base_state` with the given cash, eco and loan.
pub fn state_with_wallet(catalog: &Catalog, cash: f64, eco: f64, loan: f64) -> EcoState {
    let mut state = base_state(catalog);
    state.portfolio.wallet = Wallet { cash, eco, loan };
    state
}
