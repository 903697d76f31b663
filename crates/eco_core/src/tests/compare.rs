use super::*;

fn starting_state(catalog: &Catalog) -> EcoState {
    let mut state = state_with_wallet(catalog, 3000.0, 0.0, 0.0);
    at_round(&mut state, 1);
    state
}

fn strategies() -> Vec<Strategy> {
    vec![
        Strategy {
            name: "idle".to_string(),
            ..Strategy::default()
        },
        Strategy {
            name: "reds".to_string(),
            eco_queue: vec![EcoQueueEntry::new(30.0, "Grouped Reds")],
            buy_queue: Vec::new(),
        },
        Strategy {
            name: "farm".to_string(),
            eco_queue: Vec::new(),
            buy_queue: vec![PurchaseItem::new(Purchase::BuyFarm).into()],
        },
    ]
}

#[test]
fn each_strategy_runs_from_its_own_copy() {
    let catalog = base_catalog();
    let initial = starting_state(&catalog);
    let before = initial.clone();

    let comparison = compare_strategies(
        &initial,
        &catalog,
        &strategies(),
        Target::Round(8.0),
        DEFAULT_INTERVAL,
    );
    assert_eq!(initial, before);
    assert_eq!(comparison.outcomes.len(), 3);

    let idle = &comparison.outcomes[0];
    assert_eq!(idle.name, "idle");
    assert_close(idle.summary.cash, 3000.0);
    assert_eq!(idle.summary.round, 8);

    let reds = &comparison.outcomes[1];
    assert!(reds.summary.eco > 0.0);
    let farm = &comparison.outcomes[2];
    assert_eq!(farm.summary.farm_count, 1);
    assert!(farm.summary.total_expenses > 0.0);
}

#[test]
fn best_strategy_has_the_most_cash() {
    let catalog = base_catalog();
    let initial = starting_state(&catalog);

    let comparison = compare_strategies(
        &initial,
        &catalog,
        &strategies(),
        Target::Round(20.0),
        1.0,
    );
    let best = comparison.best.unwrap();
    let best_cash = comparison.outcomes[best].summary.cash;
    assert!(comparison
        .outcomes
        .iter()
        .all(|outcome| outcome.summary.cash <= best_cash));

    let envelope = comparison.envelope.unwrap();
    for outcome in &comparison.outcomes {
        assert!(outcome.summary.cash <= envelope.cash_max);
        assert!(outcome.summary.eco >= envelope.eco_min);
    }
}

#[test]
fn empty_comparison_has_no_best() {
    let catalog = base_catalog();
    let comparison = compare_strategies(
        &starting_state(&catalog),
        &catalog,
        &[],
        Target::Round(2.0),
        DEFAULT_INTERVAL,
    );
    assert!(comparison.best.is_none());
    assert!(comparison.envelope.is_none());
}

#[test]
fn summary_counts_assets_and_estimates_income() {
    let catalog = base_catalog();
    let mut state = base_state(&catalog);
    add_farm(&mut state, &catalog, [2, 0, 0], 0.0);
    add_farm(&mut state, &catalog, [0, 3, 0], 0.0);
    add_boat(&mut state, 3);
    add_dropper(&mut state, DropperClass::SupplyDrop, 0.0);

    let summary = compute_summary(&state, &catalog);
    assert_eq!(summary.farm_count, 2);
    assert_eq!(summary.boat_count, 1);
    assert_eq!(summary.supply_drop_count, 1);
    assert_eq!(summary.druid_count, 0);
    assert_close(summary.boat_income, 300.0);
    // 2-0-0 pays 40 seven times; the bank deposits 50 three times.
    assert_close(summary.farm_income, 280.0 + 1.2 * (150.0 + 400.0));
}
