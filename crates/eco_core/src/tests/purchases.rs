use super::*;
use crate::purchases::{process_buy_queue, run_auto_buys};

fn item(action: Purchase) -> PurchaseItem {
    PurchaseItem::new(action)
}

#[test]
fn batch_costing_exactly_the_cash_commits() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 10_000.0, 0.0, 0.0);
    queue_buy(&mut state, vec![item(Purchase::BuyDefense { cost: 10_000.0 })]);

    assert!(process_buy_queue(&mut state, &catalog, 0.0));
    assert_close(state.portfolio.wallet.cash, 0.0);
    assert!(state.buy_queue.is_empty());
    assert_eq!(state.markers.last().map(|m| m.kind), Some(MarkerKind::Buy));
}

#[test]
fn buffer_must_remain_after_the_batch() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 10_000.0, 0.0, 0.0);
    queue_buy(
        &mut state,
        vec![item(Purchase::BuyDefense { cost: 10_000.0 }).with_buffer(1.0)],
    );

    assert!(!process_buy_queue(&mut state, &catalog, 0.0));
    assert_close(state.portfolio.wallet.cash, 10_000.0);
    assert_eq!(state.buy_queue.len(), 1);
}

#[test]
fn unaffordable_batch_leaves_no_trace() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 2000.0, 0.0, 0.0);
    queue_buy(
        &mut state,
        vec![
            item(Purchase::BuyFarm),
            item(Purchase::BuyDropper {
                class: DropperClass::Druid,
            }),
        ],
    );
    let before = state.portfolio.clone();

    assert!(!process_buy_queue(&mut state, &catalog, 0.0));
    assert_eq!(state.portfolio, before);
    assert!(state.markers.is_empty());
}

#[test]
fn batch_waits_for_its_latest_min_time() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 5000.0, 0.0, 0.0);
    queue_buy(
        &mut state,
        vec![item(Purchase::BuyFarm).at(5.0), item(Purchase::BuyFarm).at(20.0)],
    );

    assert!(!process_buy_queue(&mut state, &catalog, 10.0));
    assert_eq!(state.buy_gate, Some(20.0));
    assert!(process_buy_queue(&mut state, &catalog, 20.0));
    assert_eq!(state.portfolio.farms().count(), 2);
    assert_eq!(state.buy_gate, None);
}

#[test]
fn later_batches_commit_in_the_same_call() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 5000.0, 0.0, 0.0);
    queue_buy(&mut state, vec![item(Purchase::BuyFarm)]);
    queue_buy(&mut state, vec![item(Purchase::BuyFarm)]);
    queue_buy(&mut state, vec![item(Purchase::BuyFarm).at(100.0)]);

    assert!(process_buy_queue(&mut state, &catalog, 0.0));
    assert_eq!(state.portfolio.farms().count(), 2);
    assert_eq!(state.buy_queue.len(), 1);
}

#[test]
fn upgrades_charge_the_path_price_and_reset_the_purchase_time() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 1000.0, 0.0, 0.0);
    let farm = add_farm(&mut state, &catalog, [0, 0, 0], 0.0);
    queue_buy(
        &mut state,
        vec![
            item(Purchase::UpgradeFarm {
                asset: farm,
                path: FarmPath::Top,
            }),
            item(Purchase::UpgradeFarm {
                asset: farm,
                path: FarmPath::Bottom,
            }),
        ],
    );

    assert!(process_buy_queue(&mut state, &catalog, 45.0));
    assert_close(state.portfolio.wallet.cash, 150.0);
    assert_eq!(state.portfolio.farm(farm).unwrap().upgrades, Upgrades([1, 0, 1]));
    assert_close(state.portfolio.assets[&farm].purchase_time, 45.0);
    assert_close(state.portfolio.ledgers[&farm].expenses, 850.0);
}

#[test]
fn invalid_batch_is_dropped_with_a_warning() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 1_000_000.0, 0.0, 0.0);
    let farm = add_farm(&mut state, &catalog, [3, 0, 2], 0.0);
    queue_buy(
        &mut state,
        vec![item(Purchase::UpgradeFarm {
            asset: farm,
            path: FarmPath::Middle,
        })],
    );
    queue_buy(
        &mut state,
        vec![item(Purchase::SellFarm {
            asset: AssetId(99),
        })],
    );
    queue_buy(&mut state, vec![item(Purchase::BuyFarm)]);

    assert!(process_buy_queue(&mut state, &catalog, 0.0));
    assert!(state.buy_queue.is_empty());
    assert_eq!(state.portfolio.farms().count(), 2);
    assert_eq!(state.log.warnings().count(), 2);
}

#[test]
fn second_tier_five_on_a_path_is_blocked() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 200_000.0, 0.0, 0.0);
    let first = add_farm(&mut state, &catalog, [0, 0, 4], 0.0);
    let second = add_farm(&mut state, &catalog, [0, 0, 4], 0.0);
    for asset in [first, second] {
        queue_buy(
            &mut state,
            vec![item(Purchase::UpgradeFarm {
                asset,
                path: FarmPath::Bottom,
            })],
        );
    }

    assert!(process_buy_queue(&mut state, &catalog, 0.0));
    assert!(state.queue_blocked);
    assert_eq!(state.buy_queue.len(), 1);
    assert_eq!(state.portfolio.farm(second).unwrap().upgrades.bottom(), 4);
    assert!(state.portfolio.singletons.farm_paths[2]);

    // Still blocked on the next event.
    assert!(!process_buy_queue(&mut state, &catalog, 1.0));
    assert_eq!(state.buy_queue.len(), 1);
}

#[test]
fn selling_a_tier_five_frees_its_path_within_a_batch() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 100_000.0, 0.0, 0.0);
    let first = add_farm(&mut state, &catalog, [0, 0, 5], 0.0);
    let second = add_farm(&mut state, &catalog, [0, 0, 4], 0.0);
    queue_buy(
        &mut state,
        vec![
            item(Purchase::SellFarm { asset: first }),
            item(Purchase::UpgradeFarm {
                asset: second,
                path: FarmPath::Bottom,
            }),
        ],
    );

    assert!(process_buy_queue(&mut state, &catalog, 0.0));
    assert!(state.portfolio.farm(first).is_none());
    assert_eq!(state.portfolio.farm(second).unwrap().upgrades.bottom(), 5);
    assert!(state.portfolio.singletons.farm_paths[2]);
    // The sold farm's ledger survives it.
    assert!(state.portfolio.ledgers[&first].revenue > 0.0);
}

#[test]
fn imf_loan_waits_for_the_cooldown_and_adds_debt() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 0.0, 0.0, 0.0);
    let farm = add_farm(&mut state, &catalog, [0, 4, 0], 0.0);
    queue_buy(&mut state, vec![item(Purchase::ActivateImf { asset: farm })]);

    assert!(!process_buy_queue(&mut state, &catalog, 10.0));
    assert_eq!(state.buy_gate, Some(20.0));
    assert!(process_buy_queue(&mut state, &catalog, 20.0));

    let wallet = state.portfolio.wallet;
    assert_close(wallet.cash, 10_000.0);
    assert_close(wallet.loan, 10_000.0);
    assert_eq!(
        state.portfolio.farm(farm).unwrap().next_ability_time,
        Some(110.0)
    );
}

#[test]
fn imf_on_a_plain_farm_is_dropped() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 0.0, 0.0, 0.0);
    let farm = add_farm(&mut state, &catalog, [2, 0, 0], 0.0);
    queue_buy(&mut state, vec![item(Purchase::ActivateImf { asset: farm })]);

    assert!(!process_buy_queue(&mut state, &catalog, 0.0));
    assert!(state.buy_queue.is_empty());
    assert!(state
        .log
        .warnings()
        .any(|w| w.contains("cannot take an IMF loan")));
}

#[test]
fn withdrawing_a_bank_services_the_loan() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 0.0, 0.0, 1000.0);
    let bank = add_farm(&mut state, &catalog, [0, 3, 0], 0.0);
    set_account(&mut state, bank, 1500.0);
    queue_buy(&mut state, vec![item(Purchase::WithdrawBank { asset: bank })]);

    assert!(process_buy_queue(&mut state, &catalog, 0.0));
    let wallet = state.portfolio.wallet;
    assert_close(wallet.cash, 750.0);
    assert_close(wallet.loan, 250.0);
    assert_close(state.portfolio.ledgers[&bank].revenue, 750.0);
    assert_close(
        state.portfolio.farm(bank).unwrap().account.unwrap().value,
        0.0,
    );
}

#[test]
fn boat_upgrades_and_trade_empire_singleton() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 100_000.0, 0.0, 0.0);
    let first = add_boat(&mut state, 4);
    let second = add_boat(&mut state, 4);
    queue_buy(
        &mut state,
        vec![item(Purchase::UpgradeBoatFarm { asset: first })],
    );
    queue_buy(
        &mut state,
        vec![item(Purchase::UpgradeBoatFarm { asset: second })],
    );

    assert!(process_buy_queue(&mut state, &catalog, 0.0));
    assert_close(state.portfolio.wallet.cash, 81_000.0);
    assert!(state.portfolio.singletons.trade_empire);
    assert!(state.queue_blocked);

    state.queue_blocked = false;
    state.buy_queue.clear();
    queue_buy(
        &mut state,
        vec![item(Purchase::SellBoatFarm { asset: first })],
    );
    assert!(process_buy_queue(&mut state, &catalog, 1.0));
    assert!(!state.portfolio.singletons.trade_empire);
    assert_close(state.portfolio.wallet.cash, 81_000.0 + 21_760.0);
}

#[test]
fn buying_a_boat_starts_at_tier_three() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 3000.0, 0.0, 0.0);
    queue_buy(&mut state, vec![item(Purchase::BuyBoatFarm)]);

    assert!(process_buy_queue(&mut state, &catalog, 0.0));
    assert_eq!(state.portfolio.boats().collect::<Vec<_>>(), vec![&Boat { tier: 3 }]);
    assert_close(state.portfolio.wallet.cash, 200.0);
}

#[test]
fn specialist_is_a_singleton_per_class() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 100_000.0, 0.0, 0.0);
    let a = add_dropper(&mut state, DropperClass::Heli, 0.0);
    let b = add_dropper(&mut state, DropperClass::Heli, 0.0);
    queue_buy(
        &mut state,
        vec![item(Purchase::BuySpecialist {
            class: DropperClass::Heli,
            asset: a,
        })],
    );
    queue_buy(
        &mut state,
        vec![item(Purchase::BuySpecialist {
            class: DropperClass::Heli,
            asset: b,
        })],
    );

    assert!(process_buy_queue(&mut state, &catalog, 0.0));
    assert_eq!(state.portfolio.singletons.special_poperations, Some(a));
    assert!(state.queue_blocked);
    assert_close(state.portfolio.wallet.cash, 70_000.0);
}

#[test]
fn specialist_must_match_the_class() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 100_000.0, 0.0, 0.0);
    let druid = add_dropper(&mut state, DropperClass::Druid, 0.0);
    queue_buy(
        &mut state,
        vec![item(Purchase::BuySpecialist {
            class: DropperClass::SupplyDrop,
            asset: druid,
        })],
    );

    assert!(!process_buy_queue(&mut state, &catalog, 0.0));
    assert!(state.buy_queue.is_empty());
    assert!(state.portfolio.singletons.elite_sniper.is_none());
}

#[test]
fn selling_a_specialist_refunds_both_purchases_and_clears_the_slot() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 0.0, 0.0, 0.0);
    let druid = add_dropper(&mut state, DropperClass::Druid, 0.0);
    state.portfolio.singletons.spirit_of_the_forest = Some(druid);
    queue_buy(
        &mut state,
        vec![item(Purchase::SellDropper {
            class: DropperClass::Druid,
            asset: druid,
        })],
    );

    assert!(process_buy_queue(&mut state, &catalog, 0.0));
    assert_close(state.portfolio.wallet.cash, 0.7 * (4150.0 + 35_000.0));
    assert!(state.portfolio.singletons.spirit_of_the_forest.is_none());
    assert_eq!(state.portfolio.droppers(DropperClass::Druid).count(), 0);
}

#[test]
fn jericho_credits_the_first_steal_at_once() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 0.0, 0.0, 0.0);
    queue_buy(
        &mut state,
        vec![item(Purchase::JerichoSteal { amount: 500.0 }).at(30.0)],
    );

    assert!(process_buy_queue(&mut state, &catalog, 30.0));
    assert_close(state.portfolio.wallet.cash, 500.0);
    assert_eq!(
        state.portfolio.jericho,
        Some(JerichoSteal {
            start: 30.0,
            amount: 500.0
        })
    );
}

#[test]
fn auto_buy_keeps_the_buffer_and_respects_the_deadline() {
    let catalog = base_catalog();
    let mut state = state_with_wallet(&catalog, 20_000.0, 0.0, 0.0);
    queue_buy(
        &mut state,
        vec![item(Purchase::RepeatedlyBuy {
            class: DropperClass::Druid,
            until: 50.0,
        })
        .with_buffer(5000.0)],
    );

    assert!(process_buy_queue(&mut state, &catalog, 0.0));
    assert!(run_auto_buys(&mut state, &catalog, 0.0));
    assert_eq!(state.portfolio.droppers(DropperClass::Druid).count(), 3);
    assert_close(state.portfolio.wallet.cash, 20_000.0 - 3.0 * 4150.0);

    state.portfolio.wallet.cash = 50_000.0;
    assert!(!run_auto_buys(&mut state, &catalog, 60.0));
    assert_eq!(state.portfolio.droppers(DropperClass::Druid).count(), 3);
}

#[test]
fn free_dropper_is_never_auto_bought() {
    let mut catalog = base_catalog();
    catalog.druid.cost = 0.0;
    let mut state = state_with_wallet(&catalog, 1000.0, 0.0, 0.0);
    queue_buy(
        &mut state,
        vec![item(Purchase::RepeatedlyBuy {
            class: DropperClass::Druid,
            until: 50.0,
        })],
    );

    assert!(process_buy_queue(&mut state, &catalog, 0.0));
    assert!(!run_auto_buys(&mut state, &catalog, 0.0));
    assert_eq!(state.portfolio.droppers(DropperClass::Druid).count(), 0);
    fast_forward(&mut state, &catalog, Target::Time(1.0), 0.1);
    assert_eq!(state.portfolio.droppers(DropperClass::Druid).count(), 0);
}
