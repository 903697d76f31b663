//! Building a simulation from a described starting position.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::eco_queue::active_send;
use crate::{
    AdvisoryLog, AssetKind, Boat, Catalog, DropperClass, EcoQueueEntry, EcoState, Farm,
    MetaState, Portfolio, PurchaseBatch, RoundClock, SendSlots, SnapshotError, StrategyId,
    Upgrades, Wallet,
};

/// Where the simulation clock starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPoint {
    /// Fractional rounds are interpolated across the round.
    Round(f64),
    Time(f64),
}

impl Default for StartPoint {
    fn default() -> Self {
        StartPoint::Round(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialSnapshot {
    #[serde(default)]
    pub cash: f64,
    #[serde(default)]
    pub eco: f64,
    #[serde(default)]
    pub loan: f64,
    #[serde(default = "StrategyId::zero")]
    pub strategy: StrategyId,
    #[serde(default)]
    pub max_sends: Option<u32>,
    #[serde(default)]
    pub max_eco: Option<f64>,
    #[serde(default)]
    pub start: StartPoint,
    #[serde(default)]
    pub stall_factor: f64,
    #[serde(default)]
    pub farms: Vec<FarmSnapshot>,
    #[serde(default)]
    pub boats: Vec<BoatSnapshot>,
    #[serde(default)]
    pub druids: DropperSnapshot,
    #[serde(default)]
    pub supply_drops: DropperSnapshot,
    #[serde(default)]
    pub helis: DropperSnapshot,
    #[serde(default)]
    pub eco_queue: Vec<EcoQueueEntry>,
    #[serde(default)]
    pub buy_queue: Vec<PurchaseBatch>,
}

impl Default for InitialSnapshot {
    fn default() -> Self {
        Self {
            cash: 0.0,
            eco: 0.0,
            loan: 0.0,
            strategy: StrategyId::zero(),
            max_sends: None,
            max_eco: None,
            start: StartPoint::default(),
            stall_factor: 0.0,
            farms: Vec::new(),
            boats: Vec::new(),
            druids: DropperSnapshot::default(),
            supply_drops: DropperSnapshot::default(),
            helis: DropperSnapshot::default(),
            eco_queue: Vec::new(),
            buy_queue: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmSnapshot {
    pub upgrades: Upgrades,
    #[serde(default)]
    pub purchase_time: f64,
    /// Ignored unless the farm is a bank.
    #[serde(default)]
    pub account_value: f64,
    /// Overrides the ability cooldown derived from `purchase_time`.
    #[serde(default)]
    pub next_ability_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoatSnapshot {
    pub tier: u8,
    #[serde(default)]
    pub purchase_time: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DropperSnapshot {
    #[serde(default)]
    pub purchase_times: Vec<f64>,
    /// Index into `purchase_times` of the one holding the specialist upgrade.
    #[serde(default)]
    pub specialist: Option<usize>,
}

fn check_amount(field: &'static str, value: f64) -> Result<(), SnapshotError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SnapshotError::InvalidAmount { field, value })
    }
}

impl EcoState {
    /// Validate `snapshot` against `catalog` and build the state it describes.
    ///
    /// Asset ids are issued in roster order: farms, boats, druids, supply
    /// drops, then helis. Singleton flags are derived from the roster.
    pub fn from_snapshot(
        snapshot: &InitialSnapshot,
        catalog: &Catalog,
    ) -> Result<Self, SnapshotError> {
        check_amount("cash", snapshot.cash)?;
        check_amount("eco", snapshot.eco)?;
        check_amount("loan", snapshot.loan)?;

        let clock = RoundClock::new(&catalog.rounds, snapshot.stall_factor)?;
        let time = match snapshot.start {
            StartPoint::Round(round) => {
                check_amount("start round", round)?;
                clock.time_for_round(round)
            }
            StartPoint::Time(time) => {
                check_amount("start time", time)?;
                time
            }
        };
        let round = clock.round_for_time(time);

        let def = catalog
            .strategy(&snapshot.strategy)
            .ok_or_else(|| SnapshotError::UnknownStrategy(snapshot.strategy.clone()))?;
        let mut entry = EcoQueueEntry::new(time, def.id.clone());
        entry.max_sends = snapshot.max_sends;
        entry.max_eco = snapshot.max_eco;
        let send = active_send(catalog, def, &entry);

        let mut portfolio = Portfolio {
            wallet: Wallet {
                cash: snapshot.cash,
                eco: snapshot.eco,
                loan: snapshot.loan,
            },
            ..Portfolio::default()
        };
        add_farms(&mut portfolio, catalog, &snapshot.farms)?;
        add_boats(&mut portfolio, &snapshot.boats)?;
        add_droppers(&mut portfolio, DropperClass::Druid, &snapshot.druids)?;
        add_droppers(&mut portfolio, DropperClass::SupplyDrop, &snapshot.supply_drops)?;
        add_droppers(&mut portfolio, DropperClass::Heli, &snapshot.helis)?;

        tracing::debug!(
            time,
            round,
            assets = portfolio.assets.len(),
            strategy = %def.id,
            "built initial state"
        );

        Ok(Self {
            meta: MetaState {
                time,
                round,
                content_version: catalog.content_version.clone(),
            },
            clock,
            portfolio,
            send,
            send_slots: SendSlots {
                unlock_time: time,
                ..SendSlots::default()
            },
            eco_queue: snapshot.eco_queue.iter().cloned().collect(),
            buy_queue: snapshot.buy_queue.iter().cloned().collect::<VecDeque<_>>(),
            buy_gate: None,
            queue_blocked: false,
            trajectory: Vec::new(),
            markers: Vec::new(),
            log: AdvisoryLog::default(),
        })
    }
}

fn add_farms(
    portfolio: &mut Portfolio,
    catalog: &Catalog,
    farms: &[FarmSnapshot],
) -> Result<(), SnapshotError> {
    for (index, snapshot) in farms.iter().enumerate() {
        check_amount("farm purchase_time", snapshot.purchase_time)?;
        check_amount("account_value", snapshot.account_value)?;
        let mut farm = Farm::from_catalog(catalog, snapshot.upgrades, snapshot.purchase_time)
            .ok_or(SnapshotError::UnknownFarmTier {
                index,
                upgrades: snapshot.upgrades,
            })?;
        if let Some(account) = farm.account.as_mut() {
            account.value = snapshot.account_value;
        }
        if farm.next_ability_time.is_some() && snapshot.next_ability_time.is_some() {
            farm.next_ability_time = snapshot.next_ability_time;
        }
        if let Some(path) = snapshot.upgrades.tier_five_path() {
            let flag = &mut portfolio.singletons.farm_paths[path.index()];
            if *flag {
                return Err(SnapshotError::DuplicateTierFive {
                    index,
                    path: path.index(),
                });
            }
            *flag = true;
        }
        portfolio.insert_asset(snapshot.purchase_time, AssetKind::Farm(farm));
    }
    Ok(())
}

fn add_boats(portfolio: &mut Portfolio, boats: &[BoatSnapshot]) -> Result<(), SnapshotError> {
    for (index, snapshot) in boats.iter().enumerate() {
        check_amount("boat purchase_time", snapshot.purchase_time)?;
        if !(3..=5).contains(&snapshot.tier) {
            return Err(SnapshotError::InvalidBoatTier {
                index,
                tier: snapshot.tier,
            });
        }
        if snapshot.tier == 5 {
            if portfolio.singletons.trade_empire {
                return Err(SnapshotError::DuplicateTradeEmpire { index });
            }
            portfolio.singletons.trade_empire = true;
        }
        let boat = Boat {
            tier: snapshot.tier,
        };
        portfolio.insert_asset(snapshot.purchase_time, AssetKind::Boat(boat));
    }
    Ok(())
}

fn add_droppers(
    portfolio: &mut Portfolio,
    class: DropperClass,
    snapshot: &DropperSnapshot,
) -> Result<(), SnapshotError> {
    let count = snapshot.purchase_times.len();
    if let Some(index) = snapshot.specialist.filter(|&index| index >= count) {
        return Err(SnapshotError::SpecialistOutOfRange {
            class: class.label(),
            index,
            count,
        });
    }
    for (index, &purchase_time) in snapshot.purchase_times.iter().enumerate() {
        check_amount("dropper purchase_time", purchase_time)?;
        let id = portfolio.insert_asset(purchase_time, AssetKind::Dropper { class });
        if snapshot.specialist == Some(index) {
            portfolio.singletons.set_specialist(class, Some(id));
        }
    }
    Ok(())
}
