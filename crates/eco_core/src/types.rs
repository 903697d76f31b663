//! Type definitions for `eco_core`.
//!
//! Simulation state, assets, payout events, purchases and the static catalog.

use std::collections::{BTreeMap, VecDeque};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::clock::RoundClock;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(StrategyId);

impl StrategyId {
    /// The idle strategy: no sends, no cost, no gain.
    pub const ZERO: &'static str = "Zero";

    pub fn zero() -> Self {
        Self(Self::ZERO.to_string())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == Self::ZERO
    }
}

/// Opaque asset handle. Issued from one counter per simulation and never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AssetId(pub u64);

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

/// One of the three farm upgrade tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FarmPath {
    Top,
    Middle,
    Bottom,
}

impl FarmPath {
    pub const ALL: [FarmPath; 3] = [FarmPath::Top, FarmPath::Middle, FarmPath::Bottom];

    pub fn index(self) -> usize {
        match self {
            FarmPath::Top => 0,
            FarmPath::Middle => 1,
            FarmPath::Bottom => 2,
        }
    }
}

/// Cooldown-based income assets that share one payout model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropperClass {
    Druid,
    SupplyDrop,
    Heli,
}

impl DropperClass {
    pub const ALL: [DropperClass; 3] = [
        DropperClass::Druid,
        DropperClass::SupplyDrop,
        DropperClass::Heli,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DropperClass::Druid => "druid farm",
            DropperClass::SupplyDrop => "supply drop",
            DropperClass::Heli => "heli farm",
        }
    }

    pub fn specialist_label(self) -> &'static str {
        match self {
            DropperClass::Druid => "Spirit of the Forest",
            DropperClass::SupplyDrop => "Elite Sniper",
            DropperClass::Heli => "Special Poperations",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerKind {
    Eco,
    Buy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Warning,
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcoState {
    pub meta: MetaState,
    pub clock: RoundClock,
    /// Everything a purchase batch may touch. Shadowed wholesale during staging.
    pub portfolio: Portfolio,
    pub send: ActiveSend,
    pub send_slots: SendSlots,
    pub eco_queue: VecDeque<EcoQueueEntry>,
    pub buy_queue: VecDeque<PurchaseBatch>,
    /// Minimum execution time of the head batch, cached until it commits or is dropped.
    pub buy_gate: Option<f64>,
    /// Set when the head batch hit a singleton conflict. Cleared on each `fast_forward`.
    pub queue_blocked: bool,
    pub trajectory: Vec<TrajectorySample>,
    pub markers: Vec<Marker>,
    pub log: AdvisoryLog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaState {
    pub time: f64,
    pub round: u32,
    pub content_version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Wallet {
    pub cash: f64,
    pub eco: f64,
    pub loan: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Portfolio {
    pub wallet: Wallet,
    pub assets: BTreeMap<AssetId, Asset>,
    pub singletons: Singletons,
    /// Cumulative per-asset income and spend. Survives the asset being sold.
    pub ledgers: BTreeMap<AssetId, AssetLedger>,
    pub auto_buys: AutoBuys,
    pub jericho: Option<JerichoSteal>,
    pub next_asset_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Singletons {
    /// Tier-5 farm present, per path.
    pub farm_paths: [bool; 3],
    pub trade_empire: bool,
    pub spirit_of_the_forest: Option<AssetId>,
    pub elite_sniper: Option<AssetId>,
    pub special_poperations: Option<AssetId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetLedger {
    pub revenue: f64,
    pub expenses: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AutoBuys {
    pub druid: Option<AutoBuy>,
    pub supply_drop: Option<AutoBuy>,
    pub heli: Option<AutoBuy>,
}

/// Keep buying one dropper class whenever cash covers cost plus `buffer`, until `until`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoBuy {
    pub until: f64,
    pub buffer: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JerichoSteal {
    pub start: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSend {
    pub strategy: StrategyId,
    pub cost: f64,
    pub gain: f64,
    pub duration: f64,
    pub max_sends: Option<u32>,
    pub max_eco: Option<f64>,
    pub sends_made: u32,
}

impl ActiveSend {
    pub fn idle() -> Self {
        Self {
            strategy: StrategyId::zero(),
            cost: 0.0,
            gain: 0.0,
            duration: 0.0,
            max_sends: None,
            max_eco: None,
            sends_made: 0,
        }
    }

    pub fn send_cap_reached(&self) -> bool {
        self.max_sends.is_some_and(|max| self.sends_made >= max)
    }

    pub fn eco_cap_reached(&self, eco: f64) -> bool {
        self.max_eco.is_some_and(|max| eco >= max)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SendSlots {
    /// Resolve times of in-flight sends, oldest first.
    pub resolves: SmallVec<[f64; 6]>,
    pub unlock_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcoQueueEntry {
    pub time: f64,
    pub strategy: StrategyId,
    #[serde(default)]
    pub fortified: bool,
    #[serde(default)]
    pub camo: bool,
    #[serde(default)]
    pub regrow: bool,
    #[serde(default)]
    pub max_sends: Option<u32>,
    #[serde(default)]
    pub max_eco: Option<f64>,
}

impl EcoQueueEntry {
    pub fn new(time: f64, strategy: impl Into<StrategyId>) -> Self {
        Self {
            time,
            strategy: strategy.into(),
            fortified: false,
            camo: false,
            regrow: false,
            max_sends: None,
            max_eco: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub time: f64,
    pub cash: f64,
    pub eco: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub time: f64,
    pub message: String,
    pub kind: MarkerKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Human-readable side channel. Carries no control flow.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdvisoryLog {
    pub entries: Vec<LogEntry>,
}

impl AdvisoryLog {
    pub fn info(&mut self, message: String) {
        tracing::debug!("{message}");
        self.entries.push(LogEntry {
            level: LogLevel::Info,
            message,
        });
    }

    pub fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.entries.push(LogEntry {
            level: LogLevel::Warning,
            message,
        });
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.level == LogLevel::Warning)
            .map(|e| e.message.as_str())
    }
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

/// Upgrade levels on the top, middle and bottom farm paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Upgrades(pub [u8; 3]);

impl Upgrades {
    pub fn level(self, path: FarmPath) -> u8 {
        self.0[path.index()]
    }

    pub fn top(self) -> u8 {
        self.0[0]
    }

    pub fn middle(self) -> u8 {
        self.0[1]
    }

    pub fn bottom(self) -> u8 {
        self.0[2]
    }

    /// Same triple with `path` one level higher, or `None` when already maxed.
    pub fn raised(self, path: FarmPath) -> Option<Self> {
        let mut levels = self.0;
        let level = &mut levels[path.index()];
        if *level >= 5 {
            return None;
        }
        *level += 1;
        Some(Self(levels))
    }

    /// Path holding tier 5, if any.
    pub fn tier_five_path(self) -> Option<FarmPath> {
        FarmPath::ALL.into_iter().find(|&p| self.level(p) == 5)
    }
}

impl std::fmt::Display for Upgrades {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.0[0], self.0[1], self.0[2])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub purchase_time: f64,
    pub kind: AssetKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssetKind {
    Farm(Farm),
    Boat(Boat),
    Dropper { class: DropperClass },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Farm {
    pub upgrades: Upgrades,
    pub payout: f64,
    /// Payouts per round, spread over the round's natural send length.
    pub frequency: u32,
    pub sell_value: f64,
    /// Present once the middle path reaches the bank tier.
    pub account: Option<BankAccount>,
    /// Next time the middle-path ability may fire or be activated.
    pub next_ability_time: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BankAccount {
    pub value: f64,
    pub capacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boat {
    /// 3 = Merchantmen, 4 = Favored Trades, 5 = Trade Empire.
    pub tier: u8,
}

// ---------------------------------------------------------------------------
// Payout events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutEvent {
    pub time: f64,
    pub kind: PayoutKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PayoutKind {
    /// Periodic payout of the current eco.
    Eco,
    Direct { amount: f64, source: PayoutSource },
    /// Round-start interest on a bank account. Always immediately precedes its deposit.
    BankInterest { asset: AssetId },
    BankDeposit { asset: AssetId, amount: f64 },
    /// Zero-amount marker at the window's target time.
    Sentinel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoutSource {
    Farm(AssetId),
    Ability(AssetId),
    Dropper(AssetId),
    Boats,
    SpiritBonus,
    Jericho,
}

impl PayoutSource {
    /// Asset whose ledger this payout is credited to.
    pub fn asset(self) -> Option<AssetId> {
        match self {
            PayoutSource::Farm(id) | PayoutSource::Ability(id) | PayoutSource::Dropper(id) => {
                Some(id)
            }
            PayoutSource::Boats | PayoutSource::SpiritBonus | PayoutSource::Jericho => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Purchases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Purchase {
    BuyDefense { cost: f64 },
    BuyFarm,
    UpgradeFarm { asset: AssetId, path: FarmPath },
    SellFarm { asset: AssetId },
    WithdrawBank { asset: AssetId },
    ActivateImf { asset: AssetId },
    BuyBoatFarm,
    UpgradeBoatFarm { asset: AssetId },
    SellBoatFarm { asset: AssetId },
    BuyDropper { class: DropperClass },
    SellDropper { class: DropperClass, asset: AssetId },
    /// Spirit of the Forest, Elite Sniper or Special Poperations, by class.
    BuySpecialist { class: DropperClass, asset: AssetId },
    RepeatedlyBuy { class: DropperClass, until: f64 },
    /// Steals start at the item's `min_time`.
    JerichoSteal { amount: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseItem {
    #[serde(flatten)]
    pub action: Purchase,
    #[serde(default)]
    pub min_time: f64,
    #[serde(default)]
    pub buffer: f64,
}

impl PurchaseItem {
    pub fn new(action: Purchase) -> Self {
        Self {
            action,
            min_time: 0.0,
            buffer: 0.0,
        }
    }

    #[must_use]
    pub fn at(mut self, min_time: f64) -> Self {
        self.min_time = min_time;
        self
    }

    #[must_use]
    pub fn with_buffer(mut self, buffer: f64) -> Self {
        self.buffer = buffer;
        self
    }
}

/// Sub-purchases that commit together or not at all.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseBatch {
    pub items: Vec<PurchaseItem>,
}

impl From<Vec<PurchaseItem>> for PurchaseBatch {
    fn from(items: Vec<PurchaseItem>) -> Self {
        Self { items }
    }
}

impl From<PurchaseItem> for PurchaseBatch {
    fn from(item: PurchaseItem) -> Self {
        Self { items: vec![item] }
    }
}

// ---------------------------------------------------------------------------
// Content types (static catalog, loaded from JSON by eco_world)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub content_version: String,
    pub constants: Constants,
    pub rounds: RoundTable,
    pub strategies: Vec<StrategyDef>,
    pub farm: FarmDef,
    pub boat: BoatDef,
    pub druid: DropperDef,
    pub supply_drop: DropperDef,
    pub heli: DropperDef,
    pub hero: HeroDef,
    /// Lookup tables, rebuilt by [`Catalog::reindex`].
    #[serde(skip)]
    pub index: CatalogIndex,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    pub(crate) strategies: AHashMap<StrategyId, usize>,
    pub(crate) tiers: AHashMap<Upgrades, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    /// Seconds between eco payouts.
    pub eco_interval: f64,
    /// Minimum seconds between two sends.
    pub eco_delay: f64,
    pub max_send_slots: usize,
    pub sellback_rate: f64,
    pub fortified_multiplier: f64,
    pub camo_multiplier: f64,
    pub regrow_multiplier: f64,
    pub fortified_round: u32,
    pub camo_round: u32,
    pub regrow_round: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTable {
    /// Seconds each round spends sending its natural bloons.
    pub natural_send_lengths: Vec<f64>,
    /// Longest possible stall after the natural send, per round.
    pub max_stall_times: Vec<f64>,
    pub min_stall: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyDef {
    pub id: StrategyId,
    pub price: f64,
    pub eco: f64,
    /// Seconds a single send occupies its slot.
    pub duration: f64,
    pub start_round: u32,
    pub end_round: u32,
    #[serde(default)]
    pub fortified: bool,
    #[serde(default)]
    pub camo: bool,
    #[serde(default)]
    pub regrow: bool,
    #[serde(default)]
    pub moab_class: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmDef {
    pub cost: f64,
    /// `[path][current level]` → price of the next level.
    pub upgrade_costs: [[f64; 5]; 3],
    /// Account capacity by middle-path level.
    pub bank_capacity: [f64; 6],
    pub bank_deposit_bonus: f64,
    pub bank_interest_rate: f64,
    pub monkeynomics_payout: f64,
    pub monkeynomics_initial_cooldown: f64,
    pub monkeynomics_usage_cooldown: f64,
    pub imf_loan_amount: f64,
    pub imf_usage_cooldown: f64,
    pub wall_street_bonus: f64,
    pub banana_central_multiplier: f64,
    pub tiers: Vec<FarmTierDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmTierDef {
    pub upgrades: Upgrades,
    pub payout: f64,
    pub frequency: u32,
    pub sell_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoatDef {
    pub cost: f64,
    /// Tier 3 → 4 and tier 4 → 5.
    pub upgrade_costs: [f64; 2],
    /// Round-start payout by tier 3, 4, 5.
    pub payouts: [f64; 3],
    pub sell_values: [f64; 3],
    pub trade_empire_bonus: f64,
    pub trade_empire_max_boats: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropperDef {
    pub cost: f64,
    pub payout: f64,
    pub initial_cooldown: f64,
    pub usage_cooldown: f64,
    pub specialist_cost: f64,
    /// Replaces `payout` for the specialist asset when set.
    #[serde(default)]
    pub specialist_payout: Option<f64>,
    /// Paid at every round start while the specialist exists.
    #[serde(default)]
    pub specialist_round_bonus: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroDef {
    pub jericho_steal_interval: f64,
    pub jericho_steals: u32,
}
