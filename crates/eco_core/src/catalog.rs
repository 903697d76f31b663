//! Read-only lookups over the static catalog.

use crate::{Catalog, DropperClass, DropperDef, FarmPath, FarmTierDef, StrategyDef, StrategyId, Upgrades};

impl Catalog {
    /// Rebuild the lookup indices. Call after deserializing or editing tables.
    pub fn reindex(&mut self) {
        self.index.strategies = self
            .strategies
            .iter()
            .enumerate()
            .map(|(i, def)| (def.id.clone(), i))
            .collect();
        self.index.tiers = self
            .farm
            .tiers
            .iter()
            .enumerate()
            .map(|(i, tier)| (tier.upgrades, i))
            .collect();
    }

    pub fn strategy(&self, id: &StrategyId) -> Option<&StrategyDef> {
        match self.index.strategies.get(id) {
            Some(&i) => self.strategies.get(i),
            None => self.strategies.iter().find(|def| &def.id == id),
        }
    }

    pub fn farm_tier(&self, upgrades: Upgrades) -> Option<&FarmTierDef> {
        match self.index.tiers.get(&upgrades) {
            Some(&i) => self.farm.tiers.get(i),
            None => self.farm.tiers.iter().find(|tier| tier.upgrades == upgrades),
        }
    }

    /// Price of raising `path` from `level` to `level + 1`.
    pub fn farm_upgrade_cost(&self, path: FarmPath, level: u8) -> Option<f64> {
        self.farm.upgrade_costs[path.index()]
            .get(usize::from(level))
            .copied()
    }

    pub fn bank_capacity(&self, middle: u8) -> f64 {
        self.farm
            .bank_capacity
            .get(usize::from(middle))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn dropper(&self, class: DropperClass) -> &DropperDef {
        match class {
            DropperClass::Druid => &self.druid,
            DropperClass::SupplyDrop => &self.supply_drop,
            DropperClass::Heli => &self.heli,
        }
    }

    /// Boat payout, upgrade and sell tables are indexed from tier 3.
    pub(crate) fn boat_slot(tier: u8) -> usize {
        usize::from(tier.saturating_sub(3)).min(2)
    }
}
