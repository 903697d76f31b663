//! Asset records: construction from the catalog and roster bookkeeping.

use crate::{
    Asset, AssetId, AssetKind, AssetLedger, BankAccount, Boat, Catalog, DropperClass, Farm,
    Portfolio, Singletons, Upgrades,
};

impl Farm {
    /// Farm at `upgrades`, bought at `purchase_time`. `None` if the tier is not in the catalog.
    pub fn from_catalog(catalog: &Catalog, upgrades: Upgrades, purchase_time: f64) -> Option<Self> {
        let mut farm = Self {
            upgrades,
            payout: 0.0,
            frequency: 0,
            sell_value: 0.0,
            account: None,
            next_ability_time: None,
        };
        farm.retier(catalog, upgrades, purchase_time)?;
        Some(farm)
    }

    /// Move to `upgrades`, refreshing payout figures, bank capacity and ability timing.
    ///
    /// An existing account balance carries over. The ability cooldown restarts
    /// only when the middle path itself changes.
    pub(crate) fn retier(
        &mut self,
        catalog: &Catalog,
        upgrades: Upgrades,
        now: f64,
    ) -> Option<()> {
        let tier = catalog.farm_tier(upgrades)?;
        let middle_changed = self.upgrades.middle() != upgrades.middle();
        self.upgrades = upgrades;
        self.payout = tier.payout;
        self.frequency = tier.frequency;
        self.sell_value = tier.sell_value;
        if self.is_bank() {
            let capacity = catalog.bank_capacity(upgrades.middle());
            let value = self.account.map_or(0.0, |a| a.value);
            self.account = Some(BankAccount { value, capacity });
        } else {
            self.account = None;
        }
        if upgrades.middle() < 4 {
            self.next_ability_time = None;
        } else if middle_changed || self.next_ability_time.is_none() {
            self.next_ability_time = Some(now + catalog.farm.monkeynomics_initial_cooldown);
        }
        Some(())
    }

    pub fn is_bank(&self) -> bool {
        self.upgrades.middle() >= 3
    }

    /// Middle path 4: can take out an IMF loan.
    pub fn is_imf(&self) -> bool {
        self.upgrades.middle() == 4
    }

    /// Middle path 5: pays out on its own cooldown.
    pub fn is_monkeynomics(&self) -> bool {
        self.upgrades.middle() == 5
    }
}

impl Singletons {
    pub fn specialist(&self, class: DropperClass) -> Option<AssetId> {
        match class {
            DropperClass::Druid => self.spirit_of_the_forest,
            DropperClass::SupplyDrop => self.elite_sniper,
            DropperClass::Heli => self.special_poperations,
        }
    }

    pub fn set_specialist(&mut self, class: DropperClass, asset: Option<AssetId>) {
        let slot = match class {
            DropperClass::Druid => &mut self.spirit_of_the_forest,
            DropperClass::SupplyDrop => &mut self.elite_sniper,
            DropperClass::Heli => &mut self.special_poperations,
        };
        *slot = asset;
    }
}

impl Portfolio {
    /// Add an asset under a freshly issued id.
    pub fn insert_asset(&mut self, purchase_time: f64, kind: AssetKind) -> AssetId {
        let id = AssetId(self.next_asset_id);
        self.next_asset_id += 1;
        self.assets.insert(
            id,
            Asset {
                id,
                purchase_time,
                kind,
            },
        );
        id
    }

    pub fn farm(&self, id: AssetId) -> Option<&Farm> {
        match &self.assets.get(&id)?.kind {
            AssetKind::Farm(farm) => Some(farm),
            _ => None,
        }
    }

    pub fn farm_mut(&mut self, id: AssetId) -> Option<&mut Farm> {
        match &mut self.assets.get_mut(&id)?.kind {
            AssetKind::Farm(farm) => Some(farm),
            _ => None,
        }
    }

    pub fn boat_mut(&mut self, id: AssetId) -> Option<&mut Boat> {
        match &mut self.assets.get_mut(&id)?.kind {
            AssetKind::Boat(boat) => Some(boat),
            _ => None,
        }
    }

    pub fn dropper_class(&self, id: AssetId) -> Option<DropperClass> {
        match self.assets.get(&id)?.kind {
            AssetKind::Dropper { class } => Some(class),
            _ => None,
        }
    }

    /// Farms in id order, with their purchase time.
    pub fn farms(&self) -> impl Iterator<Item = (&Asset, &Farm)> {
        self.assets.values().filter_map(|asset| match &asset.kind {
            AssetKind::Farm(farm) => Some((asset, farm)),
            _ => None,
        })
    }

    pub fn boats(&self) -> impl Iterator<Item = &Boat> {
        self.assets.values().filter_map(|asset| match &asset.kind {
            AssetKind::Boat(boat) => Some(boat),
            _ => None,
        })
    }

    pub fn droppers(&self, class: DropperClass) -> impl Iterator<Item = &Asset> {
        self.assets
            .values()
            .filter(move |asset| matches!(asset.kind, AssetKind::Dropper { class: c } if c == class))
    }

    pub fn ledger_mut(&mut self, id: AssetId) -> &mut AssetLedger {
        self.ledgers.entry(id).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::base_catalog;

    #[test]
    fn bank_tier_gets_account_and_keeps_balance_on_retier() {
        let catalog = base_catalog();
        let mut farm = Farm::from_catalog(&catalog, Upgrades([0, 3, 0]), 0.0).unwrap();
        let account = farm.account.unwrap();
        assert!((account.capacity - 14_000.0).abs() < 1e-9);
        farm.account = Some(BankAccount {
            value: 500.0,
            capacity: account.capacity,
        });

        farm.retier(&catalog, Upgrades([0, 4, 0]), 30.0).unwrap();
        let account = farm.account.unwrap();
        assert!((account.value - 500.0).abs() < 1e-9);
        assert!((account.capacity - 20_000.0).abs() < 1e-9);
        assert!((farm.next_ability_time.unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_tier_is_rejected() {
        let catalog = base_catalog();
        assert!(Farm::from_catalog(&catalog, Upgrades([3, 3, 3]), 0.0).is_none());
    }

    #[test]
    fn ids_are_never_reused() {
        let mut portfolio = Portfolio::default();
        let a = portfolio.insert_asset(0.0, AssetKind::Boat(Boat { tier: 3 }));
        portfolio.assets.remove(&a);
        let b = portfolio.insert_asset(
            0.0,
            AssetKind::Dropper {
                class: DropperClass::Heli,
            },
        );
        assert_ne!(a, b);
    }
}
