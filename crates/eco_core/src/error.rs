use thiserror::Error;

use crate::{StrategyId, Upgrades};

/// Fatal problems with the input a simulation is built from.
///
/// Everything that goes wrong once a simulation is running is recoverable and
/// lands in the advisory log instead.
#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("invalid round table: {0}")]
    InvalidRoundTable(String),
    #[error("unknown strategy '{0}'")]
    UnknownStrategy(StrategyId),
    #[error("farm {index}: upgrade path {upgrades} is not in the catalog")]
    UnknownFarmTier { index: usize, upgrades: Upgrades },
    #[error("farm {index}: a tier-5 farm already exists on path {path}")]
    DuplicateTierFive { index: usize, path: usize },
    #[error("boat {index}: tier {tier} is outside 3..=5")]
    InvalidBoatTier { index: usize, tier: u8 },
    #[error("boat {index}: only one Trade Empire may exist")]
    DuplicateTradeEmpire { index: usize },
    #[error("{class}: specialist index {index} is out of range ({count} assets)")]
    SpecialistOutOfRange {
        class: &'static str,
        index: usize,
        count: usize,
    },
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidAmount { field: &'static str, value: f64 },
}
