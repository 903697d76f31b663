//! `eco_core`: deterministic economy simulation.
//!
//! No IO, no randomness. Every operation takes the state and the static
//! catalog explicitly; nothing is global.

mod assets;
mod catalog;
mod clock;
pub mod compare;
mod eco_queue;
mod engine;
mod error;
mod init;
mod ledger;
pub mod metrics;
mod purchases;
mod schedule;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use clock::RoundClock;
pub use compare::{compare_strategies, run_strategy, Comparison, Strategy, StrategyOutcome};
pub use eco_queue::change_strategy;
pub use engine::{advance, change_stall_factor, fast_forward, AdvanceOutcome, Target, DEFAULT_INTERVAL};
pub use error::SnapshotError;
pub use init::{BoatSnapshot, DropperSnapshot, FarmSnapshot, InitialSnapshot, StartPoint};
pub use ledger::impact;
pub use metrics::{compute_summary, estimated_farm_income, EcoSummary, Envelope};
pub use schedule::{boat_round_payout, schedule};
pub use types::*;

#[cfg(test)]
mod tests;
