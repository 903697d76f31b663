//! Round clock: maps continuous game time to round indices and back.

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::RoundTable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundClock {
    table: RoundTable,
    stall_factor: f64,
    /// `round_starts[r]` is when round `r` begins; the final entry closes the last round.
    round_starts: Vec<f64>,
}

impl RoundClock {
    /// Build the clock with every round stalled by `stall_factor` (0 = minimum stall, 1 = maximum).
    pub fn new(table: &RoundTable, stall_factor: f64) -> Result<Self, SnapshotError> {
        if table.natural_send_lengths.is_empty()
            || table.natural_send_lengths.len() != table.max_stall_times.len()
        {
            return Err(SnapshotError::InvalidRoundTable(format!(
                "{} natural send lengths vs {} stall times",
                table.natural_send_lengths.len(),
                table.max_stall_times.len()
            )));
        }
        if !(0.0..=1.0).contains(&stall_factor) {
            return Err(SnapshotError::InvalidRoundTable(format!(
                "stall factor {stall_factor} outside [0, 1]"
            )));
        }
        let mut clock = Self {
            table: table.clone(),
            stall_factor,
            round_starts: vec![0.0; table.natural_send_lengths.len() + 1],
        };
        clock.recompute_from(0);
        if let Some(round) = clock.round_starts.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SnapshotError::InvalidRoundTable(format!(
                "round {round} has non-positive length"
            )));
        }
        Ok(clock)
    }

    pub fn stall_factor(&self) -> f64 {
        self.stall_factor
    }

    pub fn round_starts(&self) -> &[f64] {
        &self.round_starts
    }

    /// Index of the last round the table knows about.
    pub fn last_round(&self) -> u32 {
        u32::try_from(self.round_starts.len() - 1).unwrap_or(u32::MAX)
    }

    /// Start time of `round`; rounds past the table never start.
    pub fn round_start(&self, round: u32) -> f64 {
        self.round_starts
            .get(round as usize)
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    /// Seconds the round spends sending its natural bloons. Past the table, the last known length.
    pub fn natural_send_length(&self, round: u32) -> f64 {
        let lengths = &self.table.natural_send_lengths;
        lengths
            .get(round as usize)
            .or_else(|| lengths.last())
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    /// Linear interpolation between bracketing round starts, clamped to the table.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to table range
    pub fn time_for_round(&self, round: f64) -> f64 {
        let last = (self.round_starts.len() - 1) as f64;
        let round = round.clamp(0.0, last);
        let lower = round.floor();
        let index = lower as usize;
        let base = self.round_starts[index];
        match self.round_starts.get(index + 1) {
            Some(next) => base + (round - lower) * (next - base),
            None => base,
        }
    }

    /// Greatest round whose start is at or before `time`.
    pub fn round_for_time(&self, time: f64) -> u32 {
        let count = self.round_starts.partition_point(|&start| start <= time);
        u32::try_from(count.saturating_sub(1)).unwrap_or(u32::MAX)
    }

    /// Scan forward from `round` while the next round has already started.
    pub fn advance_round(&self, mut round: u32, time: f64) -> u32 {
        while round < self.last_round() && self.round_start(round + 1) <= time {
            round += 1;
        }
        round
    }

    /// Re-stall every round that has not yet reached its stall phase at `now`.
    ///
    /// Round starts that are already behind us never move.
    pub fn change_stall_factor(&mut self, stall_factor: f64, now: f64) {
        let stall_factor = stall_factor.clamp(0.0, 1.0);
        let round = self.round_for_time(now);
        let natural_end = self.round_start(round) + self.natural_send_length(round);
        let from = if now < natural_end { round } else { round + 1 };
        self.stall_factor = stall_factor;
        self.recompute_from(from as usize);
    }

    fn round_length(&self, round: usize) -> f64 {
        let sf = self.stall_factor;
        self.table.natural_send_lengths[round]
            + (1.0 - sf) * self.table.min_stall
            + sf * self.table.max_stall_times[round]
    }

    fn recompute_from(&mut self, from: usize) {
        for round in from..self.table.natural_send_lengths.len() {
            self.round_starts[round + 1] = self.round_starts[round] + self.round_length(round);
        }
    }
}
