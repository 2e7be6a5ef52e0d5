use chrono::{DateTime, Utc};

use crate::{
    AccumulatorError, AccumulatorSnapshot, DeltaMode, Lap, LapLedger, LedgerError,
    TimeAccumulator,
};

/// Everything needed to bring the stopwatch back after the app was suspended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopwatchSnapshot {
    pub accumulator: AccumulatorSnapshot,
    pub laps: Vec<Lap>,
    pub time_when_lapped: Vec<Lap>,
    pub fastest_lap: Option<Lap>,
    pub slowest_lap: Option<Lap>,
}

impl StopwatchSnapshot {
    #[must_use]
    pub fn capture(accumulator: &TimeAccumulator, ledger: &LapLedger, now: DateTime<Utc>) -> Self {
        Self {
            accumulator: accumulator.persist(now),
            laps: ledger.laps().iter().copied().collect(),
            time_when_lapped: ledger.time_when_lapped().iter().copied().collect(),
            fastest_lap: ledger.fastest_lap(),
            slowest_lap: ledger.slowest_lap(),
        }
    }

    pub fn restore(
        self,
        now: DateTime<Utc>,
        mode: DeltaMode,
    ) -> Result<(TimeAccumulator, LapLedger), SnapshotError> {
        let accumulator = TimeAccumulator::restore(&self.accumulator, now)?;
        let ledger = LapLedger::from_parts(
            self.laps,
            self.time_when_lapped,
            self.fastest_lap,
            self.slowest_lap,
            mode,
        )?;
        Ok((accumulator, ledger))
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SnapshotError {
    #[error(transparent)]
    Accumulator(#[from] AccumulatorError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
