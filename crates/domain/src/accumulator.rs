use chrono::{DateTime, Utc};
use derive_more::Display;
use log::debug;

use crate::{CENTISECONDS_PER_SECOND, Lap};

#[derive(Display, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StopwatchState {
    #[default]
    #[display("initial")]
    Initial,
    #[display("started")]
    Started,
    #[display("stopped")]
    Stopped,
}

/// Elapsed time of the stopwatch, advanced one centisecond per tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimeAccumulator {
    state: StopwatchState,
    minutes: u32,
    seconds: u32,
    centi_seconds: u32,
}

/// State of a [`TimeAccumulator`] at a point in wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccumulatorSnapshot {
    pub timestamp: DateTime<Utc>,
    pub state: StopwatchState,
    pub minutes: u32,
    pub seconds: u32,
    pub centi_seconds: u32,
}

impl TimeAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) {
        self.centi_seconds += 1;
        if u64::from(self.centi_seconds) >= CENTISECONDS_PER_SECOND {
            self.centi_seconds = 0;
            self.seconds += 1;
        }
        if self.seconds >= 60 {
            self.seconds = 0;
            self.minutes = self.minutes.saturating_add(1);
        }
    }

    /// Returns `true` if the stopwatch was not running before.
    pub fn start(&mut self) -> bool {
        match self.state {
            StopwatchState::Initial | StopwatchState::Stopped => {
                self.state = StopwatchState::Started;
                true
            }
            StopwatchState::Started => false,
        }
    }

    /// Returns `true` if the stopwatch was running before.
    pub fn stop(&mut self) -> bool {
        match self.state {
            StopwatchState::Started => {
                self.state = StopwatchState::Stopped;
                true
            }
            StopwatchState::Initial | StopwatchState::Stopped => false,
        }
    }

    /// Zeroes the counters. Only possible while stopped.
    pub fn reset(&mut self) -> bool {
        match self.state {
            StopwatchState::Stopped => {
                *self = Self::default();
                true
            }
            StopwatchState::Initial | StopwatchState::Started => false,
        }
    }

    #[must_use]
    pub fn persist(&self, now: DateTime<Utc>) -> AccumulatorSnapshot {
        AccumulatorSnapshot {
            timestamp: now,
            state: self.state,
            minutes: self.minutes,
            seconds: self.seconds,
            centi_seconds: self.centi_seconds,
        }
    }

    /// Rebuilds the accumulator from a snapshot.
    ///
    /// The time between the snapshot and `now` is added if the stopwatch was
    /// running when the snapshot was taken. A clock that went backwards adds
    /// nothing.
    pub fn restore(
        snapshot: &AccumulatorSnapshot,
        now: DateTime<Utc>,
    ) -> Result<Self, AccumulatorError> {
        if snapshot.seconds >= 60 || u64::from(snapshot.centi_seconds) >= CENTISECONDS_PER_SECOND {
            return Err(AccumulatorError::OutOfRange(Lap::new(
                snapshot.minutes,
                snapshot.seconds,
                snapshot.centi_seconds,
            )));
        }

        let saved = Lap::new(snapshot.minutes, snapshot.seconds, snapshot.centi_seconds);

        let elapsed = match snapshot.state {
            StopwatchState::Started => {
                let gap = u64::try_from((now - snapshot.timestamp).num_milliseconds() / 10)
                    .unwrap_or(0);
                debug!("restoring running stopwatch after {gap} cs in background");
                Lap::from_centiseconds(saved.total_time().saturating_add(gap))
            }
            StopwatchState::Initial | StopwatchState::Stopped => saved,
        };

        Ok(Self {
            state: snapshot.state,
            minutes: elapsed.minutes,
            seconds: elapsed.seconds,
            centi_seconds: elapsed.centi_seconds,
        })
    }

    #[must_use]
    pub fn state(&self) -> StopwatchState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == StopwatchState::Started
    }

    #[must_use]
    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    #[must_use]
    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    #[must_use]
    pub fn centi_seconds(&self) -> u32 {
        self.centi_seconds
    }

    /// The current counters as an absolute lap time.
    #[must_use]
    pub fn elapsed(&self) -> Lap {
        Lap::new(self.minutes, self.seconds, self.centi_seconds)
    }

    #[must_use]
    pub fn total_centiseconds(&self) -> u64 {
        self.elapsed().total_time()
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AccumulatorError {
    #[error("elapsed time out of range ({0})")]
    OutOfRange(Lap),
}
