use std::collections::VecDeque;

use log::debug;

use crate::Lap;

/// Laps recorded while the stopwatch runs.
///
/// Both sequences are ordered newest first and always have the same length.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LapLedger {
    laps: VecDeque<Lap>,
    time_when_lapped: VecDeque<Lap>,
    fastest_lap: Option<Lap>,
    slowest_lap: Option<Lap>,
    mode: DeltaMode,
}

/// How the delta between two consecutive lap presses is computed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DeltaMode {
    /// Absolute difference of each component on its own.
    #[default]
    Componentwise,
    /// Difference of the total times.
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LapColor {
    Default,
    Fastest,
    Slowest,
}

impl LapLedger {
    #[must_use]
    pub fn new(mode: DeltaMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn from_parts(
        laps: Vec<Lap>,
        time_when_lapped: Vec<Lap>,
        fastest_lap: Option<Lap>,
        slowest_lap: Option<Lap>,
        mode: DeltaMode,
    ) -> Result<Self, LedgerError> {
        if laps.len() != time_when_lapped.len() {
            return Err(LedgerError::LengthMismatch {
                laps: laps.len(),
                time_when_lapped: time_when_lapped.len(),
            });
        }
        if laps.is_empty() != fastest_lap.is_none() || laps.is_empty() != slowest_lap.is_none() {
            return Err(LedgerError::InconsistentExtremes);
        }
        if let (Some(fastest), Some(slowest)) = (fastest_lap, slowest_lap) {
            let totals = laps.iter().map(Lap::total_time);
            for (lap, expected) in [(fastest, totals.clone().min()), (slowest, totals.max())] {
                if !laps.contains(&lap) || Some(lap.total_time()) != expected {
                    return Err(LedgerError::InvalidExtreme(lap));
                }
            }
        }
        Ok(Self {
            laps: laps.into(),
            time_when_lapped: time_when_lapped.into(),
            fastest_lap,
            slowest_lap,
            mode,
        })
    }

    /// Records a lap pressed at `absolute` elapsed time and returns its delta.
    pub fn add_lap(&mut self, absolute: Lap) -> Lap {
        let delta = match (self.time_when_lapped.front(), self.mode) {
            (None, _) => absolute,
            (Some(previous), DeltaMode::Componentwise) => absolute.componentwise_delta(previous),
            (Some(previous), DeltaMode::Duration) => absolute.duration_since(previous),
        };

        self.time_when_lapped.push_front(absolute);

        match self.fastest_lap {
            Some(fastest) if delta.total_time() > fastest.total_time() => {}
            _ => self.fastest_lap = Some(delta),
        }
        match self.slowest_lap {
            Some(slowest) if delta.total_time() < slowest.total_time() => {}
            _ => self.slowest_lap = Some(delta),
        }

        self.laps.push_front(delta);

        debug!("lap {} recorded at {absolute} ({delta})", self.laps.len());

        delta
    }

    pub fn clear(&mut self) {
        self.laps.clear();
        self.time_when_lapped.clear();
        self.fastest_lap = None;
        self.slowest_lap = None;
    }

    /// Classifies a lap for highlighting.
    ///
    /// Highlighting requires more than two laps.
    #[must_use]
    pub fn color(&self, lap: &Lap) -> LapColor {
        if self.laps.len() <= 2 {
            return LapColor::Default;
        }
        match (self.fastest_lap, self.slowest_lap) {
            (Some(fastest), _) if lap.total_time() <= fastest.total_time() => LapColor::Fastest,
            (_, Some(slowest)) if lap.total_time() >= slowest.total_time() => LapColor::Slowest,
            _ => LapColor::Default,
        }
    }

    #[must_use]
    pub fn laps(&self) -> &VecDeque<Lap> {
        &self.laps
    }

    #[must_use]
    pub fn time_when_lapped(&self) -> &VecDeque<Lap> {
        &self.time_when_lapped
    }

    #[must_use]
    pub fn fastest_lap(&self) -> Option<Lap> {
        self.fastest_lap
    }

    #[must_use]
    pub fn slowest_lap(&self) -> Option<Lap> {
        self.slowest_lap
    }

    #[must_use]
    pub fn mode(&self) -> DeltaMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DeltaMode) {
        self.mode = mode;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.laps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LedgerError {
    #[error("number of laps ({laps}) differs from number of lap times ({time_when_lapped})")]
    LengthMismatch {
        laps: usize,
        time_when_lapped: usize,
    },
    #[error("fastest and slowest lap must be set if and only if laps exist")]
    InconsistentExtremes,
    #[error("fastest or slowest lap {0} does not match the recorded laps")]
    InvalidExtreme(Lap),
}
