use chrono::{DateTime, Utc};
use gymbo_domain as domain;
use gymbo_domain::{ReadError, WriteError};

pub trait StopwatchService {
    fn get_stopwatch(&self) -> Result<Option<domain::StopwatchSnapshot>, ReadError>;
    fn set_stopwatch(&self, snapshot: &domain::StopwatchSnapshot) -> Result<(), WriteError>;
}

/// Opaque storage of the encoded stopwatch state.
pub trait StopwatchRepository {
    fn read_stopwatch(&self) -> Result<Option<Vec<u8>>, ReadError>;
    fn write_stopwatch(&self, blob: Vec<u8>) -> Result<(), WriteError>;
}

pub fn encode(snapshot: &domain::StopwatchSnapshot) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(&Stopwatch::from(snapshot))?)
}

pub fn decode(blob: &[u8]) -> Result<domain::StopwatchSnapshot, CodecError> {
    Ok(serde_json::from_slice::<Stopwatch>(blob)?.into())
}

#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error("invalid stopwatch data: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Stopwatch {
    pub timestamp: DateTime<Utc>,
    pub state: State,
    pub minutes: u32,
    pub seconds: u32,
    pub centi_seconds: u32,
    pub laps: Vec<Lap>,
    pub time_when_lapped: Vec<Lap>,
    pub fastest_lap: Option<Lap>,
    pub slowest_lap: Option<Lap>,
}

impl From<&domain::StopwatchSnapshot> for Stopwatch {
    fn from(value: &domain::StopwatchSnapshot) -> Self {
        Self {
            timestamp: value.accumulator.timestamp,
            state: value.accumulator.state.into(),
            minutes: value.accumulator.minutes,
            seconds: value.accumulator.seconds,
            centi_seconds: value.accumulator.centi_seconds,
            laps: value.laps.iter().map(Lap::from).collect(),
            time_when_lapped: value.time_when_lapped.iter().map(Lap::from).collect(),
            fastest_lap: value.fastest_lap.as_ref().map(Lap::from),
            slowest_lap: value.slowest_lap.as_ref().map(Lap::from),
        }
    }
}

impl From<Stopwatch> for domain::StopwatchSnapshot {
    fn from(value: Stopwatch) -> Self {
        Self {
            accumulator: domain::AccumulatorSnapshot {
                timestamp: value.timestamp,
                state: value.state.into(),
                minutes: value.minutes,
                seconds: value.seconds,
                centi_seconds: value.centi_seconds,
            },
            laps: value.laps.into_iter().map(domain::Lap::from).collect(),
            time_when_lapped: value
                .time_when_lapped
                .into_iter()
                .map(domain::Lap::from)
                .collect(),
            fastest_lap: value.fastest_lap.map(domain::Lap::from),
            slowest_lap: value.slowest_lap.map(domain::Lap::from),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lap {
    pub minutes: u32,
    pub seconds: u32,
    pub centi_seconds: u32,
}

impl From<&domain::Lap> for Lap {
    fn from(value: &domain::Lap) -> Self {
        Self {
            minutes: value.minutes,
            seconds: value.seconds,
            centi_seconds: value.centi_seconds,
        }
    }
}

impl From<Lap> for domain::Lap {
    fn from(value: Lap) -> Self {
        Self::new(value.minutes, value.seconds, value.centi_seconds)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Initial,
    Started,
    Stopped,
}

impl From<domain::StopwatchState> for State {
    fn from(value: domain::StopwatchState) -> Self {
        match value {
            domain::StopwatchState::Initial => State::Initial,
            domain::StopwatchState::Started => State::Started,
            domain::StopwatchState::Stopped => State::Stopped,
        }
    }
}

impl From<State> for domain::StopwatchState {
    fn from(value: State) -> Self {
        match value {
            State::Initial => domain::StopwatchState::Initial,
            State::Started => domain::StopwatchState::Started,
            State::Stopped => domain::StopwatchState::Stopped,
        }
    }
}
