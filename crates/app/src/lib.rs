#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod log;
pub mod service;
pub mod settings;
pub mod snapshot;
pub mod stopwatch;

pub use service::Service;
pub use settings::{Settings, SettingsRepository, SettingsService};
pub use snapshot::{StopwatchRepository, StopwatchService};
pub use stopwatch::{Controls, Digits, LapRow, StopwatchController, TICK_INTERVAL, Ticker};
