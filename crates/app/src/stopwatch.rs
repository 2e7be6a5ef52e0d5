use std::time::Duration;

use chrono::{DateTime, Utc};
use gymbo_domain::{
    LapColor, LapLedger, StopwatchSnapshot, StopwatchState, TimeAccumulator, two_digits,
};
use log::{debug, info, warn};

use crate::{
    Service, Settings, SettingsRepository, SettingsService, StopwatchRepository, StopwatchService,
};

/// Period of [`StopwatchController::tick`]. Every tick adds one centisecond.
pub const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Periodic timer of the host application.
///
/// Scheduled callbacks must call [`StopwatchController::tick`] on the same
/// sequential queue as all other controller calls.
pub trait Ticker {
    fn schedule(&mut self, interval: Duration);
    fn cancel(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digits {
    pub minutes: String,
    pub seconds: String,
    pub centi_seconds: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LapRow {
    pub label: String,
    pub time: String,
    pub color: LapColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub start_stop: &'static str,
    pub lap_reset: &'static str,
    pub lap_reset_enabled: bool,
}

pub struct StopwatchController<R, T> {
    service: Service<R>,
    ticker: T,
    settings: Settings,
    accumulator: TimeAccumulator,
    ledger: LapLedger,
    suspended: Option<StopwatchSnapshot>,
}

impl<R, T> StopwatchController<R, T>
where
    R: StopwatchRepository + SettingsRepository,
    T: Ticker,
{
    pub fn new(repository: R, ticker: T) -> Self {
        let service = Service::new(repository);
        let settings = service.get_settings().unwrap_or_default();
        Self {
            service,
            ticker,
            settings,
            accumulator: TimeAccumulator::new(),
            ledger: LapLedger::new(settings.delta_mode),
            suspended: None,
        }
    }

    pub fn start_pressed(&mut self) {
        if self.accumulator.start() {
            self.ticker.schedule(TICK_INTERVAL);
        }
    }

    pub fn stop_pressed(&mut self) {
        if self.accumulator.stop() {
            self.ticker.cancel();
        }
    }

    pub fn lap_or_reset_pressed(&mut self) {
        match self.accumulator.state() {
            StopwatchState::Started => {
                self.ledger.add_lap(self.accumulator.elapsed());
            }
            StopwatchState::Stopped => {
                self.accumulator.reset();
                self.ledger.clear();
                debug!("stopwatch reset");
            }
            StopwatchState::Initial => {}
        }
    }

    pub fn tick(&mut self) {
        if self.accumulator.is_running() {
            self.accumulator.tick();
        }
    }

    pub fn app_did_enter_background(&mut self, now: DateTime<Utc>) {
        self.ticker.cancel();
        let snapshot = StopwatchSnapshot::capture(&self.accumulator, &self.ledger, now);
        if let Err(err) = self.service.set_stopwatch(&snapshot) {
            warn!("stopwatch only kept in memory: {err}");
        }
        self.suspended = Some(snapshot);
    }

    /// Resumes from the state captured by [`Self::app_did_enter_background`].
    ///
    /// Without a preceding background event the saved state is loaded.
    pub fn app_will_enter_foreground(&mut self, now: DateTime<Utc>) {
        match self.suspended.take() {
            Some(snapshot) => self.restore(Some(snapshot), now),
            None => self.load(now),
        }
    }

    /// Restores the state saved by [`Self::app_did_enter_background`].
    ///
    /// Missing or unreadable data results in a fresh stopwatch.
    pub fn load(&mut self, now: DateTime<Utc>) {
        self.suspended = None;
        let snapshot = self.service.get_stopwatch().ok().flatten();
        self.restore(snapshot, now);
    }

    fn restore(&mut self, snapshot: Option<StopwatchSnapshot>, now: DateTime<Utc>) {
        self.ticker.cancel();

        let restored = match snapshot.map(|s| s.restore(now, self.settings.delta_mode)) {
            Some(Ok(restored)) => Some(restored),
            Some(Err(err)) => {
                warn!("discarding saved stopwatch: {err}");
                None
            }
            None => None,
        };

        let (accumulator, ledger) = restored.unwrap_or_else(|| {
            (
                TimeAccumulator::new(),
                LapLedger::new(self.settings.delta_mode),
            )
        });
        self.accumulator = accumulator;
        self.ledger = ledger;

        info!(
            "stopwatch {} at {} with {} laps",
            self.accumulator.state(),
            self.accumulator.elapsed(),
            self.ledger.len()
        );

        if self.accumulator.is_running() {
            self.ticker.schedule(TICK_INTERVAL);
        }
    }

    pub fn update_settings(&mut self, settings: Settings) {
        if self.service.set_settings(settings).is_ok() {
            self.settings = settings;
            self.ledger.set_mode(settings.delta_mode);
        }
    }

    #[must_use]
    pub fn digits(&self) -> Digits {
        Digits {
            minutes: two_digits(self.accumulator.minutes()),
            seconds: two_digits(self.accumulator.seconds()),
            centi_seconds: two_digits(self.accumulator.centi_seconds()),
        }
    }

    /// Lap rows, newest first.
    #[must_use]
    pub fn lap_rows(&self) -> Vec<LapRow> {
        let count = self.ledger.len();
        self.ledger
            .laps()
            .iter()
            .enumerate()
            .map(|(i, lap)| LapRow {
                label: format!("Lap {}", count - i),
                time: lap.to_string(),
                color: if self.settings.highlight_laps {
                    self.ledger.color(lap)
                } else {
                    LapColor::Default
                },
            })
            .collect()
    }

    #[must_use]
    pub fn controls(&self) -> Controls {
        match self.accumulator.state() {
            StopwatchState::Initial => Controls {
                start_stop: "Start",
                lap_reset: "Lap",
                lap_reset_enabled: false,
            },
            StopwatchState::Started => Controls {
                start_stop: "Stop",
                lap_reset: "Lap",
                lap_reset_enabled: true,
            },
            StopwatchState::Stopped => Controls {
                start_stop: "Start",
                lap_reset: "Reset",
                lap_reset_enabled: true,
            },
        }
    }

    #[must_use]
    pub fn accumulator(&self) -> &TimeAccumulator {
        &self.accumulator
    }

    #[must_use]
    pub fn ledger(&self) -> &LapLedger {
        &self.ledger
    }

    #[must_use]
    pub fn settings(&self) -> Settings {
        self.settings
    }

    #[must_use]
    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    #[must_use]
    pub fn repository(&self) -> &R {
        self.service.repository()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::{Duration as TimeDelta, TimeZone};
    use gymbo_domain::{DeltaMode, Lap, ReadError, StorageError, WriteError};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Schedule(Duration),
        Cancel,
    }

    #[derive(Default)]
    struct RecordingTicker {
        events: Vec<Event>,
    }

    impl Ticker for RecordingTicker {
        fn schedule(&mut self, interval: Duration) {
            self.events.push(Event::Schedule(interval));
        }

        fn cancel(&mut self) {
            self.events.push(Event::Cancel);
        }
    }

    #[derive(Default)]
    struct Repository {
        stopwatch: RefCell<Option<Vec<u8>>>,
        settings: RefCell<Settings>,
        read_only: bool,
    }

    impl StopwatchRepository for Repository {
        fn read_stopwatch(&self) -> Result<Option<Vec<u8>>, ReadError> {
            Ok(self.stopwatch.borrow().clone())
        }

        fn write_stopwatch(&self, blob: Vec<u8>) -> Result<(), WriteError> {
            if self.read_only {
                return Err(StorageError::Unavailable.into());
            }
            *self.stopwatch.borrow_mut() = Some(blob);
            Ok(())
        }
    }

    impl SettingsRepository for Repository {
        fn read_settings(&self) -> Result<Settings, ReadError> {
            Ok(*self.settings.borrow())
        }

        fn write_settings(&self, settings: Settings) -> Result<(), WriteError> {
            if self.read_only {
                return Err(StorageError::Unavailable.into());
            }
            *self.settings.borrow_mut() = settings;
            Ok(())
        }
    }

    type Controller = StopwatchController<Repository, RecordingTicker>;

    fn controller() -> Controller {
        StopwatchController::new(Repository::default(), RecordingTicker::default())
    }

    fn time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 18, 30, 0).unwrap()
    }

    fn tick(controller: &mut Controller, ticks: usize) {
        for _ in 0..ticks {
            controller.tick();
        }
    }

    fn digits(minutes: &str, seconds: &str, centi_seconds: &str) -> Digits {
        Digits {
            minutes: minutes.to_string(),
            seconds: seconds.to_string(),
            centi_seconds: centi_seconds.to_string(),
        }
    }

    fn row(label: &str, time: &str, color: LapColor) -> LapRow {
        LapRow {
            label: label.to_string(),
            time: time.to_string(),
            color,
        }
    }

    #[test]
    fn test_start_lap_stop_reset() {
        let mut controller = controller();

        controller.start_pressed();
        tick(&mut controller, 130);
        controller.lap_or_reset_pressed();

        assert_eq!(controller.ledger().laps(), &[Lap::new(0, 1, 30)]);
        assert_eq!(
            controller.lap_rows(),
            vec![row("Lap 1", "00:01.30", LapColor::Default)]
        );
        assert_eq!(controller.digits(), digits("00", "01", "30"));

        controller.stop_pressed();
        controller.lap_or_reset_pressed();

        assert_eq!(controller.accumulator().elapsed(), Lap::new(0, 0, 0));
        assert_eq!(controller.accumulator().state(), StopwatchState::Initial);
        assert!(controller.ledger().is_empty());
        assert_eq!(controller.ledger().fastest_lap(), None);
        assert_eq!(controller.ledger().slowest_lap(), None);
        assert_eq!(controller.digits(), digits("00", "00", "00"));
        assert_eq!(
            controller.ticker().events,
            vec![Event::Schedule(TICK_INTERVAL), Event::Cancel]
        );
    }

    #[test]
    fn test_tick_only_while_started() {
        let mut controller = controller();

        tick(&mut controller, 10);
        assert_eq!(controller.accumulator().elapsed(), Lap::new(0, 0, 0));

        controller.start_pressed();
        tick(&mut controller, 10);
        controller.stop_pressed();
        tick(&mut controller, 10);

        assert_eq!(controller.accumulator().elapsed(), Lap::new(0, 0, 10));
    }

    #[test]
    fn test_repeated_presses() {
        let mut controller = controller();

        controller.lap_or_reset_pressed();
        controller.stop_pressed();
        controller.start_pressed();
        controller.start_pressed();

        assert!(controller.ledger().is_empty());
        assert_eq!(controller.accumulator().state(), StopwatchState::Started);
        assert_eq!(
            controller.ticker().events,
            vec![Event::Schedule(TICK_INTERVAL)]
        );
    }

    #[rstest]
    #[case(&[], Controls { start_stop: "Start", lap_reset: "Lap", lap_reset_enabled: false })]
    #[case(&["start"], Controls { start_stop: "Stop", lap_reset: "Lap", lap_reset_enabled: true })]
    #[case(&["start", "stop"], Controls { start_stop: "Start", lap_reset: "Reset", lap_reset_enabled: true })]
    #[case(&["start", "stop", "reset"], Controls { start_stop: "Start", lap_reset: "Lap", lap_reset_enabled: false })]
    fn test_controls(#[case] presses: &[&str], #[case] expected: Controls) {
        let mut controller = controller();
        for press in presses {
            match *press {
                "start" => controller.start_pressed(),
                "stop" => controller.stop_pressed(),
                _ => controller.lap_or_reset_pressed(),
            }
        }

        assert_eq!(controller.controls(), expected);
    }

    #[test]
    fn test_lap_rows() {
        let mut controller = controller();
        controller.start_pressed();
        for ticks in [100, 300, 150] {
            tick(&mut controller, ticks);
            controller.lap_or_reset_pressed();
        }

        assert_eq!(
            controller.lap_rows(),
            vec![
                row("Lap 3", "00:01.50", LapColor::Default),
                row("Lap 2", "00:03.00", LapColor::Slowest),
                row("Lap 1", "00:01.00", LapColor::Fastest),
            ]
        );
    }

    #[test]
    fn test_lap_rows_without_highlighting() {
        let repository = Repository::default();
        *repository.settings.borrow_mut() = Settings {
            delta_mode: DeltaMode::Componentwise,
            highlight_laps: false,
        };
        let mut controller = StopwatchController::new(repository, RecordingTicker::default());
        controller.start_pressed();
        for ticks in [100, 300, 150] {
            tick(&mut controller, ticks);
            controller.lap_or_reset_pressed();
        }

        assert!(
            controller
                .lap_rows()
                .iter()
                .all(|row| row.color == LapColor::Default)
        );
    }

    #[rstest]
    #[case(DeltaMode::Componentwise, "00:01.80")]
    #[case(DeltaMode::Duration, "00:00.20")]
    fn test_update_settings(#[case] delta_mode: DeltaMode, #[case] expected: &str) {
        let mut controller = controller();
        controller.update_settings(Settings {
            delta_mode,
            highlight_laps: true,
        });

        controller.start_pressed();
        tick(&mut controller, 90);
        controller.lap_or_reset_pressed();
        tick(&mut controller, 20);
        controller.lap_or_reset_pressed();

        assert_eq!(controller.lap_rows()[0].time, expected);
        assert_eq!(controller.repository().settings.borrow().delta_mode, delta_mode);
    }

    #[test]
    fn test_update_settings_failure() {
        let mut controller = StopwatchController::new(
            Repository {
                read_only: true,
                ..Repository::default()
            },
            RecordingTicker::default(),
        );

        controller.update_settings(Settings {
            delta_mode: DeltaMode::Duration,
            highlight_laps: false,
        });

        assert_eq!(controller.settings(), Settings::default());
        assert_eq!(controller.ledger().mode(), DeltaMode::Componentwise);
    }

    #[test]
    fn test_background_foreground_while_started() {
        let mut controller = controller();
        controller.start_pressed();
        tick(&mut controller, 1050);
        controller.lap_or_reset_pressed();

        controller.app_did_enter_background(time());
        controller.app_will_enter_foreground(time() + TimeDelta::seconds(5));

        assert_eq!(controller.accumulator().state(), StopwatchState::Started);
        assert_eq!(controller.accumulator().elapsed(), Lap::new(0, 15, 50));
        assert_eq!(controller.ledger().laps(), &[Lap::new(0, 10, 50)]);
        assert_eq!(
            controller.ticker().events,
            vec![
                Event::Schedule(TICK_INTERVAL),
                Event::Cancel,
                Event::Cancel,
                Event::Schedule(TICK_INTERVAL),
            ]
        );
    }

    #[test]
    fn test_background_foreground_while_stopped() {
        let mut controller = controller();
        controller.start_pressed();
        for ticks in [50, 70] {
            tick(&mut controller, ticks);
            controller.lap_or_reset_pressed();
        }
        controller.stop_pressed();
        let accumulator = *controller.accumulator();
        let ledger = controller.ledger().clone();

        controller.app_did_enter_background(time());
        controller.app_will_enter_foreground(time() + TimeDelta::days(1));

        assert_eq!(*controller.accumulator(), accumulator);
        assert_eq!(*controller.ledger(), ledger);
        assert_eq!(controller.ticker().events.last(), Some(&Event::Cancel));
    }

    #[test]
    fn test_load_into_new_controller() {
        let mut controller = controller();
        controller.start_pressed();
        tick(&mut controller, 250);
        controller.stop_pressed();
        controller.app_did_enter_background(time());

        let repository = Repository {
            stopwatch: controller.repository().stopwatch.clone(),
            ..Repository::default()
        };
        let mut restored = StopwatchController::new(repository, RecordingTicker::default());
        restored.load(time());

        assert_eq!(restored.accumulator(), controller.accumulator());
        assert_eq!(restored.controls().lap_reset, "Reset");
    }

    #[rstest]
    #[case(None)]
    #[case(Some(b"garbage".to_vec()))]
    #[case(Some(br#"{"timestamp":"2024-05-01T18:30:00Z","state":"stopped","minutes":0,"seconds":75,"centi_seconds":0,"laps":[],"time_when_lapped":[],"fastest_lap":null,"slowest_lap":null}"#.to_vec()))]
    #[case(Some(br#"{"timestamp":"2024-05-01T18:30:00Z","state":"stopped","minutes":0,"seconds":5,"centi_seconds":0,"laps":[{"minutes":0,"seconds":5,"centi_seconds":0}],"time_when_lapped":[],"fastest_lap":null,"slowest_lap":null}"#.to_vec()))]
    fn test_load_without_valid_data(#[case] blob: Option<Vec<u8>>) {
        let repository = Repository {
            stopwatch: RefCell::new(blob),
            ..Repository::default()
        };
        let mut controller = StopwatchController::new(repository, RecordingTicker::default());

        controller.load(time());

        assert_eq!(*controller.accumulator(), TimeAccumulator::new());
        assert!(controller.ledger().is_empty());
        assert_eq!(controller.ticker().events, vec![Event::Cancel]);
    }

    #[test]
    fn test_background_write_failure() {
        let mut controller = StopwatchController::new(
            Repository {
                read_only: true,
                ..Repository::default()
            },
            RecordingTicker::default(),
        );
        controller.start_pressed();
        tick(&mut controller, 42);

        controller.app_did_enter_background(time());

        assert_eq!(controller.accumulator().elapsed(), Lap::new(0, 0, 42));
        assert_eq!(controller.repository().stopwatch.borrow().clone(), None);
    }

    #[test]
    fn test_foreground_after_background_write_failure() {
        let mut controller = StopwatchController::new(
            Repository {
                read_only: true,
                ..Repository::default()
            },
            RecordingTicker::default(),
        );
        controller.start_pressed();
        tick(&mut controller, 42);
        controller.lap_or_reset_pressed();

        controller.app_did_enter_background(time());
        controller.app_will_enter_foreground(time() + TimeDelta::seconds(1));

        assert_eq!(controller.accumulator().state(), StopwatchState::Started);
        assert_eq!(controller.accumulator().elapsed(), Lap::new(0, 1, 42));
        assert_eq!(controller.ledger().laps(), &[Lap::new(0, 0, 42)]);
        assert_eq!(
            controller.ticker().events.last(),
            Some(&Event::Schedule(TICK_INTERVAL))
        );
    }

    #[test]
    fn test_foreground_prefers_state_from_background() {
        let mut controller = controller();
        controller.start_pressed();
        tick(&mut controller, 100);
        controller.stop_pressed();
        controller.app_did_enter_background(time());
        *controller.repository().stopwatch.borrow_mut() = Some(b"garbage".to_vec());

        controller.app_will_enter_foreground(time() + TimeDelta::minutes(1));

        assert_eq!(controller.accumulator().elapsed(), Lap::new(0, 1, 0));
        assert_eq!(controller.accumulator().state(), StopwatchState::Stopped);
    }
}
