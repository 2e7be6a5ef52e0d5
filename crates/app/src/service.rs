use ::log::{debug, error};
use gymbo_domain::{ReadError, StopwatchSnapshot, WriteError};

use crate::{
    Settings, SettingsRepository, SettingsService, StopwatchRepository, StopwatchService, snapshot,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(gymbo_domain::StorageError::Unavailable) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: StopwatchRepository> StopwatchService for Service<R> {
    fn get_stopwatch(&self) -> Result<Option<StopwatchSnapshot>, ReadError> {
        log_on_error!(
            self.repository.read_stopwatch().and_then(|blob| {
                blob.map(|blob| snapshot::decode(&blob))
                    .transpose()
                    .map_err(|err| ReadError::Other(err.into()))
            }),
            ReadError,
            "get",
            "stopwatch"
        )
    }

    fn set_stopwatch(&self, stopwatch: &StopwatchSnapshot) -> Result<(), WriteError> {
        log_on_error!(
            snapshot::encode(stopwatch)
                .map_err(|err| WriteError::Other(err.into()))
                .and_then(|blob| self.repository.write_stopwatch(blob)),
            WriteError,
            "set",
            "stopwatch"
        )
    }
}

impl<R: SettingsRepository> SettingsService for Service<R> {
    fn get_settings(&self) -> Result<Settings, ReadError> {
        log_on_error!(
            self.repository.read_settings(),
            ReadError,
            "get",
            "settings"
        )
    }

    fn set_settings(&self, settings: Settings) -> Result<(), WriteError> {
        log_on_error!(
            self.repository.write_settings(settings),
            WriteError,
            "set",
            "settings"
        )
    }
}
