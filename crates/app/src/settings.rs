use gymbo_domain::{DeltaMode, ReadError, WriteError};

pub trait SettingsService {
    fn get_settings(&self) -> Result<Settings, ReadError>;
    fn set_settings(&self, settings: Settings) -> Result<(), WriteError>;
}

pub trait SettingsRepository {
    fn read_settings(&self) -> Result<Settings, ReadError>;
    fn write_settings(&self, settings: Settings) -> Result<(), WriteError>;
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    #[serde(with = "DeltaModeDef")]
    pub delta_mode: DeltaMode,
    pub highlight_laps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delta_mode: DeltaMode::Componentwise,
            highlight_laps: true,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(remote = "DeltaMode", rename_all = "snake_case")]
pub enum DeltaModeDef {
    Componentwise,
    Duration,
}
