use std::{
    collections::VecDeque,
    fs, io,
    path::{Path, PathBuf},
};

use ::log::debug;
use anyhow::Context;
use gymbo_app::{Settings, SettingsRepository, StopwatchRepository, log};
use gymbo_domain::{ReadError, StorageError, WriteError};
use serde::{Serialize, de::DeserializeOwned};
use strum::AsRefStr;

/// Key-value storage with one JSON file per key.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

#[derive(AsRefStr, Debug, Clone, Copy)]
pub enum Key {
    #[strum(serialize = "settings")]
    Settings,
    #[strum(serialize = "stopwatch")]
    Stopwatch,
    #[strum(serialize = "log")]
    Log,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path(&self, key: Key) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_ref()))
    }

    fn read(&self, key: Key) -> Result<Option<Vec<u8>>, LocalStorageError> {
        let path = self.path(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                Err(LocalStorageError::Unavailable(path))
            }
            Err(err) => Err(anyhow::Error::new(err)
                .context(format!("failed to read {}", path.display()))
                .into()),
        }
    }

    fn write(&self, key: Key, bytes: &[u8]) -> Result<(), LocalStorageError> {
        if let Err(err) = fs::create_dir_all(&self.dir) {
            if err.kind() == io::ErrorKind::PermissionDenied {
                return Err(LocalStorageError::Unavailable(self.dir.clone()));
            }
            return Err(anyhow::Error::new(err)
                .context(format!("failed to create {}", self.dir.display()))
                .into());
        }

        let path = self.path(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, bytes)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, key: Key) -> Result<Option<T>, LocalStorageError> {
        Ok(self
            .read(key)?
            .map(|bytes| {
                serde_json::from_slice(&bytes)
                    .with_context(|| format!("invalid {} data", key.as_ref()))
            })
            .transpose()?)
    }

    fn set<T: Serialize>(&self, key: Key, value: &T) -> Result<(), LocalStorageError> {
        let bytes = serde_json::to_vec(value)
            .with_context(|| format!("failed to serialize {} data", key.as_ref()))?;
        self.write(key, &bytes)
    }
}

impl StopwatchRepository for LocalStorage {
    fn read_stopwatch(&self) -> Result<Option<Vec<u8>>, ReadError> {
        let blob = self.read(Key::Stopwatch).map_err(StorageError::from)?;
        debug!(
            "read {} bytes of stopwatch data",
            blob.as_ref().map_or(0, Vec::len)
        );
        Ok(blob)
    }

    fn write_stopwatch(&self, blob: Vec<u8>) -> Result<(), WriteError> {
        self.write(Key::Stopwatch, &blob)
            .map_err(StorageError::from)?;
        debug!("wrote {} bytes of stopwatch data", blob.len());
        Ok(())
    }
}

impl SettingsRepository for LocalStorage {
    fn read_settings(&self) -> Result<Settings, ReadError> {
        Ok(self
            .get::<Settings>(Key::Settings)
            .map_err(StorageError::from)?
            .unwrap_or_default())
    }

    fn write_settings(&self, settings: Settings) -> Result<(), WriteError> {
        Ok(self
            .set(Key::Settings, &settings)
            .map_err(StorageError::from)?)
    }
}

impl log::Repository for LocalStorage {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        self.get(Key::Log)
            .map(Option::unwrap_or_default)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        log::push_entry(&mut entries, entry);
        self.set(Key::Log, &entries)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LocalStorageError {
    #[error("{} is not accessible", .0.display())]
    Unavailable(PathBuf),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<LocalStorageError> for StorageError {
    fn from(value: LocalStorageError) -> Self {
        match value {
            LocalStorageError::Unavailable(path) => {
                debug!("{} is not accessible", path.display());
                StorageError::Unavailable
            }
            LocalStorageError::Other(err) => StorageError::Other(err.into()),
        }
    }
}
