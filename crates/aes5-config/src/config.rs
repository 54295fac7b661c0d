// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Config service and storage port.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use aes5_core::{SettingsError, ValidatorSettings};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

/// Key the validator settings are stored under.
pub const SETTINGS_KEY: &str = "validator";

/// Storage port for raw config blobs (keyed by logical name).
pub trait ConfigStore {
    /// Load a raw config blob. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Persist a raw config blob.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key not present in store.
    #[error("not found")]
    NotFound,
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Stored settings parsed but are unusable.
    #[error("invalid settings: {0}")]
    Invalid(#[from] SettingsError),
    /// Catch-all error variant.
    #[error("other: {0}")]
    Other(String),
}

/// Thin service that serializes config values and delegates storage to a `ConfigStore`.
#[derive(Debug)]
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Create a new service using the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the inner store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the service and return the inner store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S> ConfigService<S>
where
    S: ConfigStore,
{
    /// Load and deserialize a config value for `key`. Returns `Ok(None)` if missing.
    pub fn load<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: DeserializeOwned,
    {
        match self.store.load_raw(key) {
            Ok(bytes) => {
                if bytes.is_empty() {
                    return Ok(None);
                }
                let value = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            Err(ConfigError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Serialize and persist a config value for `key`.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), ConfigError>
    where
        T: Serialize,
    {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }
}

/// Stored validator settings, or the defaults when nothing is stored.
///
/// Stored settings that fail [`ValidatorSettings::validate`] are an error,
/// not silently replaced.
pub fn load_settings<S: ConfigStore>(
    service: &ConfigService<S>,
) -> Result<ValidatorSettings, ConfigError> {
    let Some(settings) = service.load::<ValidatorSettings>(SETTINGS_KEY)? else {
        debug!(key = SETTINGS_KEY, "no stored settings, using defaults");
        return Ok(ValidatorSettings::default());
    };
    settings.validate()?;
    debug!(
        key = SETTINGS_KEY,
        tolerance_ppm = settings.default_tolerance_ppm,
        "settings loaded"
    );
    Ok(settings)
}

/// Validates and persists `settings`.
pub fn save_settings<S: ConfigStore>(
    service: &ConfigService<S>,
    settings: &ValidatorSettings,
) -> Result<(), ConfigError> {
    settings.validate()?;
    service.save(SETTINGS_KEY, settings)?;
    debug!(key = SETTINGS_KEY, "settings saved");
    Ok(())
}

/// In-process store. Nothing outlives the value.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryConfigStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.insert(key.to_owned(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_empty_values_load_as_none() {
        let service = ConfigService::new(MemoryConfigStore::new());
        assert!(service.load::<ValidatorSettings>("absent").unwrap().is_none());
        service.store().save_raw("blank", b"").unwrap();
        assert!(service.load::<ValidatorSettings>("blank").unwrap().is_none());
    }

    #[test]
    fn settings_default_when_absent_and_round_trip_when_saved() {
        let service = ConfigService::new(MemoryConfigStore::new());
        assert_eq!(load_settings(&service).unwrap(), ValidatorSettings::default());

        let tight = ValidatorSettings::default().with_tolerance_ppm(50);
        save_settings(&service, &tight).unwrap();
        assert_eq!(load_settings(&service).unwrap(), tight);
    }

    #[test]
    fn invalid_settings_are_refused_both_ways() {
        let service = ConfigService::new(MemoryConfigStore::new());
        let zero = ValidatorSettings::default().with_tolerance_ppm(0);
        assert!(matches!(
            save_settings(&service, &zero),
            Err(ConfigError::Invalid(SettingsError::ZeroTolerance))
        ));

        service.save(SETTINGS_KEY, &zero).unwrap();
        assert!(matches!(load_settings(&service), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn garbage_is_a_serde_error() {
        let service = ConfigService::new(MemoryConfigStore::new());
        service.store().save_raw(SETTINGS_KEY, b"{not json").unwrap();
        assert!(matches!(load_settings(&service), Err(ConfigError::Serde(_))));
    }
}
