// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Persisted [`ValidatorSettings`](aes5_core::ValidatorSettings).
//!
//! [`ConfigStore`] is the storage port (raw bytes by key), [`ConfigService`]
//! does the JSON, and [`FsConfigStore`] keeps one `<key>.json` file per key
//! under the platform config directory or an explicit root.

pub mod config;
mod fs;

pub use config::{
    load_settings, save_settings, ConfigError, ConfigService, ConfigStore, MemoryConfigStore,
    SETTINGS_KEY,
};
pub use fs::FsConfigStore;
