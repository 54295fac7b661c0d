// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
use aes5_config::{
    load_settings, save_settings, ConfigError, ConfigService, ConfigStore, FsConfigStore,
    SETTINGS_KEY,
};
use aes5_core::ValidatorSettings;

#[test]
fn settings_survive_a_new_store_instance() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = ValidatorSettings::default().with_tolerance_ppm(20);
    {
        let service = ConfigService::new(FsConfigStore::at(dir.path()).expect("open"));
        save_settings(&service, &settings).expect("save");
    }

    let store = FsConfigStore::at(dir.path()).expect("reopen");
    assert!(store.path_for(SETTINGS_KEY).ends_with("validator.json"));
    assert!(store.path_for(SETTINGS_KEY).is_file());
    let service = ConfigService::new(store);
    assert_eq!(load_settings(&service).expect("load"), settings);
}

#[test]
fn missing_file_means_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FsConfigStore::at(dir.path().join("nested/config")).expect("open");
    assert!(store.base().is_dir());
    assert!(matches!(store.load_raw(SETTINGS_KEY), Err(ConfigError::NotFound)));
    let service = ConfigService::new(store);
    assert_eq!(load_settings(&service).expect("load"), ValidatorSettings::default());
}

#[test]
fn stored_json_is_human_editable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FsConfigStore::at(dir.path()).expect("open");
    std::fs::write(
        store.path_for(SETTINGS_KEY),
        r#"{ "default_tolerance_ppm": 75 }"#,
    )
    .expect("write");
    let service = ConfigService::new(store);
    let loaded = load_settings(&service).expect("load");
    assert_eq!(loaded.default_tolerance_ppm, 75);
    assert_eq!(loaded.realtime_budget_ns, ValidatorSettings::default().realtime_budget_ns);
}
