use std::sync::Arc;

use scenemark_core::EventBus;
use scenemark_settings::{Config, SettingsManager};
use tempfile::tempdir;

#[test]
fn test_toml_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.loupe.enabled = true;
    config.loupe.magnification = 6.0;
    config.editor.nudge_step = 10.0;
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut config = Config::default();
    config.loupe.crosshair = false;
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert!(!loaded.loupe.crosshair);
}

#[test]
fn test_invalid_file_rejected_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[loupe]\nmagnification = 0.25\n").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(err.to_string().contains("magnification"));
}

#[test]
fn test_manager_load_missing_file_uses_defaults_then_saves() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut manager = SettingsManager::load(&path, Arc::new(EventBus::new())).unwrap();
    assert_eq!(manager.config(), &Config::default());

    manager.update_loupe(|loupe| loupe.size_px = 96.0).unwrap();
    manager.save().unwrap();

    let reloaded = Config::load_from_file(&path).unwrap();
    assert_eq!(reloaded.loupe.size_px, 96.0);
}
