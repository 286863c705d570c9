//! SceneMark Settings Crate
//!
//! Handles editor configuration, persistence to JSON/TOML, and change
//! notification over the event bus.

pub mod config;
pub mod manager;

pub use config::{default_config_path, Config, EditorSettings, LoupeSettings};
pub use manager::SettingsManager;
