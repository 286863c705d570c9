//! Live settings owner.
//!
//! `SettingsManager` holds the active [`Config`], persists it on request and
//! publishes one `SettingsEvent::Changed` per modified key so components
//! such as the magnifier can re-apply preferences without reading the
//! config directly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use scenemark_core::{AppEvent, EventBus, Result, SettingsEvent};

use crate::config::{Config, EditorSettings, LoupeSettings};

/// Owns the active configuration and announces changes.
#[derive(Debug)]
pub struct SettingsManager {
    config: Config,
    path: Option<PathBuf>,
    bus: Arc<EventBus>,
}

impl SettingsManager {
    /// Creates a manager over default settings with no backing file.
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            config: Config::default(),
            path: None,
            bus,
        }
    }

    /// Loads settings from `path` (defaults when missing) and remembers the
    /// path for [`SettingsManager::save`].
    pub fn load(path: impl Into<PathBuf>, bus: Arc<EventBus>) -> Result<Self> {
        let path = path.into();
        let config = Config::load_or_default(&path)?;
        let manager = Self {
            config,
            path: Some(path),
            bus,
        };
        manager.publish(SettingsEvent::Loaded);
        Ok(manager)
    }

    /// Current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current magnifier preferences.
    pub fn loupe(&self) -> &LoupeSettings {
        &self.config.loupe
    }

    /// Current editor preferences.
    pub fn editor(&self) -> &EditorSettings {
        &self.config.editor
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Applies `update` to a copy of the loupe settings; if the result
    /// validates it replaces the live settings and every changed key is
    /// published. Returns the number of changed keys.
    pub fn update_loupe<F>(&mut self, update: F) -> Result<usize>
    where
        F: FnOnce(&mut LoupeSettings),
    {
        let mut next = self.config.loupe.clone();
        update(&mut next);
        next.validate()?;

        let changed = next.changed_entries(&self.config.loupe);
        self.config.loupe = next;
        for (key, value) in &changed {
            tracing::debug!("Loupe setting {} changed to {:?}", key, value);
            self.publish(SettingsEvent::Changed {
                key: key.clone(),
                value: value.clone(),
            });
        }
        Ok(changed.len())
    }

    /// Replaces the editor section after validation.
    pub fn update_editor<F>(&mut self, update: F) -> Result<()>
    where
        F: FnOnce(&mut EditorSettings),
    {
        let mut next = self.config.editor.clone();
        update(&mut next);
        next.validate()?;
        self.config.editor = next;
        Ok(())
    }

    /// Writes the configuration back to its file. No-op without a path.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            tracing::debug!("Settings have no backing file; skipping save");
            return Ok(());
        };
        self.config.save_to_file(path)?;
        self.publish(SettingsEvent::Saved);
        Ok(())
    }

    fn publish(&self, event: SettingsEvent) {
        // Nobody listening is fine; settings still apply.
        let _ = self.bus.publish(AppEvent::Settings(event));
    }
}
