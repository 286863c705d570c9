//! Configuration and settings management for SceneMark
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats stored in the platform configuration directory.
//!
//! Configuration is organized into logical sections:
//! - Loupe settings (magnifier size, magnification, crosshair, tether)
//! - Editor preferences (highlight padding, feedback timing, nudge step)

use scenemark_core::constants::{
    DEFAULT_LOUPE_MAGNIFICATION, DEFAULT_LOUPE_OFFSET, DEFAULT_LOUPE_SIZE_PX, HIGHLIGHT_PADDING,
    LOCKED_FEEDBACK_MS, MAX_LOUPE_MAGNIFICATION, MIN_LOUPE_SIZE_PX, MIN_SHAPE_SIZE, NUDGE_STEP,
};
use scenemark_core::{Result, SettingValue, SettingsError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Magnifier (loupe) preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoupeSettings {
    /// Whether the lens is shown at all
    pub enabled: bool,
    /// Lens diameter in logical pixels
    pub size_px: f32,
    /// Magnification factor (>= 1)
    pub magnification: f32,
    /// Draw a crosshair at the lens center
    pub crosshair: bool,
    /// Horizontal lens offset from the sampled point
    pub offset_x: f32,
    /// Vertical lens offset from the sampled point
    pub offset_y: f32,
    /// Anchor the lens to a selected point marker instead of the pointer
    pub tether_to_selection: bool,
}

impl Default for LoupeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            size_px: DEFAULT_LOUPE_SIZE_PX,
            magnification: DEFAULT_LOUPE_MAGNIFICATION,
            crosshair: true,
            offset_x: DEFAULT_LOUPE_OFFSET.0,
            offset_y: DEFAULT_LOUPE_OFFSET.1,
            tether_to_selection: true,
        }
    }
}

impl LoupeSettings {
    /// Key prefix used in change notifications.
    pub const PREFIX: &'static str = "loupe";

    /// Flattens the section into `(key, value)` pairs.
    pub fn entries(&self) -> Vec<(String, SettingValue)> {
        vec![
            key_value("enabled", SettingValue::Bool(self.enabled)),
            key_value("size_px", SettingValue::Float(self.size_px as f64)),
            key_value(
                "magnification",
                SettingValue::Float(self.magnification as f64),
            ),
            key_value("crosshair", SettingValue::Bool(self.crosshair)),
            key_value("offset_x", SettingValue::Float(self.offset_x as f64)),
            key_value("offset_y", SettingValue::Float(self.offset_y as f64)),
            key_value(
                "tether_to_selection",
                SettingValue::Bool(self.tether_to_selection),
            ),
        ]
    }

    /// Entries whose value differs from `previous`.
    pub fn changed_entries(&self, previous: &LoupeSettings) -> Vec<(String, SettingValue)> {
        let before = previous.entries();
        self.entries()
            .into_iter()
            .zip(before)
            .filter(|((_, new), (_, old))| new != old)
            .map(|(entry, _)| entry)
            .collect()
    }

    /// Validate ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.magnification >= 1.0 && self.magnification <= MAX_LOUPE_MAGNIFICATION) {
            return Err(invalid(
                "loupe.magnification",
                format!("must be within 1..={}", MAX_LOUPE_MAGNIFICATION),
            ));
        }
        if !(self.size_px >= MIN_LOUPE_SIZE_PX && self.size_px.is_finite()) {
            return Err(invalid(
                "loupe.size_px",
                format!("must be at least {}", MIN_LOUPE_SIZE_PX),
            ));
        }
        if !self.offset_x.is_finite() || !self.offset_y.is_finite() {
            return Err(invalid("loupe.offset", "must be finite".to_string()));
        }
        Ok(())
    }
}

fn key_value(name: &str, value: SettingValue) -> (String, SettingValue) {
    (format!("{}.{}", LoupeSettings::PREFIX, name), value)
}

/// Editor interaction preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Padding around multi-select outlines
    pub highlight_padding: f64,
    /// Duration of the locked-drag feedback colour, in milliseconds
    pub locked_feedback_ms: i64,
    /// Arrow-key nudge distance in scene units
    pub nudge_step: f64,
    /// Smallest size a transform may produce
    pub min_shape_size: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            highlight_padding: HIGHLIGHT_PADDING,
            locked_feedback_ms: LOCKED_FEEDBACK_MS,
            nudge_step: NUDGE_STEP,
            min_shape_size: MIN_SHAPE_SIZE,
        }
    }
}

impl EditorSettings {
    /// Validate ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.highlight_padding >= 0.0) {
            return Err(invalid("editor.highlight_padding", "must be >= 0".to_string()));
        }
        if self.locked_feedback_ms < 0 {
            return Err(invalid("editor.locked_feedback_ms", "must be >= 0".to_string()));
        }
        if !(self.nudge_step > 0.0) {
            return Err(invalid("editor.nudge_step", "must be > 0".to_string()));
        }
        if !(self.min_shape_size > 0.0) {
            return Err(invalid("editor.min_shape_size", "must be > 0".to_string()));
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: String) -> scenemark_core::Error {
    SettingsError::InvalidSetting {
        key: key.to_string(),
        reason,
    }
    .into()
}

/// Complete editor configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Magnifier preferences
    pub loupe: LoupeSettings,
    /// Editor preferences
    pub editor: EditorSettings,
}

/// Config file format, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            _ => Err(SettingsError::UnsupportedFormat(path.display().to_string()).into()),
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)
                .map_err(|e| SettingsError::LoadError(format!("Invalid JSON config: {}", e)))?,
            Format::Toml => toml::from_str(&content)
                .map_err(|e| SettingsError::LoadError(format!("Invalid TOML config: {}", e)))?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load config from `path`, falling back to defaults when the file
    /// does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let format = Format::from_path(path)?;

        let content = match format {
            Format::Json => serde_json::to_string_pretty(self)
                .map_err(|e| SettingsError::SaveError(e.to_string()))?,
            Format::Toml => toml::to_string_pretty(self)
                .map_err(|e| SettingsError::SaveError(e.to_string()))?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.loupe.validate()?;
        self.editor.validate()?;
        Ok(())
    }
}

/// Default config location: `<platform config dir>/scenemark/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("scenemark").join("config.toml"))
        .ok_or_else(|| {
            SettingsError::ConfigDirectory("platform config directory not found".to_string())
                .into()
        })
}
