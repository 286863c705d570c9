//! Error handling for SceneMark
//!
//! Provides error types for the layers that can actually fail:
//! - Editor errors (scene store lookups, render surface creation)
//! - Settings errors (configuration I/O and validation)
//!
//! The interactive core (selection, transforms, drags, magnifier) never
//! returns these; it degrades and logs instead. All error types use
//! `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::types::ShapeId;

/// Editor error type
///
/// Raised by the scene store mutation path and by surface construction.
#[derive(Error, Debug, Clone)]
pub enum EditorError {
    /// No shape with this id exists in the store
    #[error("Unknown shape id {id}")]
    UnknownShape {
        /// The id that was looked up.
        id: ShapeId,
    },

    /// A render surface or pixel buffer could not be created
    #[error("Render surface unavailable: {reason}")]
    SurfaceUnavailable {
        /// Why the surface could not be created.
        reason: String,
    },

    /// Background image could not be decoded or encoded
    #[error("Image error: {reason}")]
    Image {
        /// The underlying image error message.
        reason: String,
    },
}

/// Settings error type
///
/// Represents errors loading, saving or validating configuration.
#[derive(Error, Debug, Clone)]
pub enum SettingsError {
    /// The configuration file could not be loaded.
    #[error("Failed to load settings: {0}")]
    LoadError(String),

    /// The configuration file could not be saved.
    #[error("Failed to save settings: {0}")]
    SaveError(String),

    /// A configuration value is invalid.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting {
        /// The offending key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The configuration file format is not supported.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// The configuration directory could not be resolved.
    #[error("Config directory error: {0}")]
    ConfigDirectory(String),
}

/// Main error type for SceneMark
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Editor error
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// Settings error
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is an editor error
    pub fn is_editor_error(&self) -> bool {
        matches!(self, Error::Editor(_))
    }

    /// Check if this is a settings error
    pub fn is_settings_error(&self) -> bool {
        matches!(self, Error::Settings(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
