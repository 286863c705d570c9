//! # SceneMark Core
//!
//! Core types, errors and the event bus shared by the SceneMark crates.
//! Provides the fundamental abstractions every other crate builds on:
//! shape identifiers, selection modes, the error hierarchy and the
//! publish/subscribe bus used for decoupled notifications.

pub mod constants;
pub mod error;
pub mod event_bus;
pub mod types;

pub use error::{EditorError, Error, Result, SettingsError};

// Re-export event bus for convenience
pub use event_bus::{
    AppEvent, DragEvent, EventBus, EventBusConfig, EventBusError, EventCategory, EventFilter,
    EventRecord, MagnifierEvent, SelectionEvent, SettingValue, SettingsEvent, SubscriptionId,
};

pub use types::{SelectionMode, ShapeId, SurfaceId};
