//! Event type definitions for the event bus.
//!
//! Events are grouped by category. They are cloneable and serializable so
//! list views and log sinks can consume them without sharing editor state.

use serde::{Deserialize, Serialize};

use crate::types::{SelectionMode, ShapeId, SurfaceId};

/// Root event enum for all editor events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    /// Selection changes and selection feedback
    Selection(SelectionEvent),
    /// Drag gesture lifecycle
    Drag(DragEvent),
    /// Settings and configuration
    Settings(SettingsEvent),
    /// Magnifier overlay lifecycle
    Magnifier(MagnifierEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Selection(_) => EventCategory::Selection,
            AppEvent::Drag(_) => EventCategory::Drag,
            AppEvent::Settings(_) => EventCategory::Settings,
            AppEvent::Magnifier(_) => EventCategory::Magnifier,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Selection(e) => e.description(),
            AppEvent::Drag(e) => e.description(),
            AppEvent::Settings(e) => e.description(),
            AppEvent::Magnifier(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Selection events.
    Selection,
    /// Drag gesture events.
    Drag,
    /// Settings and configuration events.
    Settings,
    /// Magnifier overlay events.
    Magnifier,
}

impl EventCategory {
    /// Lowercase name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            EventCategory::Selection => "selection",
            EventCategory::Drag => "drag",
            EventCategory::Settings => "settings",
            EventCategory::Magnifier => "magnifier",
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Selection-related events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SelectionEvent {
    /// The selection was replaced.
    Changed {
        /// Selected shape ids, in selection order.
        ids: Vec<ShapeId>,
        /// Mode derived from the selection size.
        mode: SelectionMode,
    },
    /// A group drag was vetoed because members are locked.
    LockedDragBlocked {
        /// The locked members that caused the veto.
        locked_ids: Vec<ShapeId>,
    },
}

impl SelectionEvent {
    fn description(&self) -> String {
        match self {
            SelectionEvent::Changed { ids, mode } => {
                format!("Selection ({}): {} shape(s)", mode, ids.len())
            }
            SelectionEvent::LockedDragBlocked { locked_ids } => {
                format!("Drag blocked by {} locked shape(s)", locked_ids.len())
            }
        }
    }
}

/// Drag gesture events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DragEvent {
    /// A drag session started.
    Started {
        /// Shapes moving with the gesture.
        ids: Vec<ShapeId>,
    },
    /// Shapes moved during a drag; carries the clamped delta from the
    /// drag origin.
    Moved {
        /// Shapes moving with the gesture.
        ids: Vec<ShapeId>,
        /// Clamped X delta since drag start.
        dx: f64,
        /// Clamped Y delta since drag start.
        dy: f64,
    },
    /// A drag session ended.
    Ended {
        /// Shapes that moved with the gesture.
        ids: Vec<ShapeId>,
        /// Final X delta.
        dx: f64,
        /// Final Y delta.
        dy: f64,
        /// Whether a lock veto froze the gesture.
        blocked: bool,
    },
}

impl DragEvent {
    fn description(&self) -> String {
        match self {
            DragEvent::Started { ids } => format!("Drag started: {} shape(s)", ids.len()),
            DragEvent::Moved { dx, dy, .. } => format!("Drag moved: ({:.1}, {:.1})", dx, dy),
            DragEvent::Ended {
                ids,
                dx,
                dy,
                blocked,
            } => {
                if *blocked {
                    format!("Drag ended (blocked): {} shape(s)", ids.len())
                } else {
                    format!(
                        "Drag ended: {} shape(s) by ({:.1}, {:.1})",
                        ids.len(),
                        dx,
                        dy
                    )
                }
            }
        }
    }
}

/// Setting value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingValue {
    /// Boolean setting value.
    Bool(bool),
    /// Integer setting value.
    Int(i64),
    /// Floating-point setting value.
    Float(f64),
    /// String setting value.
    String(String),
}

impl SettingValue {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Int(v) => Some(*v as f64),
            SettingValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean view of the value, if it has one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

/// Settings-related events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SettingsEvent {
    /// Settings loaded.
    Loaded,
    /// Settings saved.
    Saved,
    /// Setting changed.
    Changed {
        /// Setting key that was changed, e.g. `loupe.size_px`.
        key: String,
        /// New value of the setting.
        value: SettingValue,
    },
}

impl SettingsEvent {
    fn description(&self) -> String {
        match self {
            SettingsEvent::Loaded => "Settings loaded".to_string(),
            SettingsEvent::Saved => "Settings saved".to_string(),
            SettingsEvent::Changed { key, value } => {
                format!("Setting: {} = {:?}", key, value)
            }
        }
    }
}

/// Magnifier overlay events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MagnifierEvent {
    /// An overlay was attached to a surface.
    Installed {
        /// Surface the overlay sits on.
        surface: SurfaceId,
    },
    /// An overlay was detached.
    Detached {
        /// Surface the overlay was removed from.
        surface: SurfaceId,
    },
    /// The overlay lost a surface capability and runs in a reduced mode.
    Degraded {
        /// Affected surface.
        surface: SurfaceId,
        /// Which capability is missing.
        reason: String,
    },
}

impl MagnifierEvent {
    fn description(&self) -> String {
        match self {
            MagnifierEvent::Installed { surface } => format!("Magnifier installed on {}", surface),
            MagnifierEvent::Detached { surface } => format!("Magnifier detached from {}", surface),
            MagnifierEvent::Degraded { surface, reason } => {
                format!("Magnifier degraded on {}: {}", surface, reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_category() {
        let event = AppEvent::Selection(SelectionEvent::Changed {
            ids: vec![1],
            mode: SelectionMode::Single,
        });
        assert_eq!(event.category(), EventCategory::Selection);

        let event = AppEvent::Drag(DragEvent::Started { ids: vec![1, 2] });
        assert_eq!(event.category(), EventCategory::Drag);
    }

    #[test]
    fn test_event_description() {
        let event = AppEvent::Selection(SelectionEvent::Changed {
            ids: vec![1, 2, 3],
            mode: SelectionMode::Multi,
        });
        assert!(event.description().contains("multi"));
        assert!(event.description().contains('3'));

        let event = AppEvent::Drag(DragEvent::Ended {
            ids: vec![1, 2],
            dx: 0.0,
            dy: 0.0,
            blocked: true,
        });
        assert!(event.description().contains("blocked"));
    }

    #[test]
    fn test_event_serialization() {
        let event = AppEvent::Settings(SettingsEvent::Changed {
            key: "loupe.magnification".to_string(),
            value: SettingValue::Float(4.0),
        });
        let json = serde_json::to_string(&event).expect("Should serialize");
        let parsed: AppEvent = serde_json::from_str(&json).expect("Should deserialize");
        match parsed {
            AppEvent::Settings(SettingsEvent::Changed { key, value }) => {
                assert_eq!(key, "loupe.magnification");
                assert_eq!(value.as_f64(), Some(4.0));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_setting_value_views() {
        assert_eq!(SettingValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(SettingValue::Bool(true).as_bool(), Some(true));
        assert_eq!(SettingValue::String("x".into()).as_f64(), None);
    }
}
