use serde::{Deserialize, Serialize};

use scenemark_core::constants::{MAX_LOUPE_MAGNIFICATION, MIN_LOUPE_SIZE_PX};
use scenemark_core::{SettingValue, ShapeId};
use scenemark_settings::LoupeSettings;

use crate::model::Point;

/// What the lens samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LoupeAnchor {
    /// Follow the pointer; hidden while the pointer is outside the surface.
    Pointer,
    /// Fixed scene point.
    ScenePoint(Point),
    /// Center of a selected shape. Hidden once the shape is deselected.
    Shape { id: ShapeId, center: Point },
}

/// Lens configuration for one installed overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct LoupeState {
    pub enabled: bool,
    /// Lens diameter in logical pixels.
    pub size_px: f32,
    pub magnification: f32,
    pub crosshair_visible: bool,
    /// Lens center offset from the sampled point, logical pixels.
    pub offset: (f32, f32),
    pub anchor: LoupeAnchor,
    /// Re-anchor to a selected point marker when the selection changes.
    pub tether: bool,
}

impl LoupeState {
    pub fn from_settings(settings: &LoupeSettings) -> Self {
        let mut state = Self {
            enabled: settings.enabled,
            size_px: MIN_LOUPE_SIZE_PX,
            magnification: 1.0,
            crosshair_visible: settings.crosshair,
            offset: (0.0, 0.0),
            anchor: LoupeAnchor::Pointer,
            tether: settings.tether_to_selection,
        };
        state.set_size(settings.size_px);
        state.set_magnification(settings.magnification);
        state.set_offset(settings.offset_x, settings.offset_y);
        state
    }

    /// Non-finite sizes are ignored; small ones are raised to the minimum.
    pub fn set_size(&mut self, size_px: f32) {
        if size_px.is_finite() {
            self.size_px = size_px.max(MIN_LOUPE_SIZE_PX);
        }
    }

    pub fn set_magnification(&mut self, magnification: f32) {
        if magnification.is_finite() {
            self.magnification = magnification.clamp(1.0, MAX_LOUPE_MAGNIFICATION);
        }
    }

    pub fn set_offset(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.offset = (x, y);
        }
    }

    pub fn radius(&self) -> f32 {
        self.size_px / 2.0
    }

    pub fn anchored_shape(&self) -> Option<ShapeId> {
        match self.anchor {
            LoupeAnchor::Shape { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Applies one `loupe.*` settings key. Returns whether anything changed.
    pub fn apply_setting(&mut self, key: &str, value: &SettingValue) -> bool {
        let Some(name) = key
            .strip_prefix(LoupeSettings::PREFIX)
            .and_then(|rest| rest.strip_prefix('.'))
        else {
            return false;
        };

        let before = self.clone();
        match name {
            "enabled" => {
                if let Some(v) = value.as_bool() {
                    self.enabled = v;
                }
            }
            "size_px" => {
                if let Some(v) = value.as_f64() {
                    self.set_size(v as f32);
                }
            }
            "magnification" => {
                if let Some(v) = value.as_f64() {
                    self.set_magnification(v as f32);
                }
            }
            "crosshair" => {
                if let Some(v) = value.as_bool() {
                    self.crosshair_visible = v;
                }
            }
            "offset_x" => {
                if let Some(v) = value.as_f64() {
                    self.set_offset(v as f32, self.offset.1);
                }
            }
            "offset_y" => {
                if let Some(v) = value.as_f64() {
                    self.set_offset(self.offset.0, v as f32);
                }
            }
            "tether_to_selection" => {
                if let Some(v) = value.as_bool() {
                    self.tether = v;
                }
            }
            _ => {}
        }
        *self != before
    }
}

impl Default for LoupeState {
    fn default() -> Self {
        Self::from_settings(&LoupeSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_copies_values() {
        let settings = LoupeSettings {
            enabled: true,
            size_px: 120.0,
            magnification: 4.0,
            ..LoupeSettings::default()
        };
        let state = LoupeState::from_settings(&settings);
        assert!(state.enabled);
        assert_eq!(state.size_px, 120.0);
        assert_eq!(state.magnification, 4.0);
        assert_eq!(state.anchor, LoupeAnchor::Pointer);
    }

    #[test]
    fn test_magnification_clamped_to_one() {
        let mut state = LoupeState::default();
        state.set_magnification(0.5);
        assert_eq!(state.magnification, 1.0);
        state.set_magnification(f32::NAN);
        assert_eq!(state.magnification, 1.0);
    }

    #[test]
    fn test_apply_setting_keys() {
        let mut state = LoupeState::default();
        assert!(state.apply_setting("loupe.size_px", &SettingValue::Float(96.0)));
        assert_eq!(state.size_px, 96.0);
        assert!(state.apply_setting("loupe.enabled", &SettingValue::Bool(true)));
        assert!(state.enabled);
        assert!(!state.apply_setting("loupe.enabled", &SettingValue::Bool(true)));
        assert!(!state.apply_setting("editor.nudge_step", &SettingValue::Float(5.0)));
        assert!(!state.apply_setting("loupe.unknown", &SettingValue::Int(1)));
        assert!(!state.apply_setting("loupe.crosshair", &SettingValue::Int(0)));
    }

    #[test]
    fn test_anchor_serializes() {
        let anchor = LoupeAnchor::Shape {
            id: 4,
            center: Point::new(12.5, 8.0),
        };
        let json = serde_json::to_string(&anchor).unwrap();
        let parsed: LoupeAnchor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, anchor);
    }
}
