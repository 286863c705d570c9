//! Per-type transform policy.
//!
//! Instead of branching on shape kinds throughout the editor, every
//! "what may the user do with this shape" question is answered by a
//! [`ShapePolicy`] looked up here. The lock flag is applied on top, so a
//! locked shape never exposes handles regardless of its policy.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

use crate::model::ShapeType;
use crate::shape_store::DrawingObject;

/// Resize handle around a shape's (unrotated) box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandlePosition {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl HandlePosition {
    pub const ALL: [HandlePosition; 8] = [
        HandlePosition::TopLeft,
        HandlePosition::TopCenter,
        HandlePosition::TopRight,
        HandlePosition::MiddleLeft,
        HandlePosition::MiddleRight,
        HandlePosition::BottomLeft,
        HandlePosition::BottomCenter,
        HandlePosition::BottomRight,
    ];

    pub const CORNERS: [HandlePosition; 4] = [
        HandlePosition::TopLeft,
        HandlePosition::TopRight,
        HandlePosition::BottomLeft,
        HandlePosition::BottomRight,
    ];

    /// Direction of the handle from the box center, each component in
    /// `{-1, 0, 1}`. The anchor of a resize is the opposite direction.
    pub fn direction(&self) -> (f64, f64) {
        match self {
            HandlePosition::TopLeft => (-1.0, -1.0),
            HandlePosition::TopCenter => (0.0, -1.0),
            HandlePosition::TopRight => (1.0, -1.0),
            HandlePosition::MiddleLeft => (-1.0, 0.0),
            HandlePosition::MiddleRight => (1.0, 0.0),
            HandlePosition::BottomLeft => (-1.0, 1.0),
            HandlePosition::BottomCenter => (0.0, 1.0),
            HandlePosition::BottomRight => (1.0, 1.0),
        }
    }

    pub fn is_corner(&self) -> bool {
        let (dx, dy) = self.direction();
        dx != 0.0 && dy != 0.0
    }
}

type HandleList = SmallVec<[HandlePosition; 8]>;

/// What the transform UI may offer for one shape type.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapePolicy {
    pub handles: HandleList,
    pub rotate_enabled: bool,
    pub keep_ratio: bool,
    /// Whether a selected shape of this type can anchor the magnifier.
    pub loupe_anchor: bool,
}

impl ShapePolicy {
    pub fn fixed() -> Self {
        Self {
            handles: SmallVec::new(),
            rotate_enabled: false,
            keep_ratio: false,
            loupe_anchor: false,
        }
    }
}

/// Handles actually offered for one shape, after the lock flag is applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransformHandleSet {
    pub handles: HandleList,
    pub rotate_enabled: bool,
    pub keep_ratio: bool,
}

impl TransformHandleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty() && !self.rotate_enabled
    }

    pub fn contains(&self, handle: HandlePosition) -> bool {
        self.handles.contains(&handle)
    }
}

#[derive(Debug, Clone)]
pub struct ShapeRegistry {
    policies: HashMap<ShapeType, ShapePolicy>,
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeRegistry {
    /// Registry with the built-in policies:
    /// points are fixed markers that can anchor the magnifier, rectangles
    /// get all eight handles and rotation, circles get corner handles with
    /// a locked aspect ratio.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(
            ShapeType::Point,
            ShapePolicy {
                loupe_anchor: true,
                ..ShapePolicy::fixed()
            },
        );
        registry.register(
            ShapeType::Rectangle,
            ShapePolicy {
                handles: SmallVec::from_slice(&HandlePosition::ALL),
                rotate_enabled: true,
                keep_ratio: false,
                loupe_anchor: false,
            },
        );
        registry.register(
            ShapeType::Circle,
            ShapePolicy {
                handles: SmallVec::from_slice(&HandlePosition::CORNERS),
                rotate_enabled: false,
                keep_ratio: true,
                loupe_anchor: false,
            },
        );
        registry
    }

    /// Registry without any entries.
    pub fn empty() -> Self {
        Self {
            policies: HashMap::new(),
        }
    }

    pub fn register(&mut self, shape_type: ShapeType, policy: ShapePolicy) {
        self.policies.insert(shape_type, policy);
    }

    pub fn unregister(&mut self, shape_type: ShapeType) -> Option<ShapePolicy> {
        self.policies.remove(&shape_type)
    }

    pub fn policy(&self, shape_type: ShapeType) -> Option<&ShapePolicy> {
        self.policies.get(&shape_type)
    }

    /// Handle set for `obj`, or `None` when its type has no policy.
    pub fn handle_set(&self, obj: &DrawingObject) -> Option<TransformHandleSet> {
        let policy = self.policy(obj.shape_type())?;
        if obj.locked {
            return Some(TransformHandleSet::empty());
        }
        Some(TransformHandleSet {
            handles: policy.handles.clone(),
            rotate_enabled: policy.rotate_enabled,
            keep_ratio: policy.keep_ratio,
        })
    }

    pub fn is_loupe_anchor(&self, shape_type: ShapeType) -> bool {
        self.policy(shape_type).is_some_and(|p| p.loupe_anchor)
    }
}
