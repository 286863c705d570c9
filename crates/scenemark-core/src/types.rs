//! Small value types shared across crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable shape identifier, assigned by the shape store at creation.
pub type ShapeId = u64;

/// Identifies one rendering surface instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub u32);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Selection mode, derived purely from the number of selected shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SelectionMode {
    /// Nothing selected.
    #[default]
    None,
    /// Exactly one shape selected; transform handles may attach.
    Single,
    /// Two or more shapes selected; resize handles are forbidden.
    Multi,
}

impl SelectionMode {
    /// Derives the mode from a selection size.
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => SelectionMode::None,
            1 => SelectionMode::Single,
            _ => SelectionMode::Multi,
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::None => write!(f, "none"),
            SelectionMode::Single => write!(f, "single"),
            SelectionMode::Multi => write!(f, "multi"),
        }
    }
}
