//! Magnifier (loupe) overlay.
//!
//! A circular lens drawn over a [`RenderSurface`], either following the
//! pointer or anchored to a scene point or a selected shape. Redraws are
//! coalesced to one per animation frame by [`FrameScheduler`].

mod frame;
mod overlay;
mod state;
mod surface;

pub use frame::FrameScheduler;
pub use overlay::{lens_frame, FrameResult, LensFrame, MagnifierOverlay, SourceRect};
pub use state::{LoupeAnchor, LoupeState};
pub use surface::RenderSurface;

use scenemark_core::SurfaceId;

/// Identifies one installed overlay. A handle from an earlier install
/// does not match a later one on the same surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MagnifierHandle {
    pub surface: SurfaceId,
    pub generation: u64,
}
