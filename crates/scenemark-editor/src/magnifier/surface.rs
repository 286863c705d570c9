use tiny_skia::PixmapRef;

use scenemark_core::SurfaceId;

use crate::viewport::ViewTransform;

/// A rendered scene the magnifier can sample.
///
/// Only the logical size and device pixel ratio are mandatory. Surfaces
/// that cannot expose their pixels or their zoom/pan leave the defaults,
/// and the magnifier degrades accordingly.
pub trait RenderSurface {
    fn surface_id(&self) -> SurfaceId;

    /// Size in logical pixels.
    fn logical_size(&self) -> (f32, f32);

    fn device_pixel_ratio(&self) -> f32 {
        1.0
    }

    /// Rendered pixels, `logical_size * device_pixel_ratio` large.
    fn pixel_buffer(&self) -> Option<PixmapRef<'_>> {
        None
    }

    /// Scene-to-local mapping of the surface.
    fn view_transform(&self) -> Option<ViewTransform> {
        None
    }
}
