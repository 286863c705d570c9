//! Viewport and coordinate transformation for scene rendering.
//!
//! Converts between local surface coordinates (logical pixels, origin at
//! the top-left of the surface) and scene coordinates (image pixels, also
//! y-down). Device pixels are local pixels times the device pixel ratio.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::Bounds;
use crate::model::Point;

/// Smallest zoom the viewport accepts.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest zoom the viewport accepts.
pub const MAX_ZOOM: f64 = 50.0;

/// Scene-to-local mapping: `local = scene * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl ViewTransform {
    pub fn identity() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }

    pub fn scene_to_local(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.pan_x, p.y * self.zoom + self.pan_y)
    }

    pub fn local_to_scene(&self, p: Point) -> Point {
        Point::new((p.x - self.pan_x) / self.zoom, (p.y - self.pan_y) / self.zoom)
    }
}

/// Zoom and pan state of one surface.
#[derive(Debug, Clone)]
pub struct Viewport {
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
    canvas_width: f64,
    canvas_height: f64,
    device_pixel_ratio: f64,
}

impl Viewport {
    /// Creates a viewport of the given logical size at 100% zoom.
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            canvas_width,
            canvas_height,
            device_pixel_ratio: 1.0,
        }
    }

    pub fn canvas_width(&self) -> f64 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> f64 {
        self.canvas_height
    }

    /// Sets the canvas dimensions (typically called when the window resizes).
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_width = width;
        self.canvas_height = height;
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// Ignores non-positive ratios.
    pub fn set_device_pixel_ratio(&mut self, ratio: f64) {
        if ratio > 0.0 && ratio.is_finite() {
            self.device_pixel_ratio = ratio;
        }
    }

    /// Gets the current zoom level (1.0 = 100%).
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Sets the zoom level, constrained between [`MIN_ZOOM`] and [`MAX_ZOOM`].
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom > MIN_ZOOM && zoom < MAX_ZOOM {
            self.zoom = zoom;
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * 1.2);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / 1.2);
    }

    /// Zooms while keeping the scene point under `local` fixed.
    pub fn zoom_at(&mut self, local: Point, zoom: f64) {
        let anchor = self.local_to_scene(local);
        let before = self.zoom;
        self.set_zoom(zoom);
        if self.zoom != before {
            self.pan_x = local.x - anchor.x * self.zoom;
            self.pan_y = local.y - anchor.y * self.zoom;
        }
    }

    pub fn pan_x(&self) -> f64 {
        self.pan_x
    }

    pub fn pan_y(&self) -> f64 {
        self.pan_y
    }

    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.pan_x = x;
        self.pan_y = y;
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    pub fn view_transform(&self) -> ViewTransform {
        ViewTransform {
            zoom: self.zoom,
            pan_x: self.pan_x,
            pan_y: self.pan_y,
        }
    }

    /// Converts local (logical pixel) coordinates to scene coordinates.
    ///
    /// ```text
    /// scene_x = (local_x - pan_x) / zoom
    /// scene_y = (local_y - pan_y) / zoom
    /// ```
    pub fn local_to_scene(&self, local: Point) -> Point {
        self.view_transform().local_to_scene(local)
    }

    pub fn scene_to_local(&self, scene: Point) -> Point {
        self.view_transform().scene_to_local(scene)
    }

    /// Scene point to device pixels.
    pub fn scene_to_device(&self, scene: Point) -> Point {
        let local = self.scene_to_local(scene);
        Point::new(
            local.x * self.device_pixel_ratio,
            local.y * self.device_pixel_ratio,
        )
    }

    /// Fits `bounds` into the viewport, reserving `padding` (0.0 - 0.5) of
    /// each side, and centers it.
    pub fn fit_to_bounds(&mut self, bounds: Bounds, padding: f64) {
        let width = bounds.width();
        let height = bounds.height();
        if width <= 0.0 || height <= 0.0 {
            return;
        }

        let padding_factor = 1.0 - (padding * 2.0);
        let zoom_x = (self.canvas_width * padding_factor) / width;
        let zoom_y = (self.canvas_height * padding_factor) / height;
        let new_zoom = zoom_x.min(zoom_y).clamp(MIN_ZOOM, MAX_ZOOM);

        self.zoom = new_zoom;
        self.pan_x = (self.canvas_width - width * new_zoom) / 2.0 - bounds.min_x * new_zoom;
        self.pan_y = (self.canvas_height - height * new_zoom) / 2.0 - bounds.min_y * new_zoom;
    }

    /// Centers the viewport on a scene point.
    pub fn center_on(&mut self, scene: Point) {
        self.pan_x = self.canvas_width / 2.0 - scene.x * self.zoom;
        self.pan_y = self.canvas_height / 2.0 - scene.y * self.zoom;
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Viewport(zoom: {:.2}x, pan: ({:.1}, {:.1}), dpr: {:.1})",
            self.zoom, self.pan_x, self.pan_y, self.device_pixel_ratio
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_with_zoom_and_pan() {
        let mut viewport = Viewport::new(400.0, 300.0);
        viewport.set_zoom(2.0);
        viewport.set_pan(10.0, 20.0);

        let local = viewport.scene_to_local(Point::new(5.0, 5.0));
        assert_eq!(local, Point::new(20.0, 30.0));
        assert_eq!(viewport.local_to_scene(local), Point::new(5.0, 5.0));
    }

    #[test]
    fn test_zoom_limits() {
        let mut viewport = Viewport::default();
        viewport.set_zoom(100.0);
        assert_eq!(viewport.zoom(), 1.0);
        viewport.set_zoom(0.01);
        assert_eq!(viewport.zoom(), 1.0);
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut viewport = Viewport::new(400.0, 300.0);
        let local = Point::new(100.0, 50.0);
        let before = viewport.local_to_scene(local);
        viewport.zoom_at(local, 4.0);
        let after = viewport.local_to_scene(local);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_fit_to_bounds_centers_content() {
        let mut viewport = Viewport::new(400.0, 200.0);
        viewport.fit_to_bounds(Bounds::new(0.0, 0.0, 100.0, 100.0), 0.0);
        assert_eq!(viewport.zoom(), 2.0);
        assert_eq!(viewport.scene_to_local(Point::new(50.0, 50.0)), Point::new(200.0, 100.0));
    }

    #[test]
    fn test_device_pixels_scale_with_ratio() {
        let mut viewport = Viewport::new(100.0, 100.0);
        viewport.set_device_pixel_ratio(2.0);
        viewport.set_device_pixel_ratio(-1.0);
        assert_eq!(viewport.scene_to_device(Point::new(3.0, 4.0)), Point::new(6.0, 8.0));
    }
}
