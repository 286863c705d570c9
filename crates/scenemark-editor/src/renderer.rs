//! Scene renderer.
//! Draws the background image, shapes, selection outlines and transform
//! handles into a tiny-skia pixmap. The pixmap doubles as the pixel buffer
//! the magnifier samples, so `SceneRenderer` implements [`RenderSurface`].
//!
//! Features:
//! - Device pixel ratio aware (the pixmap is `logical size * dpr`)
//! - Strokes are sized in screen pixels, independent of zoom
//! - Locked shapes are outlined with a dashed stroke

use chrono::{DateTime, Utc};
use image::RgbaImage;
use tiny_skia::{
    Color, FillRule, IntSize, Paint, Path, PathBuilder, Pixmap, PixmapPaint, PixmapRef, Rect,
    Stroke, StrokeDash, Transform,
};

use scenemark_core::{EditorError, Result, SurfaceId};

use crate::editor::Editor;
use crate::geometry::{Bounds, ImageBounds};
use crate::magnifier::RenderSurface;
use crate::model::{DesignerShape, Shape, POINT_MARKER_RADIUS};
use crate::selection_manager::HighlightColor;
use crate::shape_store::DrawingObject;
use crate::viewport::{ViewTransform, Viewport};

const HANDLE_SIZE: f32 = 8.0;
const SHAPE_STROKE: f32 = 2.0;

fn bg_color() -> Color {
    Color::from_rgba8(52, 73, 94, 255)
}
fn shape_fill() -> Color {
    Color::from_rgba8(52, 152, 219, 64)
}
fn shape_color() -> Color {
    Color::from_rgba8(52, 152, 219, 255)
}
fn locked_color() -> Color {
    Color::from_rgba8(149, 165, 166, 255)
}
fn selection_color() -> Color {
    Color::from_rgba8(255, 235, 59, 255)
}
fn blocked_color() -> Color {
    Color::from_rgba8(231, 76, 60, 255)
}
fn handle_color() -> Color {
    Color::from_rgba8(255, 255, 255, 255)
}

/// Renders an [`Editor`] scene into an owned pixmap.
pub struct SceneRenderer {
    id: SurfaceId,
    viewport: Viewport,
    background: Option<Pixmap>,
    pixmap: Pixmap,
}

impl SceneRenderer {
    /// Creates a renderer with a `width` x `height` logical surface.
    pub fn new(id: SurfaceId, width: u32, height: u32, device_pixel_ratio: f64) -> Result<Self> {
        let mut viewport = Viewport::new(width as f64, height as f64);
        viewport.set_device_pixel_ratio(device_pixel_ratio);
        let pixmap = device_pixmap(&viewport)?;
        Ok(Self {
            id,
            viewport,
            background: None,
            pixmap,
        })
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Resizes the logical surface.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.viewport.set_canvas_size(width as f64, height as f64);
        self.pixmap = device_pixmap(&self.viewport)?;
        Ok(())
    }

    /// Sets the background image and returns its bounds in scene units.
    pub fn set_background(&mut self, image: &RgbaImage) -> Result<ImageBounds> {
        let pixmap = rgba_to_pixmap(image)?;
        let bounds = ImageBounds::new(pixmap.width() as f64, pixmap.height() as f64);
        self.background = Some(pixmap);
        Ok(bounds)
    }

    pub fn background_bounds(&self) -> Option<ImageBounds> {
        self.background
            .as_ref()
            .map(|bg| ImageBounds::new(bg.width() as f64, bg.height() as f64))
    }

    /// Zooms and pans so the whole background is visible.
    pub fn fit_background(&mut self, padding: f64) {
        if let Some(bounds) = self.background_bounds() {
            self.viewport.fit_to_bounds(bounds.bounds(), padding);
        }
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Draws the editor's scene as of `now`.
    pub fn render(&mut self, editor: &Editor, now: DateTime<Utc>) {
        self.pixmap.fill(bg_color());
        let view = device_transform(&self.viewport);

        if let Some(background) = &self.background {
            self.pixmap.draw_pixmap(
                0,
                0,
                background.as_ref(),
                &PixmapPaint::default(),
                view,
                None,
            );
        }

        for obj in editor.store().iter() {
            draw_shape(&mut self.pixmap, obj, view);
        }

        for highlight in editor.selection().decorations(editor.store(), now) {
            let color = match highlight.color {
                HighlightColor::Default => selection_color(),
                HighlightColor::LockedBlocked => blocked_color(),
            };
            if let Some(path) = bounds_path(&highlight.bounds).and_then(|p| p.transform(view)) {
                stroke(&mut self.pixmap, &path, color, 1.5, None);
            }
        }

        let transform = editor.transform();
        if let Some(obj) = transform.attached_id().and_then(|id| editor.store().get(id)) {
            let to_device = |p: crate::model::Point| {
                let d = self.viewport.scene_to_device(p);
                (d.x as f32, d.y as f32)
            };
            let dpr = self.viewport.device_pixel_ratio() as f32;

            if let Some(rotation) = transform.rotation_handle_point(obj) {
                let (rx, ry) = to_device(rotation);
                if let Some(circle) = PathBuilder::from_circle(rx, ry, HANDLE_SIZE / 2.0 * dpr) {
                    fill(&mut self.pixmap, &circle, handle_color());
                    stroke(&mut self.pixmap, &circle, selection_color(), 1.0, None);
                }
            }
            for (_, point) in transform.handle_points(obj) {
                let (hx, hy) = to_device(point);
                let size = HANDLE_SIZE * dpr;
                if let Some(rect) = Rect::from_xywh(hx - size / 2.0, hy - size / 2.0, size, size) {
                    let path = PathBuilder::from_rect(rect);
                    fill(&mut self.pixmap, &path, handle_color());
                    stroke(&mut self.pixmap, &path, selection_color(), 1.0, None);
                }
            }
        }
    }

    /// Current pixels with `overlay` composited on top, as straight RGBA.
    pub fn snapshot(&self, overlay: Option<&Pixmap>) -> Result<RgbaImage> {
        let mut composed = self.pixmap.clone();
        if let Some(layer) = overlay {
            composed.draw_pixmap(
                0,
                0,
                layer.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
        pixmap_to_rgba(&composed)
    }
}

impl RenderSurface for SceneRenderer {
    fn surface_id(&self) -> SurfaceId {
        self.id
    }

    fn logical_size(&self) -> (f32, f32) {
        (
            self.viewport.canvas_width() as f32,
            self.viewport.canvas_height() as f32,
        )
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.viewport.device_pixel_ratio() as f32
    }

    fn pixel_buffer(&self) -> Option<PixmapRef<'_>> {
        Some(self.pixmap.as_ref())
    }

    fn view_transform(&self) -> Option<ViewTransform> {
        Some(self.viewport.view_transform())
    }
}

fn device_pixmap(viewport: &Viewport) -> Result<Pixmap> {
    let dpr = viewport.device_pixel_ratio();
    let width = (viewport.canvas_width() * dpr).ceil() as u32;
    let height = (viewport.canvas_height() * dpr).ceil() as u32;
    Pixmap::new(width, height).ok_or_else(|| {
        EditorError::SurfaceUnavailable {
            reason: format!("cannot allocate a {}x{} surface", width, height),
        }
        .into()
    })
}

/// Scene -> device pixels: `device = (scene * zoom + pan) * dpr`.
fn device_transform(viewport: &Viewport) -> Transform {
    let dpr = viewport.device_pixel_ratio();
    let scale = (viewport.zoom() * dpr) as f32;
    Transform::from_row(
        scale,
        0.0,
        0.0,
        scale,
        (viewport.pan_x() * dpr) as f32,
        (viewport.pan_y() * dpr) as f32,
    )
}

fn shape_path(obj: &DrawingObject) -> Option<Path> {
    if !obj.shape.has_geometry() {
        return None;
    }
    let center = obj.center();
    let (w, h) = obj.shape.extent(obj.scale_x, obj.scale_y);
    let rotate = Transform::from_rotate_at(
        obj.shape.rotation() as f32,
        center.x as f32,
        center.y as f32,
    );
    let left = (center.x - w / 2.0) as f32;
    let top = (center.y - h / 2.0) as f32;

    let path = match &obj.shape {
        Shape::Rectangle(_) => PathBuilder::from_rect(Rect::from_xywh(left, top, w as f32, h as f32)?),
        Shape::Circle(_) => PathBuilder::from_oval(Rect::from_xywh(left, top, w as f32, h as f32)?)?,
        Shape::Point(p) => PathBuilder::from_circle(
            p.position.x as f32,
            p.position.y as f32,
            POINT_MARKER_RADIUS as f32,
        )?,
    };
    path.transform(rotate)
}

fn draw_shape(pixmap: &mut Pixmap, obj: &DrawingObject, view: Transform) {
    let Some(path) = shape_path(obj).and_then(|p| p.transform(view)) else {
        return;
    };
    fill(pixmap, &path, shape_fill());
    if obj.locked {
        stroke(
            pixmap,
            &path,
            locked_color(),
            SHAPE_STROKE,
            StrokeDash::new(vec![6.0, 4.0], 0.0),
        );
    } else {
        stroke(pixmap, &path, shape_color(), SHAPE_STROKE, None);
    }
}

fn bounds_path(bounds: &Bounds) -> Option<Path> {
    let rect = Rect::from_ltrb(
        bounds.min_x as f32,
        bounds.min_y as f32,
        bounds.max_x as f32,
        bounds.max_y as f32,
    )?;
    Some(PathBuilder::from_rect(rect))
}

fn fill(pixmap: &mut Pixmap, path: &Path, color: Color) {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    pixmap.fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
}

fn stroke(pixmap: &mut Pixmap, path: &Path, color: Color, width: f32, dash: Option<StrokeDash>) {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    let stroke = Stroke {
        width,
        dash,
        ..Default::default()
    };
    pixmap.stroke_path(path, &paint, &stroke, Transform::identity(), None);
}

/// Converts straight RGBA into a premultiplied pixmap.
pub fn rgba_to_pixmap(image: &RgbaImage) -> Result<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height()).ok_or_else(|| EditorError::Image {
        reason: "background image has no pixels".to_string(),
    })?;
    let mut data = image.as_raw().clone();
    for px in data.chunks_exact_mut(4) {
        let alpha = px[3] as u16;
        for channel in &mut px[..3] {
            *channel = ((*channel as u16 * alpha + 127) / 255) as u8;
        }
    }
    Pixmap::from_vec(data, size).ok_or_else(|| {
        EditorError::Image {
            reason: "pixel data does not match image size".to_string(),
        }
        .into()
    })
}

/// Converts a premultiplied pixmap back into straight RGBA.
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> Result<RgbaImage> {
    let data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data).ok_or_else(|| {
        EditorError::Image {
            reason: "pixmap size does not match its data".to_string(),
        }
        .into()
    })
}
