//! The lens overlay.
//!
//! Setters and pointer input only mutate state and schedule a redraw. The
//! host calls [`MagnifierOverlay::on_animation_frame`] from its frame
//! callback; that drains the selection and settings events queued since
//! the last frame, then draws once if anything asked for it. The queue is
//! fed by a filtered bus handler, so drag traffic never crowds it. Drawing samples the surface's pixel buffer into a
//! transparent layer the host composites over the scene.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tiny_skia::{
    Color, FillRule, FilterQuality, Mask, Paint, PathBuilder, Pattern, Pixmap, PixmapRef, Rect,
    SpreadMode, Stroke, Transform,
};
use tracing::{debug, warn};

use scenemark_core::{
    AppEvent, EventBus, EventCategory, EventFilter, MagnifierEvent, SelectionEvent,
    SettingsEvent, ShapeId, SubscriptionId, SurfaceId,
};
use scenemark_settings::LoupeSettings;

use super::frame::FrameScheduler;
use super::state::{LoupeAnchor, LoupeState};
use super::surface::RenderSurface;
use crate::model::Point;

fn lens_background() -> Color {
    Color::from_rgba8(0, 0, 0, 230)
}
fn crosshair_color() -> Color {
    Color::from_rgba8(255, 255, 255, 204)
}
fn border_color() -> Color {
    Color::from_rgba8(52, 152, 219, 255)
}

const CROSSHAIR_ARM_PX: f32 = 8.0;
const BORDER_WIDTH_PX: f32 = 2.0;

/// Source rectangle in device pixels of the surface buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Geometry of one drawn lens.
#[derive(Debug, Clone, PartialEq)]
pub struct LensFrame {
    /// Sampled point, overlay-local logical pixels.
    pub sample_center: Point,
    /// Lens center after offset and edge clamping, logical pixels.
    pub lens_center: Point,
    pub source: SourceRect,
    /// Lens diameter in device pixels.
    pub diameter_px: f32,
}

/// What happened on an animation frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameResult {
    /// Nothing was scheduled.
    Idle,
    /// The layer was cleared and no lens is shown.
    Hidden,
    Drawn(LensFrame),
}

pub struct MagnifierOverlay {
    surface: SurfaceId,
    state: LoupeState,
    scheduler: FrameScheduler,
    pointer: Option<Point>,
    selection: Vec<ShapeId>,
    inbox: Arc<Mutex<VecDeque<AppEvent>>>,
    subscription: Option<SubscriptionId>,
    bus: Arc<EventBus>,
    layer: Option<Pixmap>,
    missing_view_transform: bool,
    missing_pixel_buffer: bool,
    draw_count: u64,
}

impl MagnifierOverlay {
    /// Creates an overlay for `surface` listening on `bus`.
    ///
    /// `selection` seeds the selection the overlay knows about; later
    /// changes arrive as [`SelectionEvent::Changed`].
    pub fn new(
        surface: SurfaceId,
        settings: &LoupeSettings,
        bus: Arc<EventBus>,
        selection: Vec<ShapeId>,
    ) -> Self {
        let inbox = Arc::new(Mutex::new(VecDeque::new()));
        let queue = inbox.clone();
        let subscription = bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Selection, EventCategory::Settings]),
            move |event| queue.lock().push_back(event),
        );

        let mut overlay = Self {
            surface,
            state: LoupeState::from_settings(settings),
            scheduler: FrameScheduler::new(),
            pointer: None,
            selection,
            inbox,
            subscription: Some(subscription),
            bus,
            layer: None,
            missing_view_transform: false,
            missing_pixel_buffer: false,
            draw_count: 0,
        };
        overlay.schedule_redraw();
        overlay
    }

    pub fn surface_id(&self) -> SurfaceId {
        self.surface
    }

    pub fn state(&self) -> &LoupeState {
        &self.state
    }

    /// Number of lenses drawn so far.
    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    pub fn is_redraw_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Frames requested from the host so far.
    pub fn frame_requests(&self) -> u64 {
        self.scheduler.requests()
    }

    /// Transparent layer with the last drawn lens, device pixels.
    pub fn layer(&self) -> Option<&Pixmap> {
        self.layer.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Schedules a redraw. Returns `true` when the host must request an
    /// animation frame.
    pub fn schedule_redraw(&mut self) -> bool {
        if !self.is_attached() {
            return false;
        }
        self.scheduler.schedule()
    }

    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        self.state.enabled = enabled;
        self.schedule_redraw()
    }

    pub fn set_size(&mut self, size_px: f32) -> bool {
        self.state.set_size(size_px);
        self.schedule_redraw()
    }

    /// Values below 1 are raised to 1.
    pub fn set_magnification(&mut self, magnification: f32) -> bool {
        self.state.set_magnification(magnification);
        self.schedule_redraw()
    }

    pub fn set_crosshair(&mut self, visible: bool) -> bool {
        self.state.crosshair_visible = visible;
        self.schedule_redraw()
    }

    pub fn set_offset(&mut self, x: f32, y: f32) -> bool {
        self.state.set_offset(x, y);
        self.schedule_redraw()
    }

    pub fn set_anchor_pointer(&mut self) -> bool {
        self.state.anchor = LoupeAnchor::Pointer;
        self.schedule_redraw()
    }

    pub fn set_anchor_point(&mut self, x: f64, y: f64) -> bool {
        self.state.anchor = LoupeAnchor::ScenePoint(Point::new(x, y));
        self.schedule_redraw()
    }

    /// Anchors the lens to a shape's center in scene coordinates. Calling
    /// it again with a new center follows a moving shape.
    pub fn set_anchor_shape(&mut self, id: ShapeId, center: Point) -> bool {
        self.state.anchor = LoupeAnchor::Shape { id, center };
        self.schedule_redraw()
    }

    fn follows_pointer(&self) -> bool {
        matches!(self.state.anchor, LoupeAnchor::Pointer) || self.missing_view_transform
    }

    /// Pointer position in overlay-local logical pixels.
    pub fn pointer_move(&mut self, local: Point) -> bool {
        self.pointer = Some(local);
        if self.follows_pointer() {
            self.schedule_redraw()
        } else {
            false
        }
    }

    /// Hides a pointer-following lens; anchored lenses stay.
    pub fn pointer_leave(&mut self) -> bool {
        self.pointer = None;
        if self.follows_pointer() {
            self.schedule_redraw()
        } else {
            false
        }
    }

    /// Applies queued selection and settings events. Returns how many
    /// changed the overlay.
    pub fn sync_events(&mut self) -> usize {
        let pending = std::mem::take(&mut *self.inbox.lock());
        let mut applied = 0;
        for event in pending {
            if self.apply_event(event) {
                applied += 1;
            }
        }
        if applied > 0 {
            self.schedule_redraw();
        }
        applied
    }

    fn apply_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Selection(SelectionEvent::Changed { ids, .. }) => {
                self.selection = ids;
                true
            }
            AppEvent::Settings(SettingsEvent::Changed { key, value }) => {
                let changed = self.state.apply_setting(&key, &value);
                if changed {
                    debug!(%key, "Magnifier applied setting");
                }
                changed
            }
            _ => false,
        }
    }

    /// Animation-frame callback.
    pub fn on_animation_frame(&mut self, surface: &dyn RenderSurface) -> FrameResult {
        self.sync_events();
        if !self.scheduler.take() {
            return FrameResult::Idle;
        }

        let (width, height) = surface.logical_size();
        let dpr = surface.device_pixel_ratio().max(f32::EPSILON);
        if !self.prepare_layer(width, height, dpr) {
            return FrameResult::Hidden;
        }

        let Some(sample) = self.sample_center(surface) else {
            return FrameResult::Hidden;
        };
        let Some(buffer) = surface.pixel_buffer() else {
            if !self.missing_pixel_buffer {
                self.missing_pixel_buffer = true;
                self.degrade("pixel buffer unavailable");
            }
            return FrameResult::Hidden;
        };

        let frame = lens_frame(&self.state, sample, width, height, dpr);
        let Some(layer) = self.layer.as_mut() else {
            return FrameResult::Hidden;
        };
        if !draw_lens(layer, buffer, &frame, &self.state, dpr) {
            return FrameResult::Hidden;
        }
        self.draw_count += 1;
        FrameResult::Drawn(frame)
    }

    /// Cancels any pending frame and releases the event subscription.
    pub fn detach(&mut self) {
        self.scheduler.cancel();
        if let Some(id) = self.subscription.take() {
            self.bus.unsubscribe(id);
        }
        self.inbox.lock().clear();
        self.layer = None;
    }

    /// Resizes and clears the layer. `false` when the surface has no area.
    fn prepare_layer(&mut self, width: f32, height: f32, dpr: f32) -> bool {
        let w = (width * dpr).ceil();
        let h = (height * dpr).ceil();
        if !(w >= 1.0 && h >= 1.0) {
            self.layer = None;
            return false;
        }
        let (w, h) = (w as u32, h as u32);

        let reuse = self
            .layer
            .as_ref()
            .is_some_and(|layer| layer.width() == w && layer.height() == h);
        if reuse {
            if let Some(layer) = self.layer.as_mut() {
                layer.fill(Color::TRANSPARENT);
            }
        } else {
            self.layer = Pixmap::new(w, h);
        }
        self.layer.is_some()
    }

    fn sample_center(&mut self, surface: &dyn RenderSurface) -> Option<Point> {
        if !self.state.enabled {
            return None;
        }
        match self.state.anchor {
            LoupeAnchor::Pointer => self.pointer,
            LoupeAnchor::ScenePoint(scene) => self.project(scene, surface),
            LoupeAnchor::Shape { id, center } => {
                if !self.selection.contains(&id) {
                    debug!(shape = id, "Anchored shape no longer selected, lens hidden");
                    return None;
                }
                self.project(center, surface)
            }
        }
    }

    fn project(&mut self, scene: Point, surface: &dyn RenderSurface) -> Option<Point> {
        match surface.view_transform() {
            Some(view) => Some(view.scene_to_local(scene)),
            None => {
                if !self.missing_view_transform {
                    self.missing_view_transform = true;
                    self.degrade("view transform unavailable, following pointer");
                }
                self.pointer
            }
        }
    }

    fn degrade(&self, reason: &str) {
        warn!(surface = %self.surface, reason, "Magnifier running in reduced mode");
        let _ = self.bus.publish(AppEvent::Magnifier(MagnifierEvent::Degraded {
            surface: self.surface,
            reason: reason.to_string(),
        }));
    }
}

impl Drop for MagnifierOverlay {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Lens placement for a sample at `sample` on a `width` x `height` surface.
pub fn lens_frame(
    state: &LoupeState,
    sample: Point,
    width: f32,
    height: f32,
    dpr: f32,
) -> LensFrame {
    let radius = state.radius();
    let lens_x = clamp_lens_axis(sample.x as f32 + state.offset.0, radius, width);
    let lens_y = clamp_lens_axis(sample.y as f32 + state.offset.1, radius, height);

    let source_size = state.size_px / state.magnification * dpr;
    let source = SourceRect {
        x: sample.x as f32 * dpr - source_size / 2.0,
        y: sample.y as f32 * dpr - source_size / 2.0,
        width: source_size,
        height: source_size,
    };

    LensFrame {
        sample_center: sample,
        lens_center: Point::new(lens_x as f64, lens_y as f64),
        source,
        diameter_px: state.size_px * dpr,
    }
}

fn clamp_lens_axis(center: f32, radius: f32, extent: f32) -> f32 {
    if extent <= radius * 2.0 {
        extent / 2.0
    } else {
        center.clamp(radius, extent - radius)
    }
}

fn draw_lens(
    layer: &mut Pixmap,
    source: PixmapRef<'_>,
    frame: &LensFrame,
    state: &LoupeState,
    dpr: f32,
) -> bool {
    let cx = frame.lens_center.x as f32 * dpr;
    let cy = frame.lens_center.y as f32 * dpr;
    let radius = frame.diameter_px / 2.0;
    let Some(circle) = PathBuilder::from_circle(cx, cy, radius) else {
        return false;
    };

    let mut background = Paint::default();
    background.set_color(lens_background());
    background.anti_alias = true;
    layer.fill_path(&circle, &background, FillRule::Winding, Transform::identity(), None);

    // Visible part of the source rect, in buffer pixels.
    let left = frame.source.x.max(0.0);
    let top = frame.source.y.max(0.0);
    let right = (frame.source.x + frame.source.width).min(source.width() as f32);
    let bottom = (frame.source.y + frame.source.height).min(source.height() as f32);

    if let (Some(visible), Some(mut mask)) = (
        Rect::from_ltrb(left, top, right, bottom),
        Mask::new(layer.width(), layer.height()),
    ) {
        mask.fill_path(&circle, FillRule::Winding, true, Transform::identity());

        let mag = state.magnification;
        let source_cx = frame.source.x + frame.source.width / 2.0;
        let source_cy = frame.source.y + frame.source.height / 2.0;
        let to_lens = Transform::from_row(
            mag,
            0.0,
            0.0,
            mag,
            cx - source_cx * mag,
            cy - source_cy * mag,
        );

        let paint = Paint {
            shader: Pattern::new(
                source,
                SpreadMode::Pad,
                FilterQuality::Nearest,
                1.0,
                Transform::identity(),
            ),
            anti_alias: false,
            ..Paint::default()
        };
        layer.fill_rect(visible, &paint, to_lens, Some(&mask));
    }

    if state.crosshair_visible {
        let arm = CROSSHAIR_ARM_PX * dpr;
        let mut pb = PathBuilder::new();
        pb.move_to(cx - arm, cy);
        pb.line_to(cx + arm, cy);
        pb.move_to(cx, cy - arm);
        pb.line_to(cx, cy + arm);
        if let Some(path) = pb.finish() {
            let mut paint = Paint::default();
            paint.set_color(crosshair_color());
            let stroke = Stroke {
                width: dpr,
                ..Default::default()
            };
            layer.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    let mut ring = Paint::default();
    ring.set_color(border_color());
    ring.anti_alias = true;
    let stroke = Stroke {
        width: BORDER_WIDTH_PX * dpr,
        ..Default::default()
    };
    layer.stroke_path(&circle, &ring, &stroke, Transform::identity(), None);
    true
}
