//! Resize and rotate affordances for the single selected shape.
//!
//! The controller is attached to at most one shape at a time (the
//! selection manager decides which). While attached it exposes the handle
//! set the registry allows and runs the gesture:
//!
//! 1. [`TransformController::begin_transform`] snapshots the shape.
//! 2. [`TransformController::resize`] / [`TransformController::rotate`]
//!    update transient `scale_x`/`scale_y` or the rotation, always derived
//!    from the snapshot so repeated pointer moves do not accumulate error.
//! 3. [`TransformController::transform_end`] bakes the scale into the
//!    semantic size (width/height or radius) and resets it to identity.
//!
//! Calls for a shape that is not attached are ignored.

use tracing::{debug, warn};

use scenemark_core::ShapeId;

use crate::geometry::{shape_bounds, ImageBounds};
use crate::model::{rotate_point, Point, Shape};
use crate::shape_registry::{HandlePosition, ShapeRegistry, TransformHandleSet};
use crate::shape_store::DrawingObject;

/// Smallest scale factor a single resize step may produce relative to
/// the size at gesture start.
pub const MIN_SCALE: f64 = 0.01;

/// Distance of the rotation handle above the top edge, in scene units.
pub const ROTATION_HANDLE_OFFSET: f64 = 24.0;

/// Handle under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleHit {
    Resize(HandlePosition),
    Rotate,
}

#[derive(Debug, Clone)]
struct Attachment {
    shape_id: ShapeId,
    handles: TransformHandleSet,
}

#[derive(Debug, Clone)]
struct Gesture {
    start: DrawingObject,
}

#[derive(Debug, Clone)]
pub struct TransformController {
    attached: Option<Attachment>,
    gesture: Option<Gesture>,
    min_shape_size: f64,
}

impl Default for TransformController {
    fn default() -> Self {
        Self::new(scenemark_core::constants::MIN_SHAPE_SIZE)
    }
}

impl TransformController {
    pub fn new(min_shape_size: f64) -> Self {
        Self {
            attached: None,
            gesture: None,
            min_shape_size,
        }
    }

    pub fn set_min_shape_size(&mut self, min_shape_size: f64) {
        self.min_shape_size = min_shape_size;
    }

    /// Shows the handles allowed for `obj`. Returns whether anything was
    /// attached; locked shapes and types without a policy leave the
    /// controller detached.
    pub fn attach(&mut self, obj: &DrawingObject, registry: &ShapeRegistry) -> bool {
        if obj.locked {
            debug!(shape = obj.id, "Shape is locked, transform handles withheld");
            self.detach();
            return false;
        }

        let Some(handles) = registry.handle_set(obj) else {
            warn!(
                shape = obj.id,
                shape_type = %obj.shape_type(),
                "No transform policy registered for shape type"
            );
            self.detach();
            return false;
        };

        if self.gesture.as_ref().is_some_and(|g| g.start.id != obj.id) {
            self.gesture = None;
        }
        self.attached = Some(Attachment {
            shape_id: obj.id,
            handles,
        });
        true
    }

    pub fn detach(&mut self) {
        self.attached = None;
        self.gesture = None;
    }

    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    pub fn attached_id(&self) -> Option<ShapeId> {
        self.attached.as_ref().map(|a| a.shape_id)
    }

    /// Resize handles currently shown; empty when detached.
    pub fn visible_handles(&self) -> &[HandlePosition] {
        self.attached
            .as_ref()
            .map(|a| a.handles.handles.as_slice())
            .unwrap_or(&[])
    }

    pub fn rotate_visible(&self) -> bool {
        self.attached
            .as_ref()
            .is_some_and(|a| a.handles.rotate_enabled)
    }

    pub fn keep_ratio(&self) -> bool {
        self.attached.as_ref().is_some_and(|a| a.handles.keep_ratio)
    }

    pub fn is_transforming(&self) -> bool {
        self.gesture.is_some()
    }

    fn is_attached_to(&self, id: ShapeId) -> bool {
        self.attached_id() == Some(id)
    }

    /// Starts a gesture on the attached shape.
    pub fn begin_transform(&mut self, obj: &DrawingObject) -> bool {
        if !self.is_attached_to(obj.id) {
            return false;
        }
        self.gesture = Some(Gesture { start: obj.clone() });
        true
    }

    /// Applies a handle drag. `dx`/`dy` are the pointer delta since
    /// [`begin_transform`](Self::begin_transform), in scene units.
    ///
    /// Returns `false` when the step is rejected; the shape then keeps its
    /// previous scale.
    pub fn resize(
        &mut self,
        obj: &mut DrawingObject,
        handle: HandlePosition,
        dx: f64,
        dy: f64,
        image: Option<ImageBounds>,
    ) -> bool {
        let Some(attachment) = self.attached.as_ref() else {
            return false;
        };
        if attachment.shape_id != obj.id || !attachment.handles.contains(handle) {
            return false;
        }
        let Some(gesture) = self.gesture.as_ref().filter(|g| g.start.id == obj.id) else {
            return false;
        };
        let start = &gesture.start;

        let rotation = start.shape.rotation();
        let local = rotate_point(Point::new(dx, dy), Point::default(), -rotation);
        let (hx, hy) = handle.direction();
        let (w0, h0) = start.shape.extent(start.scale_x, start.scale_y);
        if w0 <= 0.0 || h0 <= 0.0 {
            return false;
        }

        let mut fx = if hx != 0.0 { (w0 + hx * local.x) / w0 } else { 1.0 };
        let mut fy = if hy != 0.0 { (h0 + hy * local.y) / h0 } else { 1.0 };
        if attachment.handles.keep_ratio {
            let f = if handle.is_corner() {
                fx.min(fy)
            } else if hx != 0.0 {
                fx
            } else {
                fy
            };
            fx = f;
            fy = f;
        }
        if !fx.is_finite() || !fy.is_finite() || fx < MIN_SCALE || fy < MIN_SCALE {
            return false;
        }

        // Keep the handle opposite the dragged one fixed in scene space.
        let before = Point::new(-hx * w0 / 2.0, -hy * h0 / 2.0);
        let after = Point::new(-hx * w0 * fx / 2.0, -hy * h0 * fy / 2.0);
        let shift = rotate_point(
            Point::new(before.x - after.x, before.y - after.y),
            Point::default(),
            rotation,
        );
        let center = start.center().offset(shift.x, shift.y);

        let mut candidate = start.clone();
        candidate.scale_x = start.scale_x * fx;
        candidate.scale_y = start.scale_y * fy;
        match &mut candidate.shape {
            Shape::Rectangle(r) => r.set_center(center, candidate.scale_x, candidate.scale_y),
            Shape::Circle(c) => c.center = center,
            Shape::Point(_) => return false,
        }

        if let Some(image) = image {
            let Some(after_bounds) = shape_bounds(&candidate) else {
                return false;
            };
            let mut allowed = image.bounds();
            if let Some(start_bounds) = shape_bounds(start) {
                allowed = allowed.union(&start_bounds);
            }
            if !allowed.contains_bounds(&after_bounds, 1e-6) {
                debug!(shape = obj.id, "Resize step would leave the image, rejected");
                return false;
            }
        }

        candidate.label = obj.label.clone();
        candidate.locked = obj.locked;
        *obj = candidate;
        true
    }

    /// Sets the absolute rotation in degrees. Ignored unless the rotation
    /// handle is shown for `obj`.
    pub fn rotate(&mut self, obj: &mut DrawingObject, degrees: f64) -> bool {
        if !self.is_attached_to(obj.id) || !self.rotate_visible() || !degrees.is_finite() {
            return false;
        }
        obj.shape.set_rotation(degrees);
        true
    }

    /// Ends the gesture and bakes the scale into the shape's size.
    pub fn transform_end(&mut self, obj: &mut DrawingObject) -> bool {
        if !self.is_attached_to(obj.id) {
            return false;
        }
        self.gesture = None;
        normalize_scale(obj, self.min_shape_size);
        true
    }

    /// Abandons the gesture and restores the snapshot.
    pub fn cancel_transform(&mut self, obj: &mut DrawingObject) -> bool {
        match self.gesture.take() {
            Some(gesture) if gesture.start.id == obj.id => {
                *obj = gesture.start;
                true
            }
            Some(gesture) => {
                self.gesture = Some(gesture);
                false
            }
            None => false,
        }
    }

    /// Scene positions of the visible resize handles of `obj`.
    pub fn handle_points(&self, obj: &DrawingObject) -> Vec<(HandlePosition, Point)> {
        if !self.is_attached_to(obj.id) {
            return Vec::new();
        }
        let center = obj.center();
        let (w, h) = obj.shape.extent(obj.scale_x, obj.scale_y);
        let rotation = obj.shape.rotation();
        self.visible_handles()
            .iter()
            .map(|&handle| {
                let (hx, hy) = handle.direction();
                let local = center.offset(hx * w / 2.0, hy * h / 2.0);
                (handle, rotate_point(local, center, rotation))
            })
            .collect()
    }

    pub fn rotation_handle_point(&self, obj: &DrawingObject) -> Option<Point> {
        if !self.is_attached_to(obj.id) || !self.rotate_visible() {
            return None;
        }
        let center = obj.center();
        let (_, h) = obj.shape.extent(obj.scale_x, obj.scale_y);
        let local = center.offset(0.0, -h / 2.0 - ROTATION_HANDLE_OFFSET);
        Some(rotate_point(local, center, obj.shape.rotation()))
    }

    pub fn handle_at(&self, obj: &DrawingObject, p: Point, tolerance: f64) -> Option<HandleHit> {
        if let Some(rotation) = self.rotation_handle_point(obj) {
            if rotation.distance_to(&p) <= tolerance {
                return Some(HandleHit::Rotate);
            }
        }
        self.handle_points(obj)
            .into_iter()
            .find(|(_, point)| point.distance_to(&p) <= tolerance)
            .map(|(handle, _)| HandleHit::Resize(handle))
    }
}

/// Multiplies the semantic size by the transient scale, resets the scale
/// to identity and enforces `min_size`. The shape's center is preserved.
pub fn normalize_scale(obj: &mut DrawingObject, min_size: f64) {
    let (sx, sy) = (obj.scale_x, obj.scale_y);
    if !sx.is_finite() || !sy.is_finite() {
        warn!(shape = obj.id, "Discarding non-finite scale");
        obj.scale_x = 1.0;
        obj.scale_y = 1.0;
        return;
    }

    let center = obj.center();
    match &mut obj.shape {
        Shape::Rectangle(r) => {
            r.width = (r.width * sx).abs().max(min_size);
            r.height = (r.height * sy).abs().max(min_size);
            r.set_center(center, 1.0, 1.0);
        }
        Shape::Circle(c) => {
            let factor = (sx.abs() + sy.abs()) / 2.0;
            c.radius = (c.radius * factor).max(min_size);
        }
        Shape::Point(_) => {}
    }
    obj.scale_x = 1.0;
    obj.scale_y = 1.0;
}
