//! Axis-aligned bounds for shapes and groups of shapes.
//!
//! Every caller that needs "where is this thing" goes through here, so the
//! rotated-rectangle math lives in one place. Missing geometry never
//! panics: [`shape_bounds`] reports it as `None` and [`bounds_or_fallback`]
//! turns it into a zero-size box at the shape's position.

use lyon::math::{point, vector, Angle, Box2D, Transform};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{DesignerShape, Point, Shape, POINT_MARKER_RADIUS};
use crate::shape_store::DrawingObject;

/// Axis-aligned bounding box in scene coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_center(center: Point, half_w: f64, half_h: f64) -> Self {
        Self::new(
            center.x - half_w,
            center.y - half_h,
            center.x + half_w,
            center.y + half_h,
        )
    }

    /// Zero-size box at `p`.
    pub fn at(p: Point) -> Self {
        Self::new(p.x, p.y, p.x, p.y)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Bounds {
        Bounds::new(
            self.min_x + dx,
            self.min_y + dy,
            self.max_x + dx,
            self.max_y + dy,
        )
    }

    pub fn expanded(&self, padding: f64) -> Bounds {
        Bounds::new(
            self.min_x - padding,
            self.min_y - padding,
            self.max_x + padding,
            self.max_y + padding,
        )
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Whether `other` lies entirely inside, allowing `epsilon` slack.
    pub fn contains_bounds(&self, other: &Bounds, epsilon: f64) -> bool {
        other.min_x >= self.min_x - epsilon
            && other.min_y >= self.min_y - epsilon
            && other.max_x <= self.max_x + epsilon
            && other.max_y <= self.max_y + epsilon
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
    }
}

/// Size of the background image; shapes are kept inside `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageBounds {
    pub width: f64,
    pub height: f64,
}

impl ImageBounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(0.0, 0.0, self.width, self.height)
    }
}

/// Bounds of a single shape including rotation and in-flight scale.
///
/// Returns `None` when the shape's attributes do not describe a geometry
/// (non-finite numbers, negative sizes).
pub fn shape_bounds(obj: &DrawingObject) -> Option<Bounds> {
    if !obj.shape.has_geometry() || !obj.scale_x.is_finite() || !obj.scale_y.is_finite() {
        return None;
    }

    let bounds = match &obj.shape {
        Shape::Point(p) => Bounds::from_center(p.position, POINT_MARKER_RADIUS, POINT_MARKER_RADIUS),
        Shape::Circle(c) => {
            let rx = (c.radius * obj.scale_x).abs();
            let ry = (c.radius * obj.scale_y).abs();
            let (half_w, half_h) = rotated_ellipse_extent(rx, ry, c.rotation);
            Bounds::from_center(c.center, half_w, half_h)
        }
        Shape::Rectangle(r) => {
            let half_w = (r.width * obj.scale_x).abs() / 2.0;
            let half_h = (r.height * obj.scale_y).abs() / 2.0;
            let center = obj.center();
            if r.rotation.rem_euclid(360.0).abs() < 1e-9 {
                Bounds::from_center(center, half_w, half_h)
            } else {
                rotated_rect_bounds(center, half_w, half_h, r.rotation)
            }
        }
    };

    bounds.is_finite().then_some(bounds)
}

/// Bounds of a shape, or a zero-size box at its position when the geometry
/// is unusable.
pub fn bounds_or_fallback(obj: &DrawingObject) -> Bounds {
    match shape_bounds(obj) {
        Some(bounds) => bounds,
        None => {
            warn!(shape = obj.id, "Shape has no usable geometry, using zero-size bounds");
            let origin = obj.origin();
            if origin.is_finite() {
                Bounds::at(origin)
            } else {
                Bounds::at(Point::default())
            }
        }
    }
}

/// Union of the bounds of every member; `None` for an empty group.
pub fn group_bounds<'a, I>(members: I) -> Option<Bounds>
where
    I: IntoIterator<Item = &'a DrawingObject>,
{
    members
        .into_iter()
        .map(bounds_or_fallback)
        .reduce(|acc, b| acc.union(&b))
}

fn rotated_rect_bounds(center: Point, half_w: f64, half_h: f64, rotation_deg: f64) -> Bounds {
    let transform = Transform::rotation(Angle::degrees(rotation_deg as f32))
        .then_translate(vector(center.x as f32, center.y as f32));
    let (hw, hh) = (half_w as f32, half_h as f32);
    let corners = [
        point(-hw, -hh),
        point(hw, -hh),
        point(hw, hh),
        point(-hw, hh),
    ]
    .map(|p| transform.transform_point(p));
    let aabb = Box2D::from_points(corners);

    Bounds::new(
        aabb.min.x as f64,
        aabb.min.y as f64,
        aabb.max.x as f64,
        aabb.max.y as f64,
    )
}

fn rotated_ellipse_extent(rx: f64, ry: f64, rotation_deg: f64) -> (f64, f64) {
    if rx == ry {
        return (rx, ry);
    }
    let (s, c) = rotation_deg.to_radians().sin_cos();
    (
        ((rx * c).powi(2) + (ry * s).powi(2)).sqrt(),
        ((rx * s).powi(2) + (ry * c).powi(2)).sqrt(),
    )
}
