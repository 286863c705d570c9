use serde::{Deserialize, Serialize};
use std::fmt;

mod circle;
mod point;
mod rectangle;

pub use circle::DesignCircle;
pub use point::{DesignPoint, POINT_MARKER_RADIUS};
pub use rectangle::DesignRectangle;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Common behaviour of every placeable marker.
///
/// `origin` is the attribute drags move: the top-left corner for
/// rectangles, the center for circles and points.
pub trait DesignerShape {
    fn origin(&self) -> Point;
    fn set_origin(&mut self, origin: Point);

    /// Center of the shape with the given transient scale applied.
    fn center(&self, scale_x: f64, scale_y: f64) -> Point;

    /// Whether the attributes describe a drawable geometry.
    fn has_geometry(&self) -> bool;

    fn contains_point(&self, p: Point, scale_x: f64, scale_y: f64, tolerance: f64) -> bool;

    fn translate(&mut self, dx: f64, dy: f64) {
        let origin = self.origin();
        self.set_origin(origin.offset(dx, dy));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeType {
    Point,
    Rectangle,
    Circle,
}

impl ShapeType {
    pub const ALL: [ShapeType; 3] = [ShapeType::Point, ShapeType::Rectangle, ShapeType::Circle];
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeType::Point => write!(f, "point"),
            ShapeType::Rectangle => write!(f, "rectangle"),
            ShapeType::Circle => write!(f, "circle"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Point(DesignPoint),
    Rectangle(DesignRectangle),
    Circle(DesignCircle),
}

impl DesignerShape for Shape {
    fn origin(&self) -> Point {
        match self {
            Shape::Point(s) => s.origin(),
            Shape::Rectangle(s) => s.origin(),
            Shape::Circle(s) => s.origin(),
        }
    }

    fn set_origin(&mut self, origin: Point) {
        match self {
            Shape::Point(s) => s.set_origin(origin),
            Shape::Rectangle(s) => s.set_origin(origin),
            Shape::Circle(s) => s.set_origin(origin),
        }
    }

    fn center(&self, scale_x: f64, scale_y: f64) -> Point {
        match self {
            Shape::Point(s) => s.center(scale_x, scale_y),
            Shape::Rectangle(s) => s.center(scale_x, scale_y),
            Shape::Circle(s) => s.center(scale_x, scale_y),
        }
    }

    fn has_geometry(&self) -> bool {
        match self {
            Shape::Point(s) => s.has_geometry(),
            Shape::Rectangle(s) => s.has_geometry(),
            Shape::Circle(s) => s.has_geometry(),
        }
    }

    fn contains_point(&self, p: Point, scale_x: f64, scale_y: f64, tolerance: f64) -> bool {
        match self {
            Shape::Point(s) => s.contains_point(p, scale_x, scale_y, tolerance),
            Shape::Rectangle(s) => s.contains_point(p, scale_x, scale_y, tolerance),
            Shape::Circle(s) => s.contains_point(p, scale_x, scale_y, tolerance),
        }
    }
}

impl Shape {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Point(_) => ShapeType::Point,
            Shape::Rectangle(_) => ShapeType::Rectangle,
            Shape::Circle(_) => ShapeType::Circle,
        }
    }

    /// Returns the rotation angle in degrees
    pub fn rotation(&self) -> f64 {
        match self {
            Shape::Point(_) => 0.0,
            Shape::Rectangle(s) => s.rotation,
            Shape::Circle(s) => s.rotation,
        }
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        let normalized = degrees.rem_euclid(360.0);
        match self {
            Shape::Point(_) => {}
            Shape::Rectangle(s) => s.rotation = normalized,
            Shape::Circle(s) => s.rotation = normalized,
        }
    }

    /// Unrotated extent with the given scale applied, as (width, height).
    pub fn extent(&self, scale_x: f64, scale_y: f64) -> (f64, f64) {
        match self {
            Shape::Point(_) => (POINT_MARKER_RADIUS * 2.0, POINT_MARKER_RADIUS * 2.0),
            Shape::Rectangle(s) => (s.width * scale_x, s.height * scale_y),
            Shape::Circle(s) => (s.radius * 2.0 * scale_x, s.radius * 2.0 * scale_y),
        }
    }
}

/// Rotates `p` around `center` by `angle_deg`.
pub fn rotate_point(p: Point, center: Point, angle_deg: f64) -> Point {
    let angle_rad = angle_deg.to_radians();
    let s = angle_rad.sin();
    let c = angle_rad.cos();
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    Point {
        x: center.x + dx * c - dy * s,
        y: center.y + dx * s + dy * c,
    }
}
