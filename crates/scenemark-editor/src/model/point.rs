use serde::{Deserialize, Serialize};

use super::{DesignerShape, Point};

/// Radius of the marker drawn for point annotations, in scene units.
/// Points are hit-tested and clamped by this marker, not by a zero-size dot.
pub const POINT_MARKER_RADIUS: f64 = 6.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignPoint {
    pub position: Point,
}

impl DesignPoint {
    pub fn new(position: Point) -> Self {
        Self { position }
    }
}

impl DesignerShape for DesignPoint {
    fn origin(&self) -> Point {
        self.position
    }

    fn set_origin(&mut self, origin: Point) {
        self.position = origin;
    }

    fn center(&self, _scale_x: f64, _scale_y: f64) -> Point {
        self.position
    }

    fn has_geometry(&self) -> bool {
        self.position.is_finite()
    }

    fn contains_point(&self, p: Point, _scale_x: f64, _scale_y: f64, tolerance: f64) -> bool {
        self.position.distance_to(&p) <= POINT_MARKER_RADIUS + tolerance
    }
}
