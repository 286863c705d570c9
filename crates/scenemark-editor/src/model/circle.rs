use serde::{Deserialize, Serialize};

use super::{DesignerShape, Point};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignCircle {
    pub radius: f64,
    pub center: Point,
    pub rotation: f64,
}

impl DesignCircle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            center,
            radius,
            rotation: 0.0,
        }
    }
}

impl DesignerShape for DesignCircle {
    fn origin(&self) -> Point {
        self.center
    }

    fn set_origin(&mut self, origin: Point) {
        self.center = origin;
    }

    fn center(&self, _scale_x: f64, _scale_y: f64) -> Point {
        self.center
    }

    fn has_geometry(&self) -> bool {
        self.center.is_finite() && self.radius.is_finite() && self.radius >= 0.0
    }

    fn contains_point(&self, p: Point, scale_x: f64, scale_y: f64, tolerance: f64) -> bool {
        let rx = self.radius * scale_x + tolerance;
        let ry = self.radius * scale_y + tolerance;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let nx = (p.x - self.center.x) / rx;
        let ny = (p.y - self.center.y) / ry;
        nx * nx + ny * ny <= 1.0
    }
}
