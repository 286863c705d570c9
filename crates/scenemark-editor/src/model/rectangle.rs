use serde::{Deserialize, Serialize};

use super::{rotate_point, DesignerShape, Point};

/// Rectangle annotation.
///
/// `(x, y)` is the top-left corner of the unrotated box. Rotation pivots on
/// the center of the (scaled) box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignRectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

impl DesignRectangle {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
    }

    /// Places the scaled box so that its center lands on `center`.
    pub fn set_center(&mut self, center: Point, scale_x: f64, scale_y: f64) {
        self.x = center.x - self.width * scale_x / 2.0;
        self.y = center.y - self.height * scale_y / 2.0;
    }
}

impl DesignerShape for DesignRectangle {
    fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn set_origin(&mut self, origin: Point) {
        self.x = origin.x;
        self.y = origin.y;
    }

    fn center(&self, scale_x: f64, scale_y: f64) -> Point {
        Point::new(
            self.x + self.width * scale_x / 2.0,
            self.y + self.height * scale_y / 2.0,
        )
    }

    fn has_geometry(&self) -> bool {
        [self.x, self.y, self.width, self.height, self.rotation]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }

    fn contains_point(&self, p: Point, scale_x: f64, scale_y: f64, tolerance: f64) -> bool {
        let center = self.center(scale_x, scale_y);
        // Undo the rotation so the test happens against the axis-aligned box.
        let local = rotate_point(p, center, -self.rotation);
        let half_w = self.width * scale_x / 2.0 + tolerance;
        let half_h = self.height * scale_y / 2.0 + tolerance;
        (local.x - center.x).abs() <= half_w && (local.y - center.y).abs() <= half_h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_uses_scale() {
        let rect = DesignRectangle::new(10.0, 20.0, 40.0, 20.0);
        assert_eq!(rect.center(1.0, 1.0), Point::new(30.0, 30.0));
        assert_eq!(rect.center(2.0, 0.5), Point::new(50.0, 25.0));
    }

    #[test]
    fn test_contains_point_rotated() {
        let mut rect = DesignRectangle::new(0.0, 0.0, 100.0, 10.0);
        assert!(rect.contains_point(Point::new(90.0, 5.0), 1.0, 1.0, 0.0));

        rect.rotation = 90.0;
        // Box now spans vertically around (50, 5).
        assert!(!rect.contains_point(Point::new(90.0, 5.0), 1.0, 1.0, 0.0));
        assert!(rect.contains_point(Point::new(50.0, 45.0), 1.0, 1.0, 0.0));
    }

    #[test]
    fn test_set_center() {
        let mut rect = DesignRectangle::new(0.0, 0.0, 10.0, 10.0);
        rect.set_center(Point::new(50.0, 50.0), 1.0, 1.0);
        assert_eq!(rect.origin(), Point::new(45.0, 45.0));
    }
}
