//! Storage for annotation shapes.
//!
//! `ShapeStore` owns every [`DrawingObject`] by id and remembers the order
//! they were created in, which is also the draw order. Hit testing walks
//! that order backwards so the topmost shape wins.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use scenemark_core::ShapeId;

use crate::model::{
    DesignCircle, DesignPoint, DesignRectangle, DesignerShape, Point, Shape, ShapeType,
};

/// An annotation placed on the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingObject {
    pub id: ShapeId,
    pub shape: Shape,
    /// Transient horizontal scale; 1.0 outside a transform gesture.
    pub scale_x: f64,
    /// Transient vertical scale; 1.0 outside a transform gesture.
    pub scale_y: f64,
    pub locked: bool,
    pub label: Option<String>,
}

impl DrawingObject {
    pub fn new(id: ShapeId, shape: Shape) -> Self {
        Self {
            id,
            shape,
            scale_x: 1.0,
            scale_y: 1.0,
            locked: false,
            label: None,
        }
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape.shape_type()
    }

    pub fn origin(&self) -> Point {
        self.shape.origin()
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.shape.set_origin(origin);
    }

    /// Center including any in-flight scale.
    pub fn center(&self) -> Point {
        self.shape.center(self.scale_x, self.scale_y)
    }

    pub fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        self.shape.has_geometry()
            && self
                .shape
                .contains_point(p, self.scale_x, self.scale_y, tolerance)
    }

    pub fn has_pending_scale(&self) -> bool {
        self.scale_x != 1.0 || self.scale_y != 1.0
    }

    pub fn display_name(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{} {}", self.shape_type(), self.id),
        }
    }
}

/// Shapes keyed by id, plus the draw order.
#[derive(Debug, Clone, Default)]
pub struct ShapeStore {
    shapes: HashMap<ShapeId, DrawingObject>,
    draw_order: Vec<ShapeId>,
    next_id: ShapeId,
}

impl ShapeStore {
    pub fn new() -> Self {
        Self {
            shapes: HashMap::new(),
            draw_order: Vec::new(),
            next_id: 1,
        }
    }

    /// Hands out the next unused id. Ids are never reused.
    pub fn generate_id(&mut self) -> ShapeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Wraps `shape` in a fresh object and stores it on top.
    pub fn add(&mut self, shape: Shape) -> ShapeId {
        let id = self.generate_id();
        self.insert(DrawingObject::new(id, shape));
        id
    }

    pub fn add_point(&mut self, position: Point) -> ShapeId {
        self.add(Shape::Point(DesignPoint::new(position)))
    }

    pub fn add_rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) -> ShapeId {
        self.add(Shape::Rectangle(DesignRectangle::new(x, y, width, height)))
    }

    pub fn add_circle(&mut self, center: Point, radius: f64) -> ShapeId {
        self.add(Shape::Circle(DesignCircle::new(center, radius)))
    }

    /// Inserts or replaces an object. A replaced object keeps its place in
    /// the draw order.
    pub fn insert(&mut self, obj: DrawingObject) {
        let id = obj.id;
        if self.next_id <= id {
            self.next_id = id + 1;
        }
        if self.shapes.insert(id, obj).is_none() {
            self.draw_order.push(id);
        }
    }

    pub fn remove(&mut self, id: ShapeId) -> Option<DrawingObject> {
        let removed = self.shapes.remove(&id)?;
        self.draw_order.retain(|&other| other != id);
        Some(removed)
    }

    pub fn get(&self, id: ShapeId) -> Option<&DrawingObject> {
        self.shapes.get(&id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut DrawingObject> {
        self.shapes.get_mut(&id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn ids(&self) -> &[ShapeId] {
        &self.draw_order
    }

    /// Objects in draw order, bottom first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DrawingObject> + '_ {
        self.draw_order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Topmost shape under `p`.
    pub fn hit_test(&self, p: Point, tolerance: f64) -> Option<ShapeId> {
        self.iter()
            .rev()
            .find(|obj| obj.contains_point(p, tolerance))
            .map(|obj| obj.id)
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.draw_order.clear();
    }
}
