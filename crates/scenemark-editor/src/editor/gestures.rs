//! Pointer and keyboard gestures.

use chrono::Utc;

use scenemark_core::{AppEvent, DragEvent, ShapeId};

use super::{Editor, HANDLE_TOLERANCE};
use crate::constraint_engine::{ConstraintEngine, DragOutcome, DragSummary};
use crate::model::Point;
use crate::shape_registry::HandlePosition;
use crate::transform_controller::{normalize_scale, HandleHit};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(super) enum PointerGesture {
    #[default]
    Idle,
    Drag,
    Resize {
        id: ShapeId,
        handle: HandlePosition,
        start: Point,
    },
    Rotate {
        id: ShapeId,
    },
}

impl PointerGesture {
    pub(super) fn involves(&self, id: ShapeId, constraints: &ConstraintEngine) -> bool {
        match self {
            PointerGesture::Idle => false,
            PointerGesture::Drag => constraints
                .session()
                .is_some_and(|s| s.origins.iter().any(|(other, _)| *other == id)),
            PointerGesture::Resize { id: target, .. } | PointerGesture::Rotate { id: target } => {
                *target == id
            }
        }
    }
}

/// What a pointer press started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    None,
    /// The selection changed but nothing is being dragged.
    Selected,
    DragStarted,
    ResizeStarted(HandlePosition),
    RotateStarted,
}

impl Editor {
    /// Pointer pressed at scene point `p`. `extend` toggles the shape under
    /// the pointer in and out of the selection (shift-click).
    pub fn pointer_down(&mut self, p: Point, extend: bool) -> PointerAction {
        if self.gesture != PointerGesture::Idle {
            return PointerAction::None;
        }

        if !extend {
            if let Some(action) = self.try_grab_handle(p) {
                return action;
            }
        }

        let Some(hit) = self.hit_test(p) else {
            if !extend {
                self.clear_selection();
            }
            return PointerAction::None;
        };

        if extend {
            self.toggle_selection(hit);
            return PointerAction::Selected;
        }
        if !self.selection.contains(hit) {
            self.set_selection(&[hit]);
        }

        let ids = self.selection.selected_ids().to_vec();
        if !self.constraints.begin_drag(p, &ids, &self.store) {
            return PointerAction::Selected;
        }
        self.gesture = PointerGesture::Drag;
        let _ = self.bus.publish(AppEvent::Drag(DragEvent::Started { ids }));
        PointerAction::DragStarted
    }

    fn try_grab_handle(&mut self, p: Point) -> Option<PointerAction> {
        let id = self.transform.attached_id()?;
        let obj = self.store.get(id)?;
        let hit = self.transform.handle_at(obj, p, HANDLE_TOLERANCE)?;
        if !self.transform.begin_transform(obj) {
            return None;
        }
        Some(match hit {
            HandleHit::Resize(handle) => {
                self.gesture = PointerGesture::Resize {
                    id,
                    handle,
                    start: p,
                };
                PointerAction::ResizeStarted(handle)
            }
            HandleHit::Rotate => {
                self.gesture = PointerGesture::Rotate { id };
                PointerAction::RotateStarted
            }
        })
    }

    /// Pointer moved to scene point `p`. Returns whether anything moved.
    pub fn pointer_move(&mut self, p: Point) -> bool {
        match self.gesture {
            PointerGesture::Idle => false,
            PointerGesture::Drag => self.drag_to(p),
            PointerGesture::Resize { id, handle, start } => {
                let Some(obj) = self.store.get_mut(id) else {
                    return false;
                };
                self.transform
                    .resize(obj, handle, p.x - start.x, p.y - start.y, self.background)
            }
            PointerGesture::Rotate { id } => {
                let Some(obj) = self.store.get_mut(id) else {
                    return false;
                };
                let center = obj.center();
                // The rotation handle sits above the center at 0 degrees.
                let angle = (p.y - center.y).atan2(p.x - center.x).to_degrees() + 90.0;
                self.transform.rotate(obj, angle)
            }
        }
    }

    fn drag_to(&mut self, p: Point) -> bool {
        let was_blocked = self.constraints.session().is_some_and(|s| s.blocked);
        match self.constraints.drag_move(p, &mut self.store, self.background) {
            DragOutcome::Moved { dx, dy, .. } => {
                let ids = self
                    .constraints
                    .session()
                    .map(|s| s.ids())
                    .unwrap_or_default();
                let _ = self.bus.publish(AppEvent::Drag(DragEvent::Moved { ids, dx, dy }));
                self.follow_anchor();
                true
            }
            DragOutcome::Blocked { locked_ids } => {
                if !was_blocked {
                    self.selection
                        .flag_locked_drag_blocked(locked_ids, Utc::now());
                    self.follow_anchor();
                }
                false
            }
            DragOutcome::Ignored => false,
        }
    }

    /// Pointer released. Returns the drag summary when a drag ended.
    pub fn pointer_up(&mut self) -> Option<DragSummary> {
        match std::mem::take(&mut self.gesture) {
            PointerGesture::Idle => None,
            PointerGesture::Drag => {
                let summary = self.constraints.end_drag()?;
                let _ = self.bus.publish(AppEvent::Drag(DragEvent::Ended {
                    ids: summary.ids.clone(),
                    dx: summary.dx,
                    dy: summary.dy,
                    blocked: summary.blocked,
                }));
                Some(summary)
            }
            PointerGesture::Resize { id, .. } | PointerGesture::Rotate { id } => {
                self.bake_transform(id);
                None
            }
        }
    }

    /// Ends a running resize or rotate, keeping what it did so far. Called
    /// before anything that can move the transform handles to another shape
    /// or withhold them.
    pub(super) fn settle_transform(&mut self) {
        if let PointerGesture::Resize { id, .. } | PointerGesture::Rotate { id } = self.gesture {
            self.gesture = PointerGesture::Idle;
            self.bake_transform(id);
        }
    }

    fn bake_transform(&mut self, id: ShapeId) {
        let Some(obj) = self.store.get_mut(id) else {
            return;
        };
        if !self.transform.transform_end(obj) {
            // Handles went away mid-gesture; the scale still has to land.
            normalize_scale(obj, self.settings.min_shape_size);
        }
        self.follow_anchor();
    }

    /// Abandons the running gesture and restores what it changed.
    pub fn cancel_gesture(&mut self) -> bool {
        let cancelled = match std::mem::take(&mut self.gesture) {
            PointerGesture::Idle => false,
            PointerGesture::Drag => self.constraints.cancel_drag(&mut self.store),
            PointerGesture::Resize { id, .. } | PointerGesture::Rotate { id } => self
                .store
                .get_mut(id)
                .is_some_and(|obj| self.transform.cancel_transform(obj)),
        };
        if cancelled {
            self.follow_anchor();
        }
        cancelled
    }

    /// Moves the selection by `(dx, dy)` scene units under the drag rules.
    pub fn nudge_selection(&mut self, dx: f64, dy: f64) -> DragOutcome {
        let ids = self.selection.selected_ids().to_vec();
        let outcome = self
            .constraints
            .nudge(&ids, dx, dy, &mut self.store, self.background);
        match &outcome {
            DragOutcome::Moved { .. } => self.follow_anchor(),
            DragOutcome::Blocked { locked_ids } => {
                self.selection
                    .flag_locked_drag_blocked(locked_ids.clone(), Utc::now());
            }
            DragOutcome::Ignored => {}
        }
        outcome
    }

    /// Nudges by whole steps of the configured nudge distance.
    pub fn nudge_steps(&mut self, steps_x: i32, steps_y: i32) -> DragOutcome {
        let step = self.settings.nudge_step;
        self.nudge_selection(steps_x as f64 * step, steps_y as f64 * step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ImageBounds;
    use crate::model::Shape;
    use scenemark_core::{EventBus, SelectionMode};
    use std::sync::Arc;

    fn editor() -> Editor {
        let mut editor = Editor::new(Arc::new(EventBus::new()));
        editor.set_background(Some(ImageBounds::new(400.0, 300.0)));
        editor
    }

    #[test]
    fn test_press_selects_and_drags() {
        let mut editor = editor();
        let id = editor.add_rectangle(10.0, 10.0, 40.0, 20.0);

        assert_eq!(
            editor.pointer_down(Point::new(20.0, 20.0), false),
            PointerAction::DragStarted
        );
        assert_eq!(editor.selection().selected_ids(), &[id]);
        assert!(editor.pointer_move(Point::new(50.0, 40.0)));

        let summary = editor.pointer_up().unwrap();
        assert_eq!((summary.dx, summary.dy), (30.0, 20.0));
        assert_eq!(editor.store().get(id).unwrap().origin(), Point::new(40.0, 30.0));
    }

    #[test]
    fn test_press_on_empty_space_clears_selection() {
        let mut editor = editor();
        let id = editor.add_point(Point::new(100.0, 100.0));
        editor.set_selection(&[id]);
        assert_eq!(
            editor.pointer_down(Point::new(300.0, 10.0), false),
            PointerAction::None
        );
        assert_eq!(editor.selection().mode(), SelectionMode::None);
    }

    #[test]
    fn test_extend_toggles_without_dragging() {
        let mut editor = editor();
        let a = editor.add_point(Point::new(20.0, 20.0));
        let b = editor.add_point(Point::new(80.0, 80.0));
        editor.pointer_down(Point::new(20.0, 20.0), true);
        editor.pointer_down(Point::new(80.0, 80.0), true);
        assert_eq!(editor.selection().selected_ids(), &[a, b]);
        assert!(!editor.constraints().is_dragging());
    }

    #[test]
    fn test_handle_drag_resizes() {
        let mut editor = editor();
        let id = editor.add_rectangle(100.0, 100.0, 40.0, 40.0);
        editor.set_selection(&[id]);

        assert_eq!(
            editor.pointer_down(Point::new(140.0, 140.0), false),
            PointerAction::ResizeStarted(HandlePosition::BottomRight)
        );
        editor.pointer_move(Point::new(160.0, 150.0));
        editor.pointer_up();

        let obj = editor.store().get(id).unwrap();
        let Shape::Rectangle(r) = &obj.shape else {
            panic!("expected rectangle");
        };
        assert!((r.width - 60.0).abs() < 1e-9);
        assert!((r.height - 50.0).abs() < 1e-9);
        assert_eq!(obj.origin(), Point::new(100.0, 100.0));
        assert_eq!((obj.scale_x, obj.scale_y), (1.0, 1.0));
    }

    fn rectangle_size(editor: &Editor, id: ShapeId) -> (f64, f64) {
        let obj = editor.store().get(id).unwrap();
        assert_eq!((obj.scale_x, obj.scale_y), (1.0, 1.0));
        let Shape::Rectangle(r) = &obj.shape else {
            panic!("expected rectangle");
        };
        (r.width, r.height)
    }

    #[test]
    fn test_locking_mid_resize_bakes_scale() {
        let mut editor = editor();
        let id = editor.add_rectangle(100.0, 100.0, 40.0, 40.0);
        editor.set_selection(&[id]);
        editor.pointer_down(Point::new(140.0, 140.0), false);
        editor.pointer_move(Point::new(160.0, 160.0));

        editor.set_locked(id, true).unwrap();
        assert!(!editor.transform().is_transforming());
        assert!(editor.pointer_up().is_none());

        let (w, h) = rectangle_size(&editor, id);
        assert!((w - 60.0).abs() < 1e-9);
        assert!((h - 60.0).abs() < 1e-9);
        assert!(!editor.pointer_move(Point::new(200.0, 200.0)));
    }

    #[test]
    fn test_selection_change_mid_resize_bakes_scale() {
        let mut editor = editor();
        let id = editor.add_rectangle(100.0, 100.0, 40.0, 40.0);
        let other = editor.add_point(Point::new(300.0, 200.0));
        editor.set_selection(&[id]);
        editor.pointer_down(Point::new(140.0, 140.0), false);
        editor.pointer_move(Point::new(150.0, 160.0));

        editor.set_selection(&[other]);
        editor.pointer_up();

        let (w, h) = rectangle_size(&editor, id);
        assert!((w - 50.0).abs() < 1e-9);
        assert!((h - 60.0).abs() < 1e-9);
        assert_eq!(editor.transform().attached_id(), Some(other));
    }

    #[test]
    fn test_rotation_handle_rotates() {
        let mut editor = editor();
        let id = editor.add_rectangle(100.0, 100.0, 40.0, 40.0);
        editor.set_selection(&[id]);

        assert_eq!(
            editor.pointer_down(Point::new(120.0, 76.0), false),
            PointerAction::RotateStarted
        );
        // Pointer to the right of the center: quarter turn clockwise.
        editor.pointer_move(Point::new(200.0, 120.0));
        editor.pointer_up();
        let rotation = editor.store().get(id).unwrap().shape.rotation();
        assert!((rotation - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_blocked_group_drag_flags_feedback() {
        let mut editor = editor();
        let a = editor.add_rectangle(10.0, 10.0, 20.0, 20.0);
        let b = editor.add_rectangle(100.0, 100.0, 20.0, 20.0);
        editor.set_locked(b, true).unwrap();
        editor.set_selection(&[a, b]);

        assert_eq!(
            editor.pointer_down(Point::new(15.0, 15.0), false),
            PointerAction::DragStarted
        );
        assert!(!editor.pointer_move(Point::new(40.0, 40.0)));
        assert!(editor.selection().is_feedback_active(Utc::now()));

        let summary = editor.pointer_up().unwrap();
        assert!(summary.blocked);
        assert_eq!(editor.store().get(a).unwrap().origin(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_cancel_gesture_restores_positions() {
        let mut editor = editor();
        let id = editor.add_circle(Point::new(50.0, 50.0), 10.0);
        editor.pointer_down(Point::new(50.0, 50.0), false);
        editor.pointer_move(Point::new(70.0, 90.0));
        assert!(editor.cancel_gesture());
        assert_eq!(editor.store().get(id).unwrap().origin(), Point::new(50.0, 50.0));
        assert!(editor.pointer_up().is_none());
    }

    #[test]
    fn test_nudge_steps_use_settings() {
        let mut editor = editor();
        let id = editor.add_point(Point::new(50.0, 50.0));
        editor.set_selection(&[id]);
        let mut settings = editor.settings().clone();
        settings.nudge_step = 10.0;
        editor.apply_settings(settings);

        editor.nudge_steps(1, -2);
        assert_eq!(editor.store().get(id).unwrap().origin(), Point::new(60.0, 30.0));
    }
}
