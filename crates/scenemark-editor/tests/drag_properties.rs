//! Property tests for the drag constraints and selection rules.

use std::sync::Arc;

use proptest::prelude::*;

use scenemark_core::{EventBus, SelectionMode, ShapeId};
use scenemark_editor::{
    group_bounds, shape_bounds, ConstraintEngine, DragOutcome, Editor, ImageBounds, Point,
    ShapeRegistry, ShapeStore,
};

const IMAGE_W: f64 = 400.0;
const IMAGE_H: f64 = 300.0;
// Rotated rectangle bounds go through f32.
const EPS: f64 = 1e-3;

fn rect_strategy() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (0.0..300.0f64, 0.0..200.0f64, 1.0..100.0f64, 1.0..100.0f64)
}

/// Shape kind, placement and rotation in degrees.
type ShapeSpec = (u8, (f64, f64, f64, f64), f64);

fn shape_strategy() -> impl Strategy<Value = ShapeSpec> {
    (0u8..3, rect_strategy(), -180.0..180.0f64)
}

fn add_shape(store: &mut ShapeStore, (kind, (x, y, w, h), rotation): ShapeSpec) -> ShapeId {
    let id = match kind {
        0 => store.add_point(Point::new(x, y)),
        1 => store.add_rectangle(x, y, w, h),
        _ => store.add_circle(Point::new(x, y), w / 2.0),
    };
    if let Some(obj) = store.get_mut(id) {
        obj.shape.set_rotation(rotation);
    }
    id
}

fn delta_strategy() -> impl Strategy<Value = (f64, f64)> {
    (-1000.0..1000.0f64, -1000.0..1000.0f64)
}

proptest! {
    #[test]
    fn single_drag_stays_inside_image(
        spec in shape_strategy(),
        (dx, dy) in delta_strategy(),
    ) {
        let mut store = ShapeStore::new();
        let id = add_shape(&mut store, spec);
        let image = ImageBounds::new(IMAGE_W, IMAGE_H);

        let mut engine = ConstraintEngine::new();
        prop_assert!(engine.begin_drag(Point::new(0.0, 0.0), &[id], &store));
        engine.drag_move(Point::new(dx, dy), &mut store, Some(image));

        let bounds = shape_bounds(store.get(id).unwrap()).unwrap();
        prop_assert!(image.bounds().contains_bounds(&bounds, EPS));
    }

    #[test]
    fn group_hull_fits_or_sits_on_near_edge(
        specs in prop::collection::vec(shape_strategy(), 2..5),
        (dx, dy) in delta_strategy(),
    ) {
        let mut store = ShapeStore::new();
        let ids: Vec<_> = specs.iter().map(|&spec| add_shape(&mut store, spec)).collect();
        let image = ImageBounds::new(IMAGE_W, IMAGE_H);

        let mut engine = ConstraintEngine::new();
        engine.begin_drag(Point::new(0.0, 0.0), &ids, &store);
        engine.drag_move(Point::new(dx, dy), &mut store, Some(image));

        let hull = group_bounds(ids.iter().filter_map(|id| store.get(*id))).unwrap();
        if hull.width() <= IMAGE_W {
            prop_assert!(hull.min_x >= -EPS && hull.max_x <= IMAGE_W + EPS);
        } else {
            prop_assert!(hull.min_x.abs() < EPS);
        }
        if hull.height() <= IMAGE_H {
            prop_assert!(hull.min_y >= -EPS && hull.max_y <= IMAGE_H + EPS);
        } else {
            prop_assert!(hull.min_y.abs() < EPS);
        }
    }

    #[test]
    fn group_with_locked_member_never_moves(
        specs in prop::collection::vec(shape_strategy(), 2..5),
        locked_index in 0usize..5,
        moves in prop::collection::vec(delta_strategy(), 1..4),
    ) {
        let mut store = ShapeStore::new();
        let ids: Vec<_> = specs.iter().map(|&spec| add_shape(&mut store, spec)).collect();
        let locked = ids[locked_index % ids.len()];
        store.get_mut(locked).unwrap().locked = true;
        let before: Vec<Point> = ids.iter().map(|id| store.get(*id).unwrap().origin()).collect();

        let mut engine = ConstraintEngine::new();
        prop_assert!(engine.begin_drag(Point::new(0.0, 0.0), &ids, &store));
        for (dx, dy) in moves {
            let outcome = engine.drag_move(Point::new(dx, dy), &mut store, None);
            let is_blocked = matches!(outcome, DragOutcome::Blocked { .. });
            prop_assert!(is_blocked);
        }

        let after: Vec<Point> = ids.iter().map(|id| store.get(*id).unwrap().origin()).collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn selection_mode_follows_count(picks in prop::collection::vec(0usize..6, 0..8)) {
        let mut editor = Editor::new(Arc::new(EventBus::new()));
        let ids: Vec<_> = (0..6)
            .map(|i| editor.add_point(Point::new(i as f64 * 20.0, 10.0)))
            .collect();
        let chosen: Vec<_> = picks.iter().map(|&i| ids[i]).collect();

        let mode = editor.set_selection(&chosen);
        let count = editor.selection().len();
        prop_assert_eq!(mode, SelectionMode::from_count(count));
        prop_assert_eq!(editor.transform().is_attached(), count == 1);
    }

    #[test]
    fn locked_shapes_have_no_handles(
        (x, y, w, h) in rect_strategy(),
        kind in 0u8..3,
    ) {
        let mut store = ShapeStore::new();
        let id = match kind {
            0 => store.add_point(Point::new(x, y)),
            1 => store.add_rectangle(x, y, w, h),
            _ => store.add_circle(Point::new(x, y), w),
        };
        store.get_mut(id).unwrap().locked = true;

        let registry = ShapeRegistry::new();
        let handles = registry.handle_set(store.get(id).unwrap()).unwrap();
        prop_assert!(handles.is_empty());
        prop_assert!(!handles.rotate_enabled);
    }

    #[test]
    fn reinstalling_magnifier_keeps_one_overlay(installs in 1usize..5) {
        let mut editor = Editor::new(Arc::new(EventBus::new()));
        let settings = scenemark_settings::LoupeSettings::default();
        let mut handles = Vec::new();
        for i in 0..installs {
            handles.push(editor.install_magnifier(scenemark_core::SurfaceId(i as u32 % 2), &settings));
        }

        let latest = *handles.last().unwrap();
        for stale in &handles[..handles.len() - 1] {
            prop_assert!(!editor.detach_magnifier(*stale));
        }
        prop_assert!(editor.detach_magnifier(latest));
        prop_assert!(!editor.detach_magnifier(latest));
        prop_assert!(editor.magnifier().is_none());
    }
}
