//! End-to-end editing scenarios driven through the pointer API.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use scenemark_core::{
    AppEvent, DragEvent, EventBus, EventCategory, EventFilter, SelectionEvent, SelectionMode,
};
use scenemark_editor::{
    shape_bounds, DragOutcome, Editor, HandlePosition, ImageBounds, Point, PointerAction,
};

fn editor_on_image(width: f64, height: f64) -> Editor {
    let mut editor = Editor::new(Arc::new(EventBus::new()));
    editor.set_background(Some(ImageBounds::new(width, height)));
    editor
}

fn record(bus: &EventBus, category: EventCategory) -> Arc<Mutex<Vec<AppEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    bus.subscribe(EventFilter::Categories(vec![category]), move |event| {
        sink.lock().push(event)
    });
    events
}

#[test]
fn test_group_with_locked_member_does_not_move() {
    let mut editor = editor_on_image(1000.0, 1000.0);
    let a = editor.add_rectangle(100.0, 100.0, 80.0, 48.0);
    let b = editor.add_circle(Point::new(300.0, 300.0), 24.0);
    editor.set_locked(b, true).unwrap();
    editor.set_selection(&[a, b]);
    assert_eq!(editor.selection().mode(), SelectionMode::Multi);

    let drags = record(editor.bus(), EventCategory::Drag);
    assert_eq!(
        editor.pointer_down(Point::new(120.0, 120.0), false),
        PointerAction::DragStarted
    );
    editor.pointer_move(Point::new(170.0, 170.0));
    let summary = editor.pointer_up().unwrap();

    assert!(summary.blocked);
    assert_eq!(editor.store().get(a).unwrap().origin(), Point::new(100.0, 100.0));
    assert_eq!(editor.store().get(b).unwrap().origin(), Point::new(300.0, 300.0));

    let drags = drags.lock();
    assert!(matches!(drags.first(), Some(AppEvent::Drag(DragEvent::Started { .. }))));
    assert!(matches!(
        drags.last(),
        Some(AppEvent::Drag(DragEvent::Ended { blocked: true, .. }))
    ));
    assert!(!drags
        .iter()
        .any(|e| matches!(e, AppEvent::Drag(DragEvent::Moved { .. }))));
}

#[test]
fn test_blocked_drag_reports_locked_members_once() {
    let mut editor = editor_on_image(1000.0, 1000.0);
    let a = editor.add_rectangle(100.0, 100.0, 80.0, 48.0);
    let b = editor.add_circle(Point::new(300.0, 300.0), 24.0);
    editor.set_locked(b, true).unwrap();
    editor.set_selection(&[a, b]);

    let selection_events = record(editor.bus(), EventCategory::Selection);
    editor.pointer_down(Point::new(120.0, 120.0), false);
    editor.pointer_move(Point::new(150.0, 150.0));
    editor.pointer_move(Point::new(180.0, 180.0));
    editor.pointer_up();

    let blocked: Vec<_> = selection_events
        .lock()
        .iter()
        .filter_map(|e| match e {
            AppEvent::Selection(SelectionEvent::LockedDragBlocked { locked_ids }) => {
                Some(locked_ids.clone())
            }
            _ => None,
        })
        .collect();
    assert_eq!(blocked, vec![vec![b]]);

    // The blocked feedback colours the multi-selection highlights.
    let decorations = editor.selection().decorations(editor.store(), Utc::now());
    assert_eq!(decorations.len(), 2);
}

#[test]
fn test_circle_dragged_off_image_stops_at_corner() {
    let mut editor = editor_on_image(200.0, 200.0);
    let id = editor.add_circle(Point::new(10.0, 10.0), 24.0);

    editor.pointer_down(Point::new(10.0, 10.0), false);
    editor.pointer_move(Point::new(-100.0, -100.0));
    editor.pointer_up();

    let obj = editor.store().get(id).unwrap();
    let bounds = shape_bounds(obj).unwrap();
    assert_eq!((bounds.min_x, bounds.min_y), (0.0, 0.0));
    assert_eq!(obj.center(), Point::new(24.0, 24.0));
}

#[test]
fn test_single_selection_shows_handles_multi_hides_them() {
    let mut editor = editor_on_image(500.0, 500.0);
    let a = editor.add_rectangle(10.0, 10.0, 50.0, 50.0);
    let b = editor.add_circle(Point::new(200.0, 200.0), 30.0);

    editor.set_selection(&[a]);
    assert_eq!(editor.transform().visible_handles().len(), 8);
    assert!(editor.transform().rotate_visible());

    editor.set_selection(&[b]);
    assert_eq!(editor.transform().visible_handles().len(), 4);
    assert!(editor.transform().keep_ratio());
    assert!(!editor.transform().rotate_visible());

    editor.set_selection(&[a, b]);
    assert!(!editor.transform().is_attached());
    assert!(editor.transform().visible_handles().is_empty());
}

#[test]
fn test_circle_resize_keeps_ratio() {
    let mut editor = editor_on_image(500.0, 500.0);
    let id = editor.add_circle(Point::new(100.0, 100.0), 20.0);
    editor.set_selection(&[id]);

    assert_eq!(
        editor.pointer_down(Point::new(120.0, 120.0), false),
        PointerAction::ResizeStarted(HandlePosition::BottomRight)
    );
    // Non-uniform pull: the smaller factor wins.
    editor.pointer_move(Point::new(140.0, 130.0));
    editor.pointer_up();

    let bounds = shape_bounds(editor.store().get(id).unwrap()).unwrap();
    assert!((bounds.width() - bounds.height()).abs() < 1e-9);
    assert!((bounds.width() - 50.0).abs() < 1e-9);
}

#[test]
fn test_resize_past_image_edge_is_rejected() {
    let mut editor = editor_on_image(200.0, 200.0);
    let id = editor.add_rectangle(100.0, 100.0, 50.0, 50.0);
    editor.set_selection(&[id]);

    editor.pointer_down(Point::new(150.0, 150.0), false);
    assert!(editor.pointer_move(Point::new(180.0, 180.0)));
    assert!(!editor.pointer_move(Point::new(260.0, 260.0)));
    editor.pointer_up();

    let bounds = shape_bounds(editor.store().get(id).unwrap()).unwrap();
    assert!((bounds.max_x - 180.0).abs() < 1e-9);
    assert!((bounds.max_y - 180.0).abs() < 1e-9);
}

#[test]
fn test_locked_shape_ignores_handles_and_drag() {
    let mut editor = editor_on_image(500.0, 500.0);
    let id = editor.add_rectangle(10.0, 10.0, 50.0, 50.0);
    editor.set_locked(id, true).unwrap();

    assert_eq!(
        editor.pointer_down(Point::new(30.0, 30.0), false),
        PointerAction::Selected
    );
    assert_eq!(editor.selection().selected_ids(), &[id]);
    assert!(!editor.transform().is_attached());
    assert!(!editor.pointer_move(Point::new(60.0, 60.0)));
    assert_eq!(editor.store().get(id).unwrap().origin(), Point::new(10.0, 10.0));

    assert!(matches!(
        editor.nudge_selection(5.0, 0.0),
        DragOutcome::Blocked { .. }
    ));
}

#[test]
fn test_nudge_clamps_at_edge() {
    let mut editor = editor_on_image(100.0, 100.0);
    let id = editor.add_rectangle(85.0, 10.0, 10.0, 10.0);
    editor.set_selection(&[id]);

    let outcome = editor.nudge_selection(20.0, 0.0);
    assert_eq!(
        outcome,
        DragOutcome::Moved {
            dx: 5.0,
            dy: 0.0,
            clamped: true
        }
    );
    assert_eq!(editor.store().get(id).unwrap().origin(), Point::new(90.0, 10.0));
}

#[test]
fn test_selection_events_follow_mode() {
    let mut editor = editor_on_image(500.0, 500.0);
    let a = editor.add_point(Point::new(10.0, 10.0));
    let b = editor.add_point(Point::new(50.0, 50.0));
    let events = record(editor.bus(), EventCategory::Selection);

    editor.set_selection(&[a]);
    editor.toggle_selection(b);
    editor.clear_selection();

    let modes: Vec<SelectionMode> = events
        .lock()
        .iter()
        .filter_map(|e| match e {
            AppEvent::Selection(SelectionEvent::Changed { mode, .. }) => Some(*mode),
            _ => None,
        })
        .collect();
    assert_eq!(
        modes,
        vec![SelectionMode::Single, SelectionMode::Multi, SelectionMode::None]
    );
}
