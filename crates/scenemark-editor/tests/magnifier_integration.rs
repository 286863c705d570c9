//! Magnifier driven by the editor over a real scene renderer.

use std::sync::Arc;

use chrono::Utc;
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;

use scenemark_core::{AppEvent, EventBus, EventCategory, EventFilter, MagnifierEvent, SurfaceId};
use scenemark_editor::{
    Editor, FrameResult, LoupeAnchor, Point, RenderSurface, SceneRenderer, ViewTransform,
};
use scenemark_settings::LoupeSettings;

fn loupe() -> LoupeSettings {
    LoupeSettings {
        enabled: true,
        size_px: 60.0,
        magnification: 2.0,
        offset_x: 0.0,
        offset_y: 0.0,
        ..LoupeSettings::default()
    }
}

fn scene() -> (Editor, SceneRenderer) {
    let mut renderer = SceneRenderer::new(SurfaceId(1), 200, 200, 1.0).unwrap();
    let background = RgbaImage::from_pixel(200, 200, Rgba([30, 120, 60, 255]));
    let bounds = renderer.set_background(&background).unwrap();

    let mut editor = Editor::new(Arc::new(EventBus::new()));
    editor.set_background(Some(bounds));
    (editor, renderer)
}

#[test]
fn test_anchored_lens_hides_after_deselect() {
    let (mut editor, mut renderer) = scene();
    let point = editor.add_point(Point::new(80.0, 80.0));
    editor.install_magnifier(SurfaceId(1), &loupe());
    editor.set_selection(&[point]);

    assert_eq!(
        editor.magnifier().unwrap().state().anchor,
        LoupeAnchor::Shape {
            id: point,
            center: Point::new(80.0, 80.0)
        }
    );

    renderer.render(&editor, Utc::now());
    let FrameResult::Drawn(frame) = editor.on_animation_frame(&renderer) else {
        panic!("expected a drawn lens");
    };
    assert_eq!(frame.sample_center, Point::new(80.0, 80.0));

    editor.clear_selection();
    renderer.render(&editor, Utc::now());
    assert_eq!(editor.on_animation_frame(&renderer), FrameResult::Hidden);
}

#[test]
fn test_anchored_lens_hides_after_shape_deleted() {
    let (mut editor, mut renderer) = scene();
    let point = editor.add_point(Point::new(120.0, 40.0));
    let other = editor.add_point(Point::new(20.0, 20.0));
    editor.install_magnifier(SurfaceId(1), &loupe());
    editor.set_selection(&[point]);

    renderer.render(&editor, Utc::now());
    assert!(matches!(
        editor.on_animation_frame(&renderer),
        FrameResult::Drawn(_)
    ));

    assert!(editor.remove_shape(point).is_some());
    assert!(editor.store().get(other).is_some());
    renderer.render(&editor, Utc::now());
    assert_eq!(editor.on_animation_frame(&renderer), FrameResult::Hidden);
    assert_eq!(editor.on_animation_frame(&renderer), FrameResult::Idle);
}

#[test]
fn test_lens_follows_dragged_anchor() {
    let (mut editor, mut renderer) = scene();
    let point = editor.add_point(Point::new(50.0, 50.0));
    editor.install_magnifier(SurfaceId(1), &loupe());
    editor.set_selection(&[point]);

    editor.pointer_down(Point::new(50.0, 50.0), false);
    editor.pointer_move(Point::new(70.0, 60.0));
    editor.pointer_up();

    renderer.render(&editor, Utc::now());
    let FrameResult::Drawn(frame) = editor.on_animation_frame(&renderer) else {
        panic!("expected a drawn lens");
    };
    assert_eq!(frame.sample_center, Point::new(70.0, 60.0));
}

#[test]
fn test_anchor_projects_through_viewport() {
    let (mut editor, mut renderer) = scene();
    renderer.viewport_mut().set_zoom(2.0);
    renderer.viewport_mut().set_pan(-40.0, -20.0);

    editor.install_magnifier(SurfaceId(1), &loupe());
    editor.magnifier_mut().unwrap().set_anchor_point(50.0, 30.0);

    renderer.render(&editor, Utc::now());
    let FrameResult::Drawn(frame) = editor.on_animation_frame(&renderer) else {
        panic!("expected a drawn lens");
    };
    assert_eq!(frame.sample_center, Point::new(60.0, 40.0));
}

#[test]
fn test_lens_layer_composites_into_snapshot() {
    let (mut editor, mut renderer) = scene();
    editor.install_magnifier(SurfaceId(1), &loupe());
    editor.loupe_pointer_move(Point::new(100.0, 100.0));

    renderer.render(&editor, Utc::now());
    assert!(matches!(
        editor.on_animation_frame(&renderer),
        FrameResult::Drawn(_)
    ));

    let layer = editor.magnifier().unwrap().layer().unwrap();
    let plain = renderer.snapshot(None).unwrap();
    let composed = renderer.snapshot(Some(layer)).unwrap();
    assert_eq!(composed.dimensions(), (200, 200));

    // Corners are outside the lens and untouched.
    assert_eq!(composed.get_pixel(0, 0), plain.get_pixel(0, 0));
    // The lens rim is drawn over the background.
    assert_ne!(composed.get_pixel(100, 70), plain.get_pixel(100, 70));
}

#[test]
fn test_redraws_coalesce_per_frame() {
    let (mut editor, mut renderer) = scene();
    editor.install_magnifier(SurfaceId(1), &loupe());
    renderer.render(&editor, Utc::now());
    editor.on_animation_frame(&renderer);

    for i in 0..10 {
        editor.loupe_pointer_move(Point::new(50.0 + i as f64, 50.0));
    }
    let drawn_before = editor.magnifier().unwrap().draw_count();
    assert!(matches!(
        editor.on_animation_frame(&renderer),
        FrameResult::Drawn(_)
    ));
    assert_eq!(editor.on_animation_frame(&renderer), FrameResult::Idle);
    assert_eq!(editor.magnifier().unwrap().draw_count(), drawn_before + 1);
}

#[test]
fn test_frame_for_other_surface_is_ignored() {
    let (mut editor, renderer) = scene();
    editor.install_magnifier(SurfaceId(9), &loupe());
    assert_eq!(editor.on_animation_frame(&renderer), FrameResult::Idle);
    assert!(editor.magnifier().unwrap().is_redraw_pending());
}

struct PixelsOnly {
    inner: SceneRenderer,
}

impl RenderSurface for PixelsOnly {
    fn surface_id(&self) -> SurfaceId {
        self.inner.surface_id()
    }

    fn logical_size(&self) -> (f32, f32) {
        self.inner.logical_size()
    }

    fn pixel_buffer(&self) -> Option<tiny_skia::PixmapRef<'_>> {
        self.inner.pixel_buffer()
    }

    fn view_transform(&self) -> Option<ViewTransform> {
        None
    }
}

#[test]
fn test_missing_view_transform_degrades_once() {
    let (mut editor, renderer) = scene();
    let degraded = Arc::new(Mutex::new(0usize));
    let sink = degraded.clone();
    editor.bus().subscribe(
        EventFilter::Categories(vec![EventCategory::Magnifier]),
        move |event| {
            if matches!(event, AppEvent::Magnifier(MagnifierEvent::Degraded { .. })) {
                *sink.lock() += 1;
            }
        },
    );

    let surface = PixelsOnly { inner: renderer };
    editor.install_magnifier(SurfaceId(1), &loupe());
    editor.magnifier_mut().unwrap().set_anchor_point(40.0, 40.0);

    // No pointer yet: nothing to fall back to.
    assert_eq!(editor.on_animation_frame(&surface), FrameResult::Hidden);

    editor.loupe_pointer_move(Point::new(30.0, 30.0));
    let FrameResult::Drawn(frame) = editor.on_animation_frame(&surface) else {
        panic!("expected the pointer fallback to draw");
    };
    assert_eq!(frame.sample_center, Point::new(30.0, 30.0));

    editor.loupe_pointer_move(Point::new(35.0, 30.0));
    editor.on_animation_frame(&surface);
    assert_eq!(*degraded.lock(), 1);
}
