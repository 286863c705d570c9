use std::sync::Arc;

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};

use scenemark_core::{EventBus, SurfaceId};
use scenemark_editor::{ConstraintEngine, Editor, ImageBounds, Point, SceneRenderer, ShapeStore};
use scenemark_settings::LoupeSettings;

fn bench_group_drag(c: &mut Criterion) {
    let mut store = ShapeStore::new();
    let ids: Vec<_> = (0..64)
        .map(|i| {
            let x = (i % 8) as f64 * 40.0;
            let y = (i / 8) as f64 * 40.0;
            store.add_rectangle(x, y, 30.0, 20.0)
        })
        .collect();
    let image = Some(ImageBounds::new(1920.0, 1080.0));

    c.bench_function("group_drag_64_shapes", |b| {
        b.iter(|| {
            let mut engine = ConstraintEngine::new();
            engine.begin_drag(Point::new(0.0, 0.0), &ids, &store);
            for step in 0..16 {
                let d = step as f64 * 150.0;
                engine.drag_move(black_box(Point::new(d, d)), &mut store, image);
            }
            engine.cancel_drag(&mut store);
        })
    });
}

fn bench_lens_redraw(c: &mut Criterion) {
    let mut renderer = SceneRenderer::new(SurfaceId(1), 800, 600, 2.0).expect("renderer");
    let background = RgbaImage::from_pixel(800, 600, Rgba([90, 90, 90, 255]));
    renderer.set_background(&background).expect("background");

    let mut editor = Editor::new(Arc::new(EventBus::new()));
    let settings = LoupeSettings {
        enabled: true,
        ..LoupeSettings::default()
    };
    editor.install_magnifier(SurfaceId(1), &settings);
    renderer.render(&editor, Utc::now());

    let mut x = 0.0;
    c.bench_function("lens_redraw_dpr2", |b| {
        b.iter(|| {
            x = (x + 7.0) % 800.0;
            editor.loupe_pointer_move(Point::new(x, 300.0));
            black_box(editor.on_animation_frame(&renderer));
        })
    });
}

criterion_group!(benches, bench_group_drag, bench_lens_redraw);
criterion_main!(benches);
