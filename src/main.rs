use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Utc;
use tracing::{info, warn};

use scenemark::{
    default_config_path, init_logging, Config, Editor, EventBus, LoupeSettings, Point,
    RenderSurface, SceneRenderer, SurfaceId, BUILD_DATE, VERSION,
};

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next().map(PathBuf::from) else {
        bail!("usage: scenemark <background.png> [output.png]");
    };
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| input.with_extension("annotated.png"));

    info!(version = VERSION, build = BUILD_DATE, "Starting SceneMark");

    let config = match default_config_path() {
        Ok(path) => Config::load_or_default(&path)?,
        Err(e) => {
            warn!("Using default settings: {}", e);
            Config::default()
        }
    };

    let background = image::open(&input)
        .with_context(|| format!("failed to open {}", input.display()))?
        .to_rgba8();
    let (width, height) = background.dimensions();

    let bus = Arc::new(EventBus::new());
    let mut editor = Editor::with_settings(bus, config.editor.clone());
    let mut renderer = SceneRenderer::new(SurfaceId(1), width, height, 1.0)?;
    let bounds = renderer.set_background(&background)?;
    editor.set_background(Some(bounds));

    // Demo annotations laid out relative to the image size.
    let (w, h) = (width as f64, height as f64);
    let marker = editor.add_point(Point::new(w * 0.5, h * 0.5));
    editor.set_label(marker, Some("center".to_string()))?;
    editor.add_rectangle(w * 0.1, h * 0.1, w * 0.25, h * 0.2);
    let circle = editor.add_circle(Point::new(w * 0.75, h * 0.7), w.min(h) * 0.1);
    editor.set_locked(circle, true)?;
    editor.set_selection(&[marker]);

    let loupe = LoupeSettings {
        enabled: true,
        ..config.loupe.clone()
    };
    editor.install_magnifier(renderer.surface_id(), &loupe);

    renderer.render(&editor, Utc::now());
    let frame = editor.on_animation_frame(&renderer);
    info!(?frame, "Magnifier frame");

    let layer = editor.magnifier().and_then(|overlay| overlay.layer());
    let snapshot = renderer.snapshot(layer)?;
    snapshot
        .save(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(path = %output.display(), shapes = editor.store().len(), "Wrote annotated scene");

    Ok(())
}
