//! # SceneMark
//!
//! Interactive 2D scene annotation over raster images: points, rectangles
//! and circles placed on a background, moved and resized under boundary
//! and lock constraints, with a magnifier loupe for pixel-accurate work.
//!
//! ## Architecture
//!
//! SceneMark is organized as a workspace with multiple crates:
//!
//! 1. **scenemark-core** - Identifiers, errors, constants and the event bus
//! 2. **scenemark-settings** - Loupe and editor preferences, JSON/TOML persistence
//! 3. **scenemark-editor** - Shapes, selection, transforms, constraints, magnifier, renderer
//! 4. **scenemark** - Binary that renders an annotated scene to a PNG
//!
//! ## Features
//!
//! - **Selection**: none/single/multi modes with group highlights
//! - **Transforms**: per-type resize and rotation handles, aspect lock for circles
//! - **Constraints**: drags clamped to the image, groups vetoed by locked members
//! - **Magnifier**: pointer-following or anchored loupe, one redraw per frame

pub use scenemark_core::{
    AppEvent, DragEvent, EditorError, Error, EventBus, EventFilter, MagnifierEvent, Result,
    SelectionEvent, SelectionMode, SettingsError, SettingsEvent, ShapeId, SurfaceId,
};

pub use scenemark_editor::{
    Bounds, ConstraintEngine, DragOutcome, Editor, FrameResult, HandlePosition, ImageBounds,
    LoupeAnchor, MagnifierHandle, MagnifierOverlay, Point, PointerAction, RenderSurface,
    SceneRenderer, SelectionManager, Shape, ShapeRegistry, ShapeStore, ShapeType,
    TransformController, Viewport,
};

pub use scenemark_settings::{
    default_config_path, Config, EditorSettings, LoupeSettings, SettingsManager,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
