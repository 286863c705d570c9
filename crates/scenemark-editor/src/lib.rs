//! # SceneMark Editor
//!
//! Interactive annotation editing over a raster background: selection,
//! handle-based transforms, boundary and lock constraints while dragging,
//! and a magnifier loupe drawn over the rendered scene.
//!
//! ## Architecture
//!
//! ```text
//! Editor (composition root, pointer gestures)
//!   ├── ShapeStore        (drawing objects, draw order)
//!   ├── ShapeRegistry     (per-type handle and loupe policy)
//!   ├── SelectionManager  (mode, highlights, locked feedback)
//!   ├── TransformController (resize/rotate handles)
//!   ├── ConstraintEngine  (drag clamping, lock veto)
//!   └── MagnifierOverlay  (loupe over a RenderSurface)
//!
//! SceneRenderer (tiny-skia RenderSurface, Viewport mapping)
//! ```
//!
//! Components never hold references to each other. The [`Editor`] passes
//! what each call needs, and notifications travel over the
//! [`scenemark_core::EventBus`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scenemark_core::EventBus;
//! use scenemark_editor::{Editor, Point};
//!
//! let mut editor = Editor::new(Arc::new(EventBus::new()));
//! let id = editor.add_rectangle(10.0, 10.0, 40.0, 20.0);
//! editor.pointer_down(Point::new(20.0, 20.0), false);
//! editor.pointer_move(Point::new(30.0, 25.0));
//! editor.pointer_up();
//! ```

pub mod constraint_engine;
pub mod editor;
pub mod geometry;
pub mod magnifier;
pub mod model;
pub mod renderer;
pub mod selection_manager;
pub mod shape_registry;
pub mod shape_store;
pub mod transform_controller;
pub mod viewport;

pub use constraint_engine::{clamp_delta, ConstraintEngine, DragOutcome, DragSession, DragSummary};
pub use editor::{Editor, PointerAction, HANDLE_TOLERANCE, HIT_TOLERANCE};
pub use geometry::{group_bounds, shape_bounds, Bounds, ImageBounds};
pub use magnifier::{
    lens_frame, FrameResult, FrameScheduler, LensFrame, LoupeAnchor, LoupeState, MagnifierHandle,
    MagnifierOverlay, RenderSurface, SourceRect,
};
pub use model::{
    DesignCircle, DesignPoint, DesignRectangle, DesignerShape, Point, Shape, ShapeType,
};
pub use renderer::{pixmap_to_rgba, rgba_to_pixmap, SceneRenderer};
pub use selection_manager::{Highlight, HighlightColor, SelectionManager};
pub use shape_registry::{HandlePosition, ShapePolicy, ShapeRegistry, TransformHandleSet};
pub use shape_store::{DrawingObject, ShapeStore};
pub use transform_controller::{normalize_scale, HandleHit, TransformController};
pub use viewport::{ViewTransform, Viewport};
