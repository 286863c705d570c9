//! Defaults shared between the settings layer and the editor.

/// Default lens diameter in logical pixels.
pub const DEFAULT_LOUPE_SIZE_PX: f32 = 160.0;

/// Default lens magnification factor.
pub const DEFAULT_LOUPE_MAGNIFICATION: f32 = 3.0;

/// Largest magnification the lens accepts.
pub const MAX_LOUPE_MAGNIFICATION: f32 = 32.0;

/// Smallest lens diameter in logical pixels.
pub const MIN_LOUPE_SIZE_PX: f32 = 16.0;

/// Default lens offset from the sampled point, logical pixels.
pub const DEFAULT_LOUPE_OFFSET: (f32, f32) = (24.0, -24.0);

/// How long the "locked drag blocked" highlight stays up.
pub const LOCKED_FEEDBACK_MS: i64 = 1000;

/// Padding between a shape's bounds and its multi-select outline.
pub const HIGHLIGHT_PADDING: f64 = 4.0;

/// Default keyboard nudge distance in scene units.
pub const NUDGE_STEP: f64 = 1.0;

/// Smallest width, height or radius a transform may leave behind.
pub const MIN_SHAPE_SIZE: f64 = 1.0;
