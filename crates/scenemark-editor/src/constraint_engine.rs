//! Drag state machine with lock veto and boundary clamping.
//!
//! A drag moves one shape or a group. Each pointer move is turned into a
//! delta from the drag origin, which is then
//!
//! - vetoed when any member of the group is locked (everything goes back
//!   to its last legal position and the rest of the gesture is frozen),
//! - clamped so the hull of the moving shapes stays inside the background
//!   image.
//!
//! Clamping runs at most [`CLAMP_PASSES`] times per event. A far-edge
//! overflow pulls the delta back first; a near-edge underflow then pushes
//! it forward, so a hull larger than the image ends up flush with the
//! near edge.

use tracing::{debug, warn};

use scenemark_core::ShapeId;

use crate::geometry::{shape_bounds, Bounds, ImageBounds};
use crate::model::Point;
use crate::shape_store::ShapeStore;

/// Clamp checks per move event.
pub const CLAMP_PASSES: usize = 2;

/// State of an active drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub pointer_origin: Point,
    /// Position of every moving shape when the drag started.
    pub origins: Vec<(ShapeId, Point)>,
    /// Last applied (clamped) delta.
    pub dx: f64,
    pub dy: f64,
    pub blocked: bool,
}

impl DragSession {
    pub fn ids(&self) -> Vec<ShapeId> {
        self.origins.iter().map(|(id, _)| *id).collect()
    }
}

/// Result of a move or nudge.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// No drag in progress, or nothing to move.
    Ignored,
    /// Shapes moved by `(dx, dy)`; `clamped` when the request was adjusted.
    Moved { dx: f64, dy: f64, clamped: bool },
    /// A locked member vetoed the move.
    Blocked { locked_ids: Vec<ShapeId> },
}

/// Summary returned when a drag ends.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSummary {
    pub ids: Vec<ShapeId>,
    pub dx: f64,
    pub dy: f64,
    pub blocked: bool,
}

#[derive(Debug, Default)]
pub struct ConstraintEngine {
    session: Option<DragSession>,
}

impl ConstraintEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Starts a drag of `ids` at `pointer`.
    ///
    /// Refused when a drag is already running, when an id is unknown, when
    /// a single target is locked, or when every member of a group is
    /// locked.
    pub fn begin_drag(&mut self, pointer: Point, ids: &[ShapeId], store: &ShapeStore) -> bool {
        if self.session.is_some() || ids.is_empty() {
            return false;
        }

        let mut origins: Vec<(ShapeId, Point)> = Vec::with_capacity(ids.len());
        for &id in ids {
            if origins.iter().any(|(other, _)| *other == id) {
                continue;
            }
            let Some(obj) = store.get(id) else {
                debug!(shape = id, "Drag refused, shape not in store");
                return false;
            };
            origins.push((id, obj.origin()));
        }

        let locked = origins
            .iter()
            .filter(|(id, _)| store.get(*id).is_some_and(|obj| obj.locked))
            .count();
        if locked == origins.len() {
            debug!(count = origins.len(), "Drag refused, all targets locked");
            return false;
        }

        self.session = Some(DragSession {
            pointer_origin: pointer,
            origins,
            dx: 0.0,
            dy: 0.0,
            blocked: false,
        });
        true
    }

    /// Moves the dragged shapes toward `pointer`.
    pub fn drag_move(
        &mut self,
        pointer: Point,
        store: &mut ShapeStore,
        image: Option<ImageBounds>,
    ) -> DragOutcome {
        let Some(session) = self.session.as_mut() else {
            return DragOutcome::Ignored;
        };

        let locked_ids = locked_members(&session.origins, store);
        if session.blocked {
            return DragOutcome::Blocked { locked_ids };
        }
        if !locked_ids.is_empty() {
            apply_delta(&session.origins, session.dx, session.dy, store);
            session.blocked = true;
            debug!(locked = ?locked_ids, "Group drag vetoed by locked members");
            return DragOutcome::Blocked { locked_ids };
        }

        let requested = (
            pointer.x - session.pointer_origin.x,
            pointer.y - session.pointer_origin.y,
        );
        let (dx, dy) = constrain(&session.origins, requested, store, image);
        apply_delta(&session.origins, dx, dy, store);
        session.dx = dx;
        session.dy = dy;

        DragOutcome::Moved {
            dx,
            dy,
            clamped: (dx, dy) != requested,
        }
    }

    /// Finishes the drag, leaving shapes where they are.
    pub fn end_drag(&mut self) -> Option<DragSummary> {
        let session = self.session.take()?;
        Some(DragSummary {
            ids: session.ids(),
            dx: session.dx,
            dy: session.dy,
            blocked: session.blocked,
        })
    }

    /// Abandons the drag and puts every shape back at its drag origin.
    pub fn cancel_drag(&mut self, store: &mut ShapeStore) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        apply_delta(&session.origins, 0.0, 0.0, store);
        true
    }

    /// One-shot move of `ids` by `(dx, dy)` under the same lock and
    /// boundary rules as a drag. Ignored while a drag is running.
    pub fn nudge(
        &self,
        ids: &[ShapeId],
        dx: f64,
        dy: f64,
        store: &mut ShapeStore,
        image: Option<ImageBounds>,
    ) -> DragOutcome {
        if self.session.is_some() {
            return DragOutcome::Ignored;
        }
        let origins: Vec<(ShapeId, Point)> = ids
            .iter()
            .filter_map(|&id| store.get(id).map(|obj| (id, obj.origin())))
            .collect();
        if origins.is_empty() {
            return DragOutcome::Ignored;
        }

        let locked_ids = locked_members(&origins, store);
        if !locked_ids.is_empty() {
            return DragOutcome::Blocked { locked_ids };
        }

        let (cx, cy) = constrain(&origins, (dx, dy), store, image);
        apply_delta(&origins, cx, cy, store);
        DragOutcome::Moved {
            dx: cx,
            dy: cy,
            clamped: (cx, cy) != (dx, dy),
        }
    }
}

fn locked_members(origins: &[(ShapeId, Point)], store: &ShapeStore) -> Vec<ShapeId> {
    origins
        .iter()
        .filter(|(id, _)| store.get(*id).is_some_and(|obj| obj.locked))
        .map(|(id, _)| *id)
        .collect()
}

fn apply_delta(origins: &[(ShapeId, Point)], dx: f64, dy: f64, store: &mut ShapeStore) {
    for (id, origin) in origins {
        if let Some(obj) = store.get_mut(*id) {
            obj.set_origin(origin.offset(dx, dy));
        }
    }
}

/// Clamped delta for moving `origins` by `requested`, or the raw request
/// when there is no image or some member lacks geometry.
fn constrain(
    origins: &[(ShapeId, Point)],
    requested: (f64, f64),
    store: &ShapeStore,
    image: Option<ImageBounds>,
) -> (f64, f64) {
    let Some(image) = image else {
        return requested;
    };
    let hull = |dx: f64, dy: f64| hull_at(origins, dx, dy, store);
    match clamp_delta(hull, requested, image.bounds()) {
        Some(delta) => delta,
        None => requested,
    }
}

/// Union of member bounds with every member placed at `origin + (dx, dy)`.
fn hull_at(origins: &[(ShapeId, Point)], dx: f64, dy: f64, store: &ShapeStore) -> Option<Bounds> {
    let mut hull: Option<Bounds> = None;
    for (id, origin) in origins {
        let obj = store.get(*id)?;
        let Some(bounds) = shape_bounds(obj) else {
            warn!(shape = *id, "Shape has no usable geometry, skipping clamp");
            return None;
        };
        let current = obj.origin();
        let moved = bounds.translated(origin.x + dx - current.x, origin.y + dy - current.y);
        hull = Some(match hull {
            Some(h) => h.union(&moved),
            None => moved,
        });
    }
    hull
}

/// Adjusts `requested` so the hull produced by `hull_at` fits `image`.
///
/// Returns `None` when the hull cannot be computed.
pub fn clamp_delta<F>(hull_at: F, requested: (f64, f64), image: Bounds) -> Option<(f64, f64)>
where
    F: Fn(f64, f64) -> Option<Bounds>,
{
    let (mut dx, mut dy) = requested;
    for _ in 0..CLAMP_PASSES {
        let hull = hull_at(dx, dy)?;
        let cx = axis_correction(hull.min_x, hull.max_x, image.min_x, image.max_x);
        let cy = axis_correction(hull.min_y, hull.max_y, image.min_y, image.max_y);
        if cx == 0.0 && cy == 0.0 {
            break;
        }
        dx += cx;
        dy += cy;
    }
    Some((dx, dy))
}

fn axis_correction(min: f64, max: f64, lo: f64, hi: f64) -> f64 {
    let mut correction = 0.0;
    if max > hi {
        correction = hi - max;
    }
    if min + correction < lo {
        correction = lo - min;
    }
    correction
}
