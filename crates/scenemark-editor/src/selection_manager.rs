//! Selection state.
//!
//! `SelectionManager` is the only owner of "which shapes are selected".
//! Every mutation funnels through [`SelectionManager::set_selection`],
//! which keeps the transform handles and highlight decorations consistent
//! and announces the change on the event bus. Other components either
//! read the accessors here or subscribe to [`SelectionEvent::Changed`].

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::debug;

use scenemark_core::constants::{HIGHLIGHT_PADDING, LOCKED_FEEDBACK_MS};
use scenemark_core::{AppEvent, EventBus, SelectionEvent, SelectionMode, ShapeId};

use crate::geometry::{bounds_or_fallback, Bounds};
use crate::shape_registry::ShapeRegistry;
use crate::shape_store::ShapeStore;
use crate::transform_controller::TransformController;

/// Colour role of a selection outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightColor {
    Default,
    /// Shown briefly after a drag was blocked by a locked member.
    LockedBlocked,
}

/// Outline drawn around one member of a multi-selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub id: ShapeId,
    pub bounds: Bounds,
    pub color: HighlightColor,
}

/// Manages the current selection.
pub struct SelectionManager {
    ids: Vec<ShapeId>,
    mode: SelectionMode,
    blocked_until: Option<DateTime<Utc>>,
    highlight_padding: f64,
    feedback: Duration,
    bus: Arc<EventBus>,
}

impl SelectionManager {
    /// Creates an empty selection publishing on `bus`.
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            ids: Vec::new(),
            mode: SelectionMode::None,
            blocked_until: None,
            highlight_padding: HIGHLIGHT_PADDING,
            feedback: Duration::milliseconds(LOCKED_FEEDBACK_MS),
            bus,
        }
    }

    /// Overrides outline padding and the locked-feedback duration.
    pub fn configure(&mut self, highlight_padding: f64, locked_feedback_ms: i64) {
        self.highlight_padding = highlight_padding;
        self.feedback = Duration::milliseconds(locked_feedback_ms);
    }

    /// Replaces the selection.
    ///
    /// Ids that are not in `store` and repeated ids are dropped; the order
    /// of the remaining ids is kept. On every call the mode is recomputed,
    /// the transform controller is attached to the single selected shape
    /// (or detached otherwise) and [`SelectionEvent::Changed`] is
    /// published.
    ///
    /// # Arguments
    /// * `ids` - Shapes to select, in order
    /// * `store` - Shape store used to validate ids
    /// * `registry` - Policies consulted when attaching handles
    /// * `transform` - Controller that shows or hides handles
    ///
    /// # Returns
    /// The new selection mode
    pub fn set_selection(
        &mut self,
        ids: &[ShapeId],
        store: &ShapeStore,
        registry: &ShapeRegistry,
        transform: &mut TransformController,
    ) -> SelectionMode {
        let mut next: Vec<ShapeId> = Vec::with_capacity(ids.len());
        for &id in ids {
            if !store.contains(id) {
                debug!(shape = id, "Ignoring unknown shape in selection");
                continue;
            }
            if !next.contains(&id) {
                next.push(id);
            }
        }

        let mode = SelectionMode::from_count(next.len());
        if next != self.ids {
            self.blocked_until = None;
        }
        self.ids = next;
        self.mode = mode;

        match (mode, self.ids.first().and_then(|&id| store.get(id))) {
            (SelectionMode::Single, Some(obj)) => {
                transform.attach(obj, registry);
            }
            _ => transform.detach(),
        }

        debug!(mode = %mode, count = self.ids.len(), "Selection changed");
        // Nobody listening is fine.
        let _ = self.bus.publish(AppEvent::Selection(SelectionEvent::Changed {
            ids: self.ids.clone(),
            mode,
        }));
        mode
    }

    pub fn clear_selection(
        &mut self,
        store: &ShapeStore,
        registry: &ShapeRegistry,
        transform: &mut TransformController,
    ) -> SelectionMode {
        self.set_selection(&[], store, registry, transform)
    }

    /// Selects every shape in draw order.
    pub fn select_all(
        &mut self,
        store: &ShapeStore,
        registry: &ShapeRegistry,
        transform: &mut TransformController,
    ) -> SelectionMode {
        let ids = store.ids().to_vec();
        self.set_selection(&ids, store, registry, transform)
    }

    /// Adds `id` to the selection, or removes it when already selected.
    pub fn toggle(
        &mut self,
        id: ShapeId,
        store: &ShapeStore,
        registry: &ShapeRegistry,
        transform: &mut TransformController,
    ) -> SelectionMode {
        let mut ids = self.ids.clone();
        if let Some(index) = ids.iter().position(|&other| other == id) {
            ids.remove(index);
        } else {
            ids.push(id);
        }
        self.set_selection(&ids, store, registry, transform)
    }

    /// Drops `id` from the selection after it was removed from `store`.
    /// Does nothing when `id` was not selected.
    pub fn remove_shape(
        &mut self,
        id: ShapeId,
        store: &ShapeStore,
        registry: &ShapeRegistry,
        transform: &mut TransformController,
    ) -> bool {
        if !self.contains(id) {
            return false;
        }
        let ids: Vec<ShapeId> = self.ids.iter().copied().filter(|&other| other != id).collect();
        self.set_selection(&ids, store, registry, transform);
        true
    }

    /// Turns every outline to the blocked colour until `now` plus the
    /// feedback duration, and announces the veto.
    pub fn flag_locked_drag_blocked(&mut self, locked_ids: Vec<ShapeId>, now: DateTime<Utc>) {
        self.blocked_until = Some(now + self.feedback);
        let _ = self
            .bus
            .publish(AppEvent::Selection(SelectionEvent::LockedDragBlocked { locked_ids }));
    }

    pub fn is_feedback_active(&self, now: DateTime<Utc>) -> bool {
        self.blocked_until.is_some_and(|until| now < until)
    }

    /// Outlines for the current selection as of `now`.
    ///
    /// Only multi-selections are outlined; a single selection shows
    /// transform handles instead.
    pub fn decorations(&self, store: &ShapeStore, now: DateTime<Utc>) -> Vec<Highlight> {
        if self.mode != SelectionMode::Multi {
            return Vec::new();
        }
        let color = if self.is_feedback_active(now) {
            HighlightColor::LockedBlocked
        } else {
            HighlightColor::Default
        };
        self.ids
            .iter()
            .filter_map(|&id| store.get(id))
            .map(|obj| Highlight {
                id: obj.id,
                bounds: bounds_or_fallback(obj).expanded(self.highlight_padding),
                color,
            })
            .collect()
    }

    pub fn selected_ids(&self) -> &[ShapeId] {
        &self.ids
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// First selected shape.
    pub fn primary(&self) -> Option<ShapeId> {
        self.ids.first().copied()
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
