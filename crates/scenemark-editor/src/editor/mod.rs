//! Editor composition root.
//!
//! `Editor` builds the components in dependency order (store, registry,
//! selection, transform, constraints, magnifier) and passes references
//! between them explicitly. It is the API a UI shell talks to: shape
//! management, selection, pointer gestures and the magnifier lifecycle.

use std::sync::Arc;
use tracing::{debug, info};

use scenemark_core::{
    AppEvent, EditorError, EventBus, MagnifierEvent, Result, SelectionMode, ShapeId, SurfaceId,
};
use scenemark_settings::{EditorSettings, LoupeSettings};

use crate::constraint_engine::ConstraintEngine;
use crate::geometry::ImageBounds;
use crate::magnifier::{FrameResult, MagnifierHandle, MagnifierOverlay, RenderSurface};
use crate::model::{Point, Shape};
use crate::selection_manager::SelectionManager;
use crate::shape_registry::ShapeRegistry;
use crate::shape_store::{DrawingObject, ShapeStore};
use crate::transform_controller::TransformController;

mod gestures;

pub use gestures::PointerAction;
use gestures::PointerGesture;

/// Pointer slack for hit testing shapes, in scene units.
pub const HIT_TOLERANCE: f64 = 2.0;
/// Pointer slack for grabbing transform handles, in scene units.
pub const HANDLE_TOLERANCE: f64 = 6.0;

pub struct Editor {
    bus: Arc<EventBus>,
    store: ShapeStore,
    registry: ShapeRegistry,
    selection: SelectionManager,
    transform: TransformController,
    constraints: ConstraintEngine,
    magnifier: Option<MagnifierOverlay>,
    magnifier_generation: u64,
    background: Option<ImageBounds>,
    settings: EditorSettings,
    gesture: PointerGesture,
}

impl Editor {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self::with_settings(bus, EditorSettings::default())
    }

    pub fn with_settings(bus: Arc<EventBus>, settings: EditorSettings) -> Self {
        let store = ShapeStore::new();
        let registry = ShapeRegistry::new();
        let mut selection = SelectionManager::new(bus.clone());
        selection.configure(settings.highlight_padding, settings.locked_feedback_ms);
        let transform = TransformController::new(settings.min_shape_size);
        let constraints = ConstraintEngine::new();

        Self {
            bus,
            store,
            registry,
            selection,
            transform,
            constraints,
            magnifier: None,
            magnifier_generation: 0,
            background: None,
            settings,
            gesture: PointerGesture::Idle,
        }
    }

    /// Replaces the editor preferences.
    pub fn apply_settings(&mut self, settings: EditorSettings) {
        self.selection
            .configure(settings.highlight_padding, settings.locked_feedback_ms);
        self.transform.set_min_shape_size(settings.min_shape_size);
        self.settings = settings;
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    /// Mutable registry, for registering custom policies. Re-select to
    /// refresh the handles of an attached shape.
    pub fn registry_mut(&mut self) -> &mut ShapeRegistry {
        &mut self.registry
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn transform(&self) -> &TransformController {
        &self.transform
    }

    pub fn constraints(&self) -> &ConstraintEngine {
        &self.constraints
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn background(&self) -> Option<ImageBounds> {
        self.background
    }

    pub fn set_background(&mut self, background: Option<ImageBounds>) {
        self.background = background;
    }

    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        let id = self.store.add(shape);
        debug!(shape = id, "Shape added");
        id
    }

    pub fn add_point(&mut self, position: Point) -> ShapeId {
        self.store.add_point(position)
    }

    pub fn add_rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) -> ShapeId {
        self.store.add_rectangle(x, y, width, height)
    }

    pub fn add_circle(&mut self, center: Point, radius: f64) -> ShapeId {
        self.store.add_circle(center, radius)
    }

    /// Deletes a shape and drops it from the selection.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<DrawingObject> {
        if self.gesture.involves(id, &self.constraints) {
            self.cancel_gesture();
        } else if self.selection.contains(id) {
            self.settle_transform();
        }
        let removed = self.store.remove(id)?;
        if self
            .selection
            .remove_shape(id, &self.store, &self.registry, &mut self.transform)
        {
            self.apply_tether();
        }
        Some(removed)
    }

    pub fn set_locked(&mut self, id: ShapeId, locked: bool) -> Result<()> {
        let was_locked = self
            .store
            .get(id)
            .map(|obj| obj.locked)
            .ok_or(EditorError::UnknownShape { id })?;
        if was_locked == locked {
            return Ok(());
        }
        if self.gesture.involves(id, &self.constraints) {
            self.settle_transform();
        }
        if let Some(obj) = self.store.get_mut(id) {
            obj.locked = locked;
        }
        self.refresh_attachment();
        Ok(())
    }

    pub fn set_label(&mut self, id: ShapeId, label: Option<String>) -> Result<()> {
        let obj = self
            .store
            .get_mut(id)
            .ok_or(EditorError::UnknownShape { id })?;
        obj.label = label;
        Ok(())
    }

    fn refresh_attachment(&mut self) {
        let single = match self.selection.mode() {
            SelectionMode::Single => self.selection.primary().and_then(|id| self.store.get(id)),
            _ => None,
        };
        match single {
            Some(obj) => {
                self.transform.attach(obj, &self.registry);
            }
            None => self.transform.detach(),
        }
    }

    pub fn set_selection(&mut self, ids: &[ShapeId]) -> SelectionMode {
        self.settle_transform();
        let mode = self
            .selection
            .set_selection(ids, &self.store, &self.registry, &mut self.transform);
        self.apply_tether();
        mode
    }

    pub fn clear_selection(&mut self) -> SelectionMode {
        self.set_selection(&[])
    }

    pub fn select_all(&mut self) -> SelectionMode {
        self.settle_transform();
        let mode = self
            .selection
            .select_all(&self.store, &self.registry, &mut self.transform);
        self.apply_tether();
        mode
    }

    pub fn toggle_selection(&mut self, id: ShapeId) -> SelectionMode {
        self.settle_transform();
        let mode = self
            .selection
            .toggle(id, &self.store, &self.registry, &mut self.transform);
        self.apply_tether();
        mode
    }

    pub fn hit_test(&self, p: Point) -> Option<ShapeId> {
        self.store.hit_test(p, HIT_TOLERANCE)
    }

    /// Installs a magnifier on `surface`, replacing any previous one.
    pub fn install_magnifier(
        &mut self,
        surface: SurfaceId,
        settings: &LoupeSettings,
    ) -> MagnifierHandle {
        if let Some(handle) = self.magnifier_handle() {
            self.detach_magnifier(handle);
        }

        self.magnifier_generation += 1;
        self.magnifier = Some(MagnifierOverlay::new(
            surface,
            settings,
            self.bus.clone(),
            self.selection.selected_ids().to_vec(),
        ));
        self.apply_tether();

        info!(%surface, "Magnifier installed");
        let _ = self
            .bus
            .publish(AppEvent::Magnifier(MagnifierEvent::Installed { surface }));
        MagnifierHandle {
            surface,
            generation: self.magnifier_generation,
        }
    }

    /// Detaches the overlay `handle` refers to. Stale handles are ignored.
    pub fn detach_magnifier(&mut self, handle: MagnifierHandle) -> bool {
        if self.magnifier_handle() != Some(handle) {
            return false;
        }
        let Some(mut overlay) = self.magnifier.take() else {
            return false;
        };
        overlay.detach();

        info!(surface = %handle.surface, "Magnifier detached");
        let _ = self.bus.publish(AppEvent::Magnifier(MagnifierEvent::Detached {
            surface: handle.surface,
        }));
        true
    }

    pub fn magnifier_handle(&self) -> Option<MagnifierHandle> {
        self.magnifier.as_ref().map(|overlay| MagnifierHandle {
            surface: overlay.surface_id(),
            generation: self.magnifier_generation,
        })
    }

    pub fn magnifier(&self) -> Option<&MagnifierOverlay> {
        self.magnifier.as_ref()
    }

    pub fn magnifier_mut(&mut self) -> Option<&mut MagnifierOverlay> {
        self.magnifier.as_mut()
    }

    /// Pointer moved over the magnified surface, logical pixels.
    pub fn loupe_pointer_move(&mut self, local: Point) -> bool {
        self.magnifier
            .as_mut()
            .is_some_and(|overlay| overlay.pointer_move(local))
    }

    pub fn loupe_pointer_leave(&mut self) -> bool {
        self.magnifier
            .as_mut()
            .is_some_and(|overlay| overlay.pointer_leave())
    }

    /// Animation-frame callback for the magnifier on `surface`.
    pub fn on_animation_frame(&mut self, surface: &dyn RenderSurface) -> FrameResult {
        match self.magnifier.as_mut() {
            Some(overlay) if overlay.surface_id() == surface.surface_id() => {
                overlay.on_animation_frame(surface)
            }
            _ => FrameResult::Idle,
        }
    }

    /// Anchors the magnifier to the selected shape when tethering is on and
    /// the selection is a single anchor-eligible shape.
    fn apply_tether(&mut self) {
        let Some(overlay) = self.magnifier.as_mut() else {
            return;
        };
        overlay.sync_events();
        if !overlay.state().tether || self.selection.mode() != SelectionMode::Single {
            return;
        }
        let Some(obj) = self.selection.primary().and_then(|id| self.store.get(id)) else {
            return;
        };
        if self.registry.is_loupe_anchor(obj.shape_type()) {
            overlay.set_anchor_shape(obj.id, obj.center());
        }
    }

    /// Keeps a shape-anchored magnifier on its shape after a move.
    fn follow_anchor(&mut self) {
        let Some(overlay) = self.magnifier.as_mut() else {
            return;
        };
        let Some(id) = overlay.state().anchored_shape() else {
            return;
        };
        if let Some(obj) = self.store.get(id) {
            overlay.set_anchor_shape(id, obj.center());
        }
    }
}
