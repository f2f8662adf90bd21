//! Undoable front end over a [`LightRegistry`].
//!
//! [`LightEditor`] routes every edit through an [`EditActionHistory`] and
//! tracks the gizmo mode, snapping and any drag in progress.
//!
//! Discrete edits are one undo step each. Slider scrubs and gizmo drags
//! fold into a single step per gesture:
//!
//! ```ignore
//! let mut editor = LightEditor::new();
//! let id = editor.add(LightKind::Spot)?;
//! let mut pose = editor.begin_drag(id)?;
//! for x in [0.5, 1.0, 1.5] {
//!     pose.position[0] = x;
//!     editor.drag_to(pose)?;
//! }
//! editor.end_drag();
//! editor.undo()?; // back to where the drag started
//! ```

use lumen_core::abstract_editor::{
    DEFAULT_MAX_UNDO, EditAction, EditActionError, EditActionHistory, EditActionResult,
};

use crate::actions::{
    AddLight, BeginGesture, DuplicateLight, RemoveLight, ReorderLight, SelectLight, SetProperties,
    SetTransform,
};
use crate::gizmo::{GizmoPose, SnapSettings, TransformMode};
use crate::panel::LightingPreset;
use crate::record::{LightId, LightKind, LightRecord};
use crate::registry::{LightRegistry, RegistryChange, RegistrySnapshot, SubscriptionId};
use crate::update::{PropertyUpdate, TransformUpdate};

#[derive(Debug)]
pub struct LightEditor {
    registry: LightRegistry,
    history: EditActionHistory<LightRegistry>,
    mode: TransformMode,
    snap: SnapSettings,
    dragging: Option<LightId>,
}

impl Default for LightEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl LightEditor {
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_MAX_UNDO, SnapSettings::default())
    }

    pub fn with_settings(max_undo: usize, snap: SnapSettings) -> Self {
        Self {
            registry: LightRegistry::new(),
            history: EditActionHistory::new(max_undo),
            mode: TransformMode::default(),
            snap,
            dragging: None,
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn registry(&self) -> &LightRegistry {
        &self.registry
    }

    pub fn history(&self) -> &EditActionHistory<LightRegistry> {
        &self.history
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.snapshot()
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: TransformMode) {
        if self.mode != mode {
            log::debug!("gizmo mode {} -> {mode}", self.mode);
            self.mode = mode;
        }
    }

    /// Applies a `G`/`R`/`S` shortcut. Returns `false` for other keys.
    pub fn handle_shortcut(&mut self, key: char) -> bool {
        match TransformMode::from_shortcut(key) {
            Some(mode) => {
                self.set_mode(mode);
                true
            }
            None => false,
        }
    }

    pub fn snap(&self) -> SnapSettings {
        self.snap
    }

    pub fn set_snap(&mut self, snap: SnapSettings) {
        self.snap = snap;
    }

    pub fn dragging(&self) -> Option<LightId> {
        self.dragging
    }

    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&RegistryChange<'_>) + 'static,
    ) -> SubscriptionId {
        self.registry.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.registry.unsubscribe(id)
    }

    // -- structural edits ---------------------------------------------------

    pub fn add(&mut self, kind: LightKind) -> EditActionResult<LightId> {
        self.execute(AddLight::new(kind))?;
        self.registry
            .selected()
            .ok_or_else(|| EditActionError::InvalidState("added light is not selected".into()))
    }

    pub fn remove(&mut self, id: LightId) -> EditActionResult<LightRecord> {
        let light = self.require(id)?.clone();
        self.execute(RemoveLight::new(id))?;
        if self.dragging == Some(id) {
            self.dragging = None;
        }
        Ok(light)
    }

    /// Toggle-selects `id`, or clears the selection with `None`.
    ///
    /// Requests that would not change the selection are not recorded.
    pub fn select(&mut self, id: Option<LightId>) -> EditActionResult<Option<LightId>> {
        if let Some(id) = id {
            self.require(id)?;
        } else if self.registry.selected().is_none() {
            return Ok(None);
        }
        self.execute(SelectLight::new(id))?;
        Ok(self.registry.selected())
    }

    pub fn duplicate(&mut self, id: LightId) -> EditActionResult<LightId> {
        self.require(id)?;
        self.execute(DuplicateLight::new(id))?;
        self.registry
            .selected()
            .ok_or_else(|| EditActionError::InvalidState("copy is not selected".into()))
    }

    pub fn reorder(&mut self, source: LightId, target: LightId) -> EditActionResult {
        self.execute(ReorderLight::new(source, target))
    }

    // -- value edits --------------------------------------------------------

    /// Applies a transform as its own undo step.
    ///
    /// Returns `Ok(false)` without recording when nothing would change.
    pub fn update_transform(
        &mut self,
        id: LightId,
        update: TransformUpdate,
    ) -> EditActionResult<bool> {
        if !self.transform_changes(id, &update)? {
            return Ok(false);
        }
        self.execute_discrete(SetTransform::new(id, update))?;
        Ok(true)
    }

    /// Applies a property update as its own undo step.
    pub fn update_properties(
        &mut self,
        id: LightId,
        update: PropertyUpdate,
    ) -> EditActionResult<bool> {
        if !self.properties_change(id, &update)? {
            return Ok(false);
        }
        self.execute_discrete(SetProperties::new(id, update))?;
        Ok(true)
    }

    /// Applies a property update from a slider drag.
    ///
    /// Consecutive scrubs of the same fields on the same light share one
    /// undo step.
    pub fn scrub_properties(
        &mut self,
        id: LightId,
        update: PropertyUpdate,
    ) -> EditActionResult<bool> {
        if !self.properties_change(id, &update)? {
            return Ok(false);
        }
        self.execute(SetProperties::new(id, update))?;
        Ok(true)
    }

    pub fn apply_preset(&mut self, id: LightId, preset: LightingPreset) -> EditActionResult<bool> {
        let update = preset.to_update();
        if !self.properties_change(id, &update)? {
            return Ok(false);
        }
        self.execute_discrete(
            SetProperties::new(id, update).with_description(format!("Apply {preset} preset")),
        )?;
        Ok(true)
    }

    // -- gizmo drags --------------------------------------------------------

    /// Starts dragging `id`, returning the pose the gizmo starts from.
    pub fn begin_drag(&mut self, id: LightId) -> EditActionResult<GizmoPose> {
        let pose = GizmoPose::from_record(self.require(id)?);
        self.execute(BeginGesture)?;
        self.dragging = Some(id);
        log::debug!("begin {} drag of light {id}", self.mode);
        Ok(pose)
    }

    /// Moves the dragged light to `pose` through the current mode and snap.
    pub fn drag_to(&mut self, pose: GizmoPose) -> EditActionResult<bool> {
        let id = self
            .dragging
            .ok_or_else(|| EditActionError::InvalidState("no drag in progress".into()))?;
        if !self.registry.contains(id) {
            self.dragging = None;
            return Err(EditActionError::TargetNotFound(format!("light {id}")));
        }
        let update = pose.to_update(self.mode, &self.snap);
        if !self.transform_changes(id, &update)? {
            return Ok(false);
        }
        self.execute(SetTransform::new(id, update))?;
        Ok(true)
    }

    /// Ends the current drag. Returns the light that was being dragged.
    pub fn end_drag(&mut self) -> Option<LightId> {
        self.dragging.take()
    }

    // -- history ------------------------------------------------------------

    pub fn undo(&mut self) -> EditActionResult {
        self.dragging = None;
        self.history.undo(&mut self.registry)?;
        self.history.execute(Box::new(BeginGesture), &mut self.registry)
    }

    pub fn redo(&mut self) -> EditActionResult {
        self.dragging = None;
        self.history.redo(&mut self.registry)?;
        self.history.execute(Box::new(BeginGesture), &mut self.registry)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.history.has_unsaved_changes()
    }

    /// Replaces the registry contents. History is discarded and the loaded
    /// state counts as saved.
    pub fn load_snapshot(&mut self, snapshot: RegistrySnapshot) {
        self.dragging = None;
        self.registry.restore(snapshot);
        self.history.clear();
        self.history.mark_saved();
    }

    // -- helpers ------------------------------------------------------------

    fn execute(&mut self, action: impl EditAction<LightRegistry>) -> EditActionResult {
        self.history.execute(Box::new(action), &mut self.registry)
    }

    /// Records `action` as an undo step no neighbouring edit can merge into.
    fn execute_discrete(&mut self, action: impl EditAction<LightRegistry>) -> EditActionResult {
        self.execute(BeginGesture)?;
        self.execute(action)?;
        self.execute(BeginGesture)
    }

    fn require(&self, id: LightId) -> EditActionResult<&LightRecord> {
        self.registry
            .get(id)
            .ok_or_else(|| EditActionError::TargetNotFound(format!("light {id}")))
    }

    fn transform_changes(&self, id: LightId, update: &TransformUpdate) -> EditActionResult<bool> {
        let mut probe = self.require(id)?.clone();
        Ok(update.apply_to(&mut probe))
    }

    fn properties_change(&self, id: LightId, update: &PropertyUpdate) -> EditActionResult<bool> {
        let mut probe = self.require(id)?.clone();
        Ok(update.apply_to(&mut probe))
    }
}
