//! Reversible registry edits.
//!
//! Each action captures the records, indices and selection it displaces on
//! its first apply, so undo puts back exactly what was there and redo
//! replays with the same ids.

use lumen_core::abstract_editor::{EditAction, EditActionError, EditActionResult};

use crate::record::{LightId, LightKind, LightRecord, LightTransform};
use crate::registry::LightRegistry;
use crate::update::{PropertyFields, PropertyUpdate, TransformUpdate};

fn missing(id: LightId) -> EditActionError {
    EditActionError::TargetNotFound(format!("light {id}"))
}

fn not_applied() -> EditActionError {
    EditActionError::InvalidState("action was never applied".into())
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

/// Appends a new light and selects it.
#[derive(Debug)]
pub struct AddLight {
    kind: LightKind,
    description: String,
    added: Option<(usize, LightRecord)>,
    previous_selection: Option<LightId>,
}

impl AddLight {
    pub fn new(kind: LightKind) -> Self {
        Self {
            kind,
            description: format!("Add {kind} light"),
            added: None,
            previous_selection: None,
        }
    }

    /// Id of the created light, once applied.
    pub fn light_id(&self) -> Option<LightId> {
        self.added.as_ref().map(|(_, light)| light.id)
    }
}

impl EditAction<LightRegistry> for AddLight {
    fn apply(&mut self, registry: &mut LightRegistry) -> EditActionResult {
        self.previous_selection = registry.selected();
        match &self.added {
            Some((index, light)) => {
                if !registry.reinstate(*index, light.clone(), Some(light.id)) {
                    return Err(EditActionError::InvalidState(format!(
                        "light {} already exists",
                        light.id
                    )));
                }
            }
            None => {
                let id = registry.add(self.kind);
                let index = registry.len() - 1;
                let light = registry.get(id).cloned().ok_or_else(|| missing(id))?;
                self.added = Some((index, light));
            }
        }
        Ok(())
    }

    fn undo(&mut self, registry: &mut LightRegistry) -> EditActionResult {
        let (_, light) = self.added.as_ref().ok_or_else(not_applied)?;
        if !registry.retract(light.id, self.previous_selection) {
            return Err(missing(light.id));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Removes a light, remembering where it was.
#[derive(Debug)]
pub struct RemoveLight {
    id: LightId,
    removed: Option<(usize, LightRecord)>,
    previous_selection: Option<LightId>,
}

impl RemoveLight {
    pub fn new(id: LightId) -> Self {
        Self {
            id,
            removed: None,
            previous_selection: None,
        }
    }
}

impl EditAction<LightRegistry> for RemoveLight {
    fn apply(&mut self, registry: &mut LightRegistry) -> EditActionResult {
        let index = registry.index_of(self.id).ok_or_else(|| missing(self.id))?;
        self.previous_selection = registry.selected();
        let light = registry.remove(self.id).ok_or_else(|| missing(self.id))?;
        self.removed = Some((index, light));
        Ok(())
    }

    fn undo(&mut self, registry: &mut LightRegistry) -> EditActionResult {
        let (index, light) = self.removed.take().ok_or_else(not_applied)?;
        if !registry.reinstate(index, light, self.previous_selection) {
            return Err(EditActionError::InvalidState(format!(
                "light {} already exists",
                self.id
            )));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Remove light"
    }
}

/// Copies a light to the end of the list and selects the copy.
#[derive(Debug)]
pub struct DuplicateLight {
    source: LightId,
    copy: Option<(usize, LightRecord)>,
    previous_selection: Option<LightId>,
}

impl DuplicateLight {
    pub fn new(source: LightId) -> Self {
        Self {
            source,
            copy: None,
            previous_selection: None,
        }
    }

    /// Id of the copy, once applied.
    pub fn copy_id(&self) -> Option<LightId> {
        self.copy.as_ref().map(|(_, light)| light.id)
    }
}

impl EditAction<LightRegistry> for DuplicateLight {
    fn apply(&mut self, registry: &mut LightRegistry) -> EditActionResult {
        if !registry.contains(self.source) {
            return Err(missing(self.source));
        }
        self.previous_selection = registry.selected();
        match &self.copy {
            Some((index, light)) => {
                if !registry.reinstate(*index, light.clone(), Some(light.id)) {
                    return Err(EditActionError::InvalidState(format!(
                        "light {} already exists",
                        light.id
                    )));
                }
            }
            None => {
                let id = registry
                    .duplicate(self.source)
                    .ok_or_else(|| missing(self.source))?;
                let index = registry.len() - 1;
                let light = registry.get(id).cloned().ok_or_else(|| missing(id))?;
                self.copy = Some((index, light));
            }
        }
        Ok(())
    }

    fn undo(&mut self, registry: &mut LightRegistry) -> EditActionResult {
        let (_, light) = self.copy.as_ref().ok_or_else(not_applied)?;
        if !registry.retract(light.id, self.previous_selection) {
            return Err(missing(light.id));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Duplicate light"
    }
}

/// Moves `source` immediately before `target`.
#[derive(Debug)]
pub struct ReorderLight {
    source: LightId,
    target: LightId,
    from: Option<usize>,
}

impl ReorderLight {
    pub fn new(source: LightId, target: LightId) -> Self {
        Self {
            source,
            target,
            from: None,
        }
    }
}

impl EditAction<LightRegistry> for ReorderLight {
    fn apply(&mut self, registry: &mut LightRegistry) -> EditActionResult {
        let from = registry
            .index_of(self.source)
            .ok_or_else(|| missing(self.source))?;
        if !registry.contains(self.target) {
            return Err(missing(self.target));
        }
        if !registry.reorder(self.source, self.target) {
            return Err(EditActionError::InvalidState(
                "light is already in place".into(),
            ));
        }
        self.from = Some(from);
        Ok(())
    }

    fn undo(&mut self, registry: &mut LightRegistry) -> EditActionResult {
        let from = self.from.ok_or_else(not_applied)?;
        if !registry.move_to(self.source, from) {
            return Err(missing(self.source));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Reorder lights"
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Toggle-selects a light, or clears the selection with `None`.
///
/// Recorded so undo walks back through selection changes, but does not
/// count as a content change.
#[derive(Debug)]
pub struct SelectLight {
    requested: Option<LightId>,
    before: Option<LightId>,
}

impl SelectLight {
    pub fn new(requested: Option<LightId>) -> Self {
        Self {
            requested,
            before: None,
        }
    }
}

impl EditAction<LightRegistry> for SelectLight {
    fn apply(&mut self, registry: &mut LightRegistry) -> EditActionResult {
        if let Some(id) = self.requested
            && !registry.contains(id)
        {
            return Err(missing(id));
        }
        self.before = registry.selected();
        registry.select(self.requested);
        Ok(())
    }

    fn undo(&mut self, registry: &mut LightRegistry) -> EditActionResult {
        registry.set_selection(self.before);
        Ok(())
    }

    fn description(&self) -> &str {
        "Select light"
    }

    fn modifies_content(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// Value edits
// ---------------------------------------------------------------------------

/// Applies a [`TransformUpdate`] to one light.
///
/// Consecutive transforms of the same light merge into one undo step.
#[derive(Debug)]
pub struct SetTransform {
    id: LightId,
    update: TransformUpdate,
    before: Option<LightTransform>,
    after: Option<LightTransform>,
}

impl SetTransform {
    pub fn new(id: LightId, update: TransformUpdate) -> Self {
        Self {
            id,
            update,
            before: None,
            after: None,
        }
    }
}

impl EditAction<LightRegistry> for SetTransform {
    fn apply(&mut self, registry: &mut LightRegistry) -> EditActionResult {
        match self.after {
            Some(after) => {
                if !registry.set_transform(self.id, after) {
                    return Err(missing(self.id));
                }
            }
            None => {
                let before = registry
                    .get(self.id)
                    .map(LightRecord::transform)
                    .ok_or_else(|| missing(self.id))?;
                registry.update_transform(self.id, &self.update);
                self.before = Some(before);
                self.after = registry.get(self.id).map(LightRecord::transform);
            }
        }
        Ok(())
    }

    fn undo(&mut self, registry: &mut LightRegistry) -> EditActionResult {
        let before = self.before.ok_or_else(not_applied)?;
        if !registry.set_transform(self.id, before) {
            return Err(missing(self.id));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Transform light"
    }

    fn merge(
        &mut self,
        other: Box<dyn EditAction<LightRegistry>>,
    ) -> Option<Box<dyn EditAction<LightRegistry>>> {
        match (*other).as_any().downcast_ref::<Self>() {
            Some(next) if next.id == self.id && next.after.is_some() => {
                self.after = next.after;
                None
            }
            _ => Some(other),
        }
    }
}

/// Applies a [`PropertyUpdate`] to one light.
///
/// Consecutive updates of the same light that touch the same fields merge,
/// so a slider drag is one undo step.
#[derive(Debug)]
pub struct SetProperties {
    id: LightId,
    update: PropertyUpdate,
    fields: PropertyFields,
    description: String,
    before: Option<LightRecord>,
    after: Option<LightRecord>,
}

impl SetProperties {
    pub fn new(id: LightId, update: PropertyUpdate) -> Self {
        let fields = update.fields();
        Self {
            id,
            update,
            fields,
            description: "Edit light".into(),
            before: None,
            after: None,
        }
    }

    /// Replaces the history label.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl EditAction<LightRegistry> for SetProperties {
    fn apply(&mut self, registry: &mut LightRegistry) -> EditActionResult {
        match &self.after {
            Some(after) => {
                if !registry.replace(after.clone()) {
                    return Err(missing(self.id));
                }
            }
            None => {
                let before = registry.get(self.id).cloned().ok_or_else(|| missing(self.id))?;
                registry.update_properties(self.id, &self.update);
                self.after = registry.get(self.id).cloned();
                self.before = Some(before);
            }
        }
        Ok(())
    }

    fn undo(&mut self, registry: &mut LightRegistry) -> EditActionResult {
        let before = self.before.clone().ok_or_else(not_applied)?;
        if !registry.replace(before) {
            return Err(missing(self.id));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn merge(
        &mut self,
        other: Box<dyn EditAction<LightRegistry>>,
    ) -> Option<Box<dyn EditAction<LightRegistry>>> {
        match (*other).as_any().downcast_ref::<Self>() {
            Some(next)
                if next.id == self.id && next.fields == self.fields && next.after.is_some() =>
            {
                self.after.clone_from(&next.after);
                None
            }
            _ => Some(other),
        }
    }
}

/// Marks the start of a gesture such as a gizmo drag.
///
/// Not recorded; it only stops the next edit from merging into the
/// previous one.
#[derive(Debug, Default)]
pub struct BeginGesture;

impl EditAction<LightRegistry> for BeginGesture {
    fn apply(&mut self, _registry: &mut LightRegistry) -> EditActionResult {
        Ok(())
    }

    fn undo(&mut self, _registry: &mut LightRegistry) -> EditActionResult {
        Ok(())
    }

    fn description(&self) -> &str {
        "Begin gesture"
    }

    fn is_recorded(&self) -> bool {
        false
    }

    fn breaks_merge(&self) -> bool {
        true
    }
}
