//! The light registry: ordered light records plus the current selection.
//!
//! Every operation is total. Unknown ids are no-ops and malformed input is
//! coerced, so no sequence of calls can leave the registry violating a
//! record invariant, duplicating an id, or selecting a missing light.
//!
//! Consumers observe the registry either by querying it or by registering
//! a callback with [`LightRegistry::subscribe`]. Callbacks run synchronously
//! after each state change and see the fully updated collection.

use std::collections::HashSet;
use std::fmt;

use lumen_core::abstract_editor::Editable;
use serde::{Deserialize, Serialize};

use crate::record::{LightId, LightKind, LightRecord, LightTransform};
use crate::update::{PropertyUpdate, TransformUpdate};

/// What changed in a [`RegistryChange`] notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added(LightId),
    Removed(LightId),
    Duplicated { source: LightId, copy: LightId },
    Selected(Option<LightId>),
    Reordered(LightId),
    TransformChanged(LightId),
    PropertiesChanged(LightId),
    /// The whole state was replaced from a snapshot.
    Restored,
}

/// A state-change notification carrying the complete post-change state.
#[derive(Debug, Clone, Copy)]
pub struct RegistryChange<'a> {
    pub kind: ChangeKind,
    pub lights: &'a [LightRecord],
    pub selected: Option<LightId>,
}

/// Handle returned by [`LightRegistry::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&RegistryChange<'_>)>;

/// A serializable copy of the registry state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySnapshot {
    pub lights: Vec<LightRecord>,
    pub selected: Option<LightId>,
}

/// Owns all light records and the selection.
#[derive(Default)]
pub struct LightRegistry {
    lights: Vec<LightRecord>,
    selected: Option<LightId>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Editable for LightRegistry {}

impl LightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// All lights in display order.
    pub fn lights(&self) -> &[LightRecord] {
        &self.lights
    }

    pub fn get(&self, id: LightId) -> Option<&LightRecord> {
        self.lights.iter().find(|light| light.id == id)
    }

    pub fn index_of(&self, id: LightId) -> Option<usize> {
        self.lights.iter().position(|light| light.id == id)
    }

    pub fn contains(&self, id: LightId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn selected(&self) -> Option<LightId> {
        self.selected
    }

    pub fn selected_light(&self) -> Option<&LightRecord> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            lights: self.lights.clone(),
            selected: self.selected,
        }
    }

    // ---------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------

    /// Appends a new light of `kind` with default settings and selects it.
    pub fn add(&mut self, kind: LightKind) -> LightId {
        let light = LightRecord::new(kind);
        let id = light.id;
        log::debug!("add {kind} light {id}");
        self.lights.push(light);
        self.selected = Some(id);
        self.notify(ChangeKind::Added(id));
        id
    }

    /// Removes a light, clearing the selection if it pointed at it.
    pub fn remove(&mut self, id: LightId) -> Option<LightRecord> {
        let index = self.index_of(id)?;
        let removed = self.lights.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        log::debug!("remove light {id}");
        self.notify(ChangeKind::Removed(id));
        Some(removed)
    }

    /// Toggles the selection.
    ///
    /// Selecting the current selection clears it; `None` always clears.
    /// Ids that name no light leave the selection alone, so the selection
    /// never points at a missing light.
    pub fn select(&mut self, id: Option<LightId>) -> Option<LightId> {
        let next = match id {
            Some(id) if !self.contains(id) => {
                log::debug!("select ignored: no light {id}");
                return self.selected;
            }
            Some(id) if self.selected == Some(id) => None,
            other => other,
        };
        if next != self.selected {
            self.selected = next;
            self.notify(ChangeKind::Selected(next));
        }
        self.selected
    }

    /// Appends a copy of a light, one unit further along X, and selects it.
    pub fn duplicate(&mut self, id: LightId) -> Option<LightId> {
        let source = self.get(id)?;
        let label = if source.name.is_empty() {
            source.kind.as_str()
        } else {
            source.name.as_str()
        };
        let mut copy = source.clone();
        copy.id = LightId::new();
        copy.name = format!("{label} Copy");
        copy.position[0] += 1.0;

        let copy_id = copy.id;
        log::debug!("duplicate light {id} as {copy_id}");
        self.lights.push(copy);
        self.selected = Some(copy_id);
        self.notify(ChangeKind::Duplicated {
            source: id,
            copy: copy_id,
        });
        Some(copy_id)
    }

    /// Moves `source` so that it sits immediately before `target`.
    ///
    /// Returns `false` when nothing moved.
    pub fn reorder(&mut self, source: LightId, target: LightId) -> bool {
        if source == target {
            return false;
        }
        let (Some(from), Some(to)) = (self.index_of(source), self.index_of(target)) else {
            return false;
        };
        if from + 1 == to {
            return false;
        }
        let light = self.lights.remove(from);
        let to = if from < to { to - 1 } else { to };
        self.lights.insert(to, light);
        log::debug!("reorder light {source}: {from} -> {to}");
        self.notify(ChangeKind::Reordered(source));
        true
    }

    /// Applies a partial transform update. Returns whether anything changed.
    pub fn update_transform(&mut self, id: LightId, update: &TransformUpdate) -> bool {
        let Some(light) = self.lights.iter_mut().find(|light| light.id == id) else {
            return false;
        };
        let changed = update.apply_to(light);
        if changed {
            self.notify(ChangeKind::TransformChanged(id));
        }
        changed
    }

    /// Applies a partial property update. Returns whether anything changed.
    pub fn update_properties(&mut self, id: LightId, update: &PropertyUpdate) -> bool {
        let Some(light) = self.lights.iter_mut().find(|light| light.id == id) else {
            return false;
        };
        let changed = update.apply_to(light);
        if changed {
            self.notify(ChangeKind::PropertiesChanged(id));
        }
        changed
    }

    /// Replaces the whole state with `snapshot`.
    ///
    /// Records are sanitized, later duplicates of an id get a fresh id, and
    /// a selection naming no surviving light is dropped.
    pub fn restore(&mut self, snapshot: RegistrySnapshot) {
        let mut seen = HashSet::with_capacity(snapshot.lights.len());
        self.lights = snapshot
            .lights
            .into_iter()
            .map(|light| {
                let mut light = light.sanitized();
                if !seen.insert(light.id) {
                    let fresh = LightId::new();
                    log::warn!("duplicate light id {} re-keyed as {fresh}", light.id);
                    light.id = fresh;
                    seen.insert(fresh);
                }
                light
            })
            .collect();
        self.selected = snapshot.selected.filter(|id| {
            let exists = self.contains(*id);
            if !exists {
                log::warn!("snapshot selects missing light {id}; selection cleared");
            }
            exists
        });
        log::info!("restored {} lights", self.lights.len());
        self.notify(ChangeKind::Restored);
    }

    // ---------------------------------------------------------------
    // History support
    //
    // Undo and redo need to put back exact prior records (same id, same
    // index), which the public operations never do.
    // ---------------------------------------------------------------

    /// Inserts `light` at `index` (clamped) and sets the selection.
    pub(crate) fn reinstate(
        &mut self,
        index: usize,
        light: LightRecord,
        selected: Option<LightId>,
    ) -> bool {
        if self.contains(light.id) {
            return false;
        }
        let id = light.id;
        let index = index.min(self.lights.len());
        self.lights.insert(index, light);
        self.selected = selected.filter(|s| self.contains(*s));
        self.notify(ChangeKind::Added(id));
        true
    }

    /// Removes `id` and sets the selection to `selected`.
    pub(crate) fn retract(&mut self, id: LightId, selected: Option<LightId>) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.lights.remove(index);
        self.selected = selected.filter(|s| self.contains(*s));
        self.notify(ChangeKind::Removed(id));
        true
    }

    /// Moves `id` to `index` (clamped).
    pub(crate) fn move_to(&mut self, id: LightId, index: usize) -> bool {
        let Some(from) = self.index_of(id) else {
            return false;
        };
        let light = self.lights.remove(from);
        let index = index.min(self.lights.len());
        self.lights.insert(index, light);
        self.notify(ChangeKind::Reordered(id));
        true
    }

    /// Sets the selection without toggling.
    pub(crate) fn set_selection(&mut self, selected: Option<LightId>) {
        let selected = selected.filter(|s| self.contains(*s));
        if selected != self.selected {
            self.selected = selected;
            self.notify(ChangeKind::Selected(selected));
        }
    }

    pub(crate) fn set_transform(&mut self, id: LightId, transform: LightTransform) -> bool {
        let Some(light) = self.lights.iter_mut().find(|light| light.id == id) else {
            return false;
        };
        light.set_transform(transform);
        self.notify(ChangeKind::TransformChanged(id));
        true
    }

    /// Replaces the record with the same id as `record`.
    pub(crate) fn replace(&mut self, record: LightRecord) -> bool {
        let id = record.id;
        let Some(light) = self.lights.iter_mut().find(|light| light.id == id) else {
            return false;
        };
        *light = record;
        self.notify(ChangeKind::PropertiesChanged(id));
        true
    }

    // ---------------------------------------------------------------
    // Subscriptions
    // ---------------------------------------------------------------

    /// Registers a callback invoked after every state change.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&RegistryChange<'_>) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, kind: ChangeKind) {
        debug_assert!(self.lights.iter().all(LightRecord::satisfies_invariants));
        let change = RegistryChange {
            kind,
            lights: &self.lights,
            selected: self.selected,
        };
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&change);
        }
    }
}

impl fmt::Debug for LightRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LightRegistry")
            .field("lights", &self.lights)
            .field("selected", &self.selected)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
