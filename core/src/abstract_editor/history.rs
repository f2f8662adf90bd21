//! Undo/redo stacks.
//!
//! [`EditActionHistory`] keeps a linear history: pushing a recorded action
//! after an undo throws the redo branch away.

use std::collections::VecDeque;
use std::fmt;

use super::action::{EditAction, EditActionError, EditActionResult, Editable};

/// Default maximum number of undo steps.
pub const DEFAULT_MAX_UNDO: usize = 100;

/// Distance, in content-modifying steps, from the current state to the
/// last saved state.
///
/// Positive: that many undos reach the save. Negative: that many redos.
/// `Lost`: never reachable again (capacity overflow, discarded redo branch,
/// or a merge into the saved entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SavePoint {
    At(i64),
    Lost,
}

impl SavePoint {
    fn step(&mut self, delta: i64) {
        if let Self::At(d) = self {
            *d += delta;
        }
    }

    fn is_current(self) -> bool {
        self == Self::At(0)
    }
}

/// Undo/redo history for one [`Editable`] target.
///
/// The undo stack is bounded by `max_undo`; the oldest entry falls off the
/// front when it overflows.
///
/// ```ignore
/// let mut history = EditActionHistory::new(DEFAULT_MAX_UNDO);
/// history.execute(Box::new(AddLight::new(LightKind::Spot)), &mut registry)?;
/// history.undo(&mut registry)?;
/// history.redo(&mut registry)?;
/// ```
pub struct EditActionHistory<T: Editable> {
    undo_stack: VecDeque<Box<dyn EditAction<T>>>,
    redo_stack: Vec<Box<dyn EditAction<T>>>,
    max_undo: usize,
    merge_broken: bool,
    save_point: SavePoint,
}

impl<T: Editable> EditActionHistory<T> {
    /// Creates an empty history holding at most `max_undo` undo steps.
    ///
    /// A fresh history counts as saved.
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo,
            merge_broken: false,
            save_point: SavePoint::At(0),
        }
    }

    /// Applies `action` to `target` and records it.
    ///
    /// A recorded action clears the redo stack and first tries to merge
    /// into the newest undo entry, unless a merge-breaking action ran in
    /// between. A non-recorded action is applied and dropped.
    ///
    /// An action whose `apply` fails leaves the history untouched.
    pub fn execute(
        &mut self,
        mut action: Box<dyn EditAction<T>>,
        target: &mut T,
    ) -> EditActionResult {
        action.apply(target)?;

        if !action.is_recorded() {
            self.merge_broken |= action.breaks_merge();
            return Ok(());
        }

        let is_content = action.modifies_content();
        self.redo_stack.clear();
        if is_content && matches!(self.save_point, SavePoint::At(d) if d < 0) {
            self.save_point = SavePoint::Lost;
        }

        if !self.merge_broken
            && let Some(last) = self.undo_stack.back_mut()
        {
            match last.merge(action) {
                None => {
                    if is_content && self.save_point.is_current() {
                        self.save_point = SavePoint::Lost;
                    }
                    log::trace!("merged edit into \"{}\"", last.description());
                    return Ok(());
                }
                Some(returned) => action = returned,
            }
        }
        self.merge_broken = false;

        if is_content {
            self.save_point.step(1);
        }
        log::trace!("recorded edit \"{}\"", action.description());
        self.undo_stack.push_back(action);
        self.enforce_capacity();
        Ok(())
    }

    /// Undoes the newest recorded action.
    ///
    /// Fails when there is nothing to undo or the action's `undo` fails.
    pub fn undo(&mut self, target: &mut T) -> EditActionResult {
        let mut action = self
            .undo_stack
            .pop_back()
            .ok_or_else(|| EditActionError::Custom("nothing to undo".into()))?;
        if let Err(e) = action.undo(target) {
            self.undo_stack.push_back(action);
            return Err(e);
        }
        if action.modifies_content() {
            self.save_point.step(-1);
        }
        log::debug!("undo \"{}\"", action.description());
        self.redo_stack.push(action);
        Ok(())
    }

    /// Re-applies the most recently undone action.
    ///
    /// Fails when there is nothing to redo or the action's `apply` fails.
    pub fn redo(&mut self, target: &mut T) -> EditActionResult {
        let mut action = self
            .redo_stack
            .pop()
            .ok_or_else(|| EditActionError::Custom("nothing to redo".into()))?;
        if let Err(e) = action.apply(target) {
            self.redo_stack.push(action);
            return Err(e);
        }
        if action.modifies_content() {
            self.save_point.step(1);
        }
        log::debug!("redo \"{}\"", action.description());
        self.undo_stack.push_back(action);
        self.enforce_capacity();
        Ok(())
    }

    fn enforce_capacity(&mut self) {
        while self.undo_stack.len() > self.max_undo {
            self.undo_stack.pop_front();
        }
        if matches!(self.save_point, SavePoint::At(d) if d > self.undo_stack.len() as i64) {
            self.save_point = SavePoint::Lost;
        }
    }

    /// Returns `true` if there is an action to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns `true` if there is an action to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo descriptions, newest first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.undo_stack.iter().rev().map(|a| a.description())
    }

    /// Redo descriptions, next-to-redo first.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.redo_stack.iter().rev().map(|a| a.description())
    }

    /// Number of undo steps available.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redo steps available.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Maximum undo depth.
    pub fn max_undo(&self) -> usize {
        self.max_undo
    }

    /// Marks the current state as saved.
    pub fn mark_saved(&mut self) {
        self.save_point = SavePoint::At(0);
    }

    /// Returns `true` unless the target is exactly at the last save point.
    pub fn has_unsaved_changes(&self) -> bool {
        !self.save_point.is_current()
    }

    /// Drops both stacks.
    ///
    /// A target sitting at its save point stays saved; any other save
    /// point becomes unreachable.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.merge_broken = false;
        if !self.save_point.is_current() {
            self.save_point = SavePoint::Lost;
        }
    }
}

impl<T: Editable> fmt::Debug for EditActionHistory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditActionHistory")
            .field("undo_count", &self.undo_stack.len())
            .field("redo_count", &self.redo_stack.len())
            .field("max_undo", &self.max_undo)
            .field("merge_broken", &self.merge_broken)
            .field("save_point", &self.save_point)
            .finish()
    }
}
