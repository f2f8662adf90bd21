//! Undo/redo framework for reversible edits.
//!
//! The types here know nothing about lights: an [`Editable`] target is
//! mutated only through [`EditAction`] commands, and an
//! [`EditActionHistory`] keeps the undo and redo stacks for it.
//!
//! # Recorded vs non-recorded actions
//!
//! Actions are **recorded** by default. Override [`EditAction::is_recorded`]
//! to return `false` for transient operations that must not be undoable.
//!
//! A recorded action may return `false` from [`EditAction::modifies_content`]
//! when it only changes editor state (selection, for example). Such actions
//! are undoable but leave the save point alone, so
//! [`EditActionHistory::has_unsaved_changes`] ignores them.
//!
//! A non-recorded action may **break the merge chain** by returning `true`
//! from [`EditAction::breaks_merge`]. The next recorded action then starts a
//! fresh undo entry instead of merging into the previous one. Gizmo drags
//! use this so that two back-to-back drags of the same light stay separate.

mod action;
mod history;

pub use action::{AsAny, EditAction, EditActionError, EditActionResult, Editable};
pub use history::{DEFAULT_MAX_UNDO, EditActionHistory};
