//! Edit targets and reversible edit commands.
//!
//! An [`EditAction`] carries everything it needs to redo and undo itself:
//! the ids it touches, the values it replaced, the values it wrote.

use std::any::Any;
use std::fmt;

/// Downcasting helper for action trait objects.
///
/// Blanket-implemented for every `'static` type. [`EditAction::merge`]
/// uses it to recover the concrete type of the incoming action.
pub trait AsAny: 'static {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Marker trait for values that edit actions operate on.
pub trait Editable: 'static {}

/// Why an action could not be applied or undone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditActionError {
    /// The object the action refers to does not exist.
    #[error("target not found: {0}")]
    TargetNotFound(String),
    /// The target exists but cannot take this action right now.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Anything else, described in prose.
    #[error("{0}")]
    Custom(String),
}

/// Result type for action operations.
pub type EditActionResult<T = ()> = Result<T, EditActionError>;

/// A reversible edit (Command pattern).
///
/// The trait is dyn-compatible so heterogeneous actions can share one
/// history as `Box<dyn EditAction<T>>`.
///
/// # Merging
///
/// Incremental edits such as the individual steps of a gizmo drag can
/// override [`merge`](Self::merge) to fold a newer action into an older
/// one. The history then holds a single undo entry for the whole gesture.
///
/// ```ignore
/// fn merge(
///     &mut self,
///     other: Box<dyn EditAction<LightRegistry>>,
/// ) -> Option<Box<dyn EditAction<LightRegistry>>> {
///     match (*other).as_any().downcast_ref::<Self>() {
///         Some(next) if next.id == self.id => {
///             self.after = next.after;
///             None
///         }
///         _ => Some(other),
///     }
/// }
/// ```
pub trait EditAction<T: Editable>: fmt::Debug + AsAny + Send {
    /// Applies the action (forward and redo direction).
    fn apply(&mut self, target: &mut T) -> EditActionResult;

    /// Restores the target to its state before [`apply`](Self::apply).
    fn undo(&mut self, target: &mut T) -> EditActionResult;

    /// Short label for history menus, e.g. `"Move light"`.
    fn description(&self) -> &str;

    /// Tries to absorb `other`, which has already been applied.
    ///
    /// Returns `None` when `other` was consumed, or hands it back
    /// unchanged. The default never merges.
    fn merge(&mut self, other: Box<dyn EditAction<T>>) -> Option<Box<dyn EditAction<T>>> {
        Some(other)
    }

    /// Whether the action goes onto the undo stack. Default: `true`.
    fn is_recorded(&self) -> bool {
        true
    }

    /// Whether a non-recorded action separates the surrounding recorded
    /// actions so they cannot merge. Default: `false`.
    fn breaks_merge(&self) -> bool {
        false
    }

    /// Whether the action changes document content, as opposed to editor
    /// state such as the selection. Default: `true`.
    fn modifies_content(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dimmer {
        level: i32,
    }

    impl Editable for Dimmer {}

    #[derive(Debug)]
    struct Brighten {
        step: i32,
    }

    impl EditAction<Dimmer> for Brighten {
        fn apply(&mut self, target: &mut Dimmer) -> EditActionResult {
            target.level += self.step;
            Ok(())
        }

        fn undo(&mut self, target: &mut Dimmer) -> EditActionResult {
            target.level -= self.step;
            Ok(())
        }

        fn description(&self) -> &str {
            "Brighten"
        }
    }

    #[derive(Debug)]
    struct Peek;

    impl EditAction<Dimmer> for Peek {
        fn apply(&mut self, _target: &mut Dimmer) -> EditActionResult {
            Ok(())
        }

        fn undo(&mut self, _target: &mut Dimmer) -> EditActionResult {
            unreachable!("non-recorded actions are never undone");
        }

        fn description(&self) -> &str {
            "Peek"
        }

        fn is_recorded(&self) -> bool {
            false
        }

        fn breaks_merge(&self) -> bool {
            true
        }

        fn modifies_content(&self) -> bool {
            false
        }
    }

    #[test]
    fn apply_then_undo_restores() {
        let mut dimmer = Dimmer { level: 2 };
        let mut action = Brighten { step: 3 };
        action.apply(&mut dimmer).unwrap();
        assert_eq!(dimmer.level, 5);
        action.undo(&mut dimmer).unwrap();
        assert_eq!(dimmer.level, 2);
    }

    #[test]
    fn defaults() {
        let action = Brighten { step: 1 };
        assert!(action.is_recorded());
        assert!(!action.breaks_merge());
        assert!(action.modifies_content());
        assert_eq!(action.description(), "Brighten");
    }

    #[test]
    fn overridden_flags() {
        let action = Peek;
        assert!(!action.is_recorded());
        assert!(action.breaks_merge());
        assert!(!action.modifies_content());
    }

    #[test]
    fn default_merge_hands_action_back() {
        let mut first = Brighten { step: 1 };
        let returned = first.merge(Box::new(Brighten { step: 2 }));
        assert!(returned.is_some());
        assert_eq!(first.step, 1);
    }

    #[test]
    fn boxed_actions_are_usable() {
        let mut dimmer = Dimmer { level: 0 };
        let mut boxed: Box<dyn EditAction<Dimmer>> = Box::new(Brighten { step: 4 });
        boxed.apply(&mut dimmer).unwrap();
        assert_eq!(dimmer.level, 4);
        assert!((*boxed).as_any().downcast_ref::<Brighten>().is_some());
    }

    #[test]
    fn error_display() {
        assert_eq!(
            EditActionError::TargetNotFound("light 7".into()).to_string(),
            "target not found: light 7"
        );
        assert_eq!(
            EditActionError::InvalidState("not an area light".into()).to_string(),
            "invalid state: not an area light"
        );
        assert_eq!(
            EditActionError::Custom("nothing to undo".into()).to_string(),
            "nothing to undo"
        );
    }
}
