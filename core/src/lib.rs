//! # Lumen Core
//!
//! Core crate for the Lumen light editor: the undo/redo edit framework and
//! the math helpers shared by the light registry and its gizmos.

pub mod abstract_editor;
pub mod math;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
