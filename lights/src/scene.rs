//! RON scene files.
//!
//! A scene file is a pretty-printed [`RegistrySnapshot`]. Missing fields
//! take their defaults, and loaded records go through
//! [`LightRegistry::restore`](crate::registry::LightRegistry::restore), so a
//! hand-edited file cannot break record invariants.

use std::fs;
use std::path::Path;

use crate::registry::RegistrySnapshot;

/// Errors from reading or writing scene files.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("scene I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize scene: {0}")]
    Serialize(#[from] ron::Error),
    #[error("failed to parse scene: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Encodes a snapshot as pretty RON.
pub fn to_ron_string(snapshot: &RegistrySnapshot) -> Result<String, SceneError> {
    Ok(ron::ser::to_string_pretty(
        snapshot,
        ron::ser::PrettyConfig::default(),
    )?)
}

/// Decodes a snapshot. The result is not sanitized until restored.
pub fn from_ron_str(source: &str) -> Result<RegistrySnapshot, SceneError> {
    Ok(ron::from_str(source)?)
}

pub fn read_scene(path: impl AsRef<Path>) -> Result<RegistrySnapshot, SceneError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)?;
    let snapshot = from_ron_str(&source)?;
    log::info!(
        "read {} lights from {}",
        snapshot.lights.len(),
        path.display()
    );
    Ok(snapshot)
}

pub fn write_scene(path: impl AsRef<Path>, snapshot: &RegistrySnapshot) -> Result<(), SceneError> {
    let path = path.as_ref();
    fs::write(path, to_ron_string(snapshot)?)?;
    log::info!(
        "wrote {} lights to {}",
        snapshot.lights.len(),
        path.display()
    );
    Ok(())
}
