//! # Lumen Lights
//!
//! State and editing for the lights of a Lumen scene.
//!
//! ## Data
//!
//! - [`LightRecord`]: one light, with its transform and lighting properties
//! - [`LightRegistry`]: the ordered list of lights and the selection
//! - [`TransformUpdate`] / [`PropertyUpdate`]: validated partial updates
//!
//! ## Editing
//!
//! - [`LightEditor`]: undoable facade over the registry
//! - [`actions`]: the reversible edits it records
//! - [`gizmo`]: transform modes, snapping and pose conversion
//! - [`panel`]: labels, slider ranges and lighting presets
//!
//! ## Persistence
//!
//! - [`scene`]: RON scene files (`serialize-ron` feature)

pub mod actions;
pub mod editor;
pub mod gizmo;
pub mod panel;
pub mod record;
pub mod registry;
#[cfg(feature = "serialize-ron")]
pub mod scene;
pub mod update;

pub use editor::LightEditor;
pub use gizmo::{GizmoPose, SnapSettings, TransformMode};
pub use panel::{LightingPreset, display_name};
pub use record::{
    AreaShape, Color, ColorParseError, LightId, LightKind, LightRecord, LightTransform,
    RayVisibility, UnknownVariant,
};
pub use registry::{ChangeKind, LightRegistry, RegistryChange, RegistrySnapshot, SubscriptionId};
pub use update::{PropertyFields, PropertyUpdate, RayVisibilityUpdate, TransformUpdate};
