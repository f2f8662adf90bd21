//! Transform gizmo state and pose conversion.
//!
//! A gizmo reports a full pose (position, orientation quaternion, scale).
//! [`GizmoPose::to_update`] turns it into a [`TransformUpdate`] that only
//! carries the field the active [`TransformMode`] manipulates.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use lumen_core::math::{euler_from_quat, floor_vec3, quat_from_euler, snap};
use serde::{Deserialize, Serialize};

use crate::record::{LightRecord, MIN_SCALE, UnknownVariant};
use crate::update::TransformUpdate;

/// Which transform the gizmo manipulates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl TransformMode {
    /// Maps the editor shortcut keys `G`, `R` and `S`.
    pub fn from_shortcut(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'g' => Some(Self::Translate),
            'r' => Some(Self::Rotate),
            's' => Some(Self::Scale),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Rotate => "rotate",
            Self::Scale => "scale",
        }
    }
}

impl fmt::Display for TransformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "translate" | "move" | "g" => Ok(Self::Translate),
            "rotate" | "r" => Ok(Self::Rotate),
            "scale" | "s" => Ok(Self::Scale),
            _ => Err(UnknownVariant {
                what: "transform mode",
                value: s.to_owned(),
            }),
        }
    }
}

/// Grid snapping for gizmo drags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    pub enabled: bool,
    /// World units.
    pub translation: f32,
    /// Radians.
    pub rotation: f32,
    pub scale: f32,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            translation: 0.25,
            rotation: PI / 24.0,
            scale: 0.1,
        }
    }
}

/// A pose reported by the gizmo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoPose {
    pub position: [f32; 3],
    /// Quaternion `[x, y, z, w]`.
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl GizmoPose {
    /// The pose a gizmo attached to `light` starts from.
    pub fn from_record(light: &LightRecord) -> Self {
        Self {
            position: light.position,
            rotation: quat_from_euler(light.rotation),
            scale: light.scale,
        }
    }

    /// Converts the pose to an update of the field `mode` controls.
    pub fn to_update(&self, mode: TransformMode, snapping: &SnapSettings) -> TransformUpdate {
        let step = |step: f32| if snapping.enabled { step } else { 0.0 };
        match mode {
            TransformMode::Translate => {
                let step = step(snapping.translation);
                TransformUpdate::default().with_position(self.position.map(|v| snap(v, step)))
            }
            TransformMode::Rotate => {
                let step = step(snapping.rotation);
                let euler = euler_from_quat(self.rotation).map(|v| snap(v, step));
                TransformUpdate::default().with_rotation(euler)
            }
            TransformMode::Scale => {
                let step = step(snapping.scale);
                let scale = self
                    .scale
                    .map(|v| if v.is_finite() { snap(v, step) } else { 1.0 });
                TransformUpdate::default().with_scale(floor_vec3(scale, MIN_SCALE))
            }
        }
    }
}
