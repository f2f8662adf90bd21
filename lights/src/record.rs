//! Light records and their value types.
//!
//! A [`LightRecord`] is plain data. Every invariant listed on it is upheld
//! by the [`LightRegistry`](crate::LightRegistry) operations that mutate
//! records; [`LightRecord::sanitized`] re-establishes them for records that
//! come from outside (scene files).

use std::f32::consts::{FRAC_PI_3, PI};
use std::fmt;
use std::str::FromStr;

use lumen_core::math::{floor_vec3, quat_from_euler, sanitize_vec3, wrap_euler};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest allowed scale component.
pub const MIN_SCALE: f32 = 0.1;
/// Smallest allowed influence radius.
pub const MIN_RADIUS: f32 = 0.1;
/// Smallest allowed power.
pub const MIN_POWER: f32 = 0.0;
/// Largest allowed spot cone half-angle.
pub const MAX_SPOT_ANGLE: f32 = PI;

pub const DEFAULT_POSITION: [f32; 3] = [0.0, 5.0, 0.0];
pub const DEFAULT_POWER: f32 = 1000.0;
pub const DEFAULT_RADIUS: f32 = 5.0;
pub const DEFAULT_SHADOW_BIAS: f32 = -0.001;
pub const DEFAULT_SHADOW_RADIUS: f32 = 1.0;
pub const DEFAULT_SPOT_ANGLE: f32 = FRAC_PI_3;
pub const DEFAULT_PENUMBRA: f32 = 0.5;

/// Opaque, unique identifier of a light record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LightId(Uuid);

impl LightId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for LightId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Returned when a keyword does not name a light kind or area shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what} {value:?}")]
pub struct UnknownVariant {
    pub(crate) what: &'static str,
    pub(crate) value: String,
}

/// The kind of a light. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    Point,
    Spot,
    Directional,
    Area,
}

impl LightKind {
    pub const ALL: [LightKind; 4] = [Self::Point, Self::Spot, Self::Directional, Self::Area];

    /// Lowercase keyword, as used in scene files and scripts.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Spot => "spot",
            Self::Directional => "directional",
            Self::Area => "area",
        }
    }
}

impl fmt::Display for LightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for LightKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant {
                what: "light kind",
                value: s.to_string(),
            })
    }
}

/// Emitter shape of an area light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaShape {
    #[default]
    Rectangle,
    Circle,
    Ellipse,
}

impl AreaShape {
    pub const ALL: [AreaShape; 3] = [Self::Rectangle, Self::Circle, Self::Ellipse];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Ellipse => "ellipse",
        }
    }
}

impl FromStr for AreaShape {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|shape| shape.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant {
                what: "area shape",
                value: s.to_string(),
            })
    }
}

/// Which ray categories see the light. All four flags always exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RayVisibility {
    pub diffuse: bool,
    pub glossy: bool,
    pub transmission: bool,
    pub volume_scatter: bool,
}

impl Default for RayVisibility {
    fn default() -> Self {
        Self {
            diffuse: true,
            glossy: true,
            transmission: true,
            volume_scatter: true,
        }
    }
}

/// Returned by [`Color::from_str`] for malformed hex strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex color {0:?}: expected #rgb or #rrggbb")]
pub struct ColorParseError(String);

/// An sRGB color, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear-ish float triple in `[0, 1]`, for renderers.
    pub fn to_f32_array(self) -> [f32; 3] {
        [self.r, self.g, self.b].map(|c| f32::from(c) / 255.0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());
        match hex.len() {
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            // #abc expands to #aabbcc
            3 => {
                let [r, g, b] = [0, 1, 2].map(|i| channel(&hex[i..i + 1]));
                Ok(Self::rgb(r? * 0x11, g? * 0x11, b? * 0x11))
            }
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Position, Euler rotation (radians) and scale of a light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightTransform {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for LightTransform {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION,
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

/// A single configurable light source.
///
/// Invariants (see [`satisfies_invariants`](Self::satisfies_invariants)):
/// - vectors hold finite values; rotation lies in `(-π, π]`; scale ≥ 0.1
/// - `power` ≥ 0, `radius` ≥ 0.1, `angle` ∈ `[0, π]`, `penumbra` ∈ `[0, 1]`
/// - `shape` is `Some` exactly when `kind` is [`LightKind::Area`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightRecord {
    pub id: LightId,
    /// Display label. Empty means unnamed.
    pub name: String,
    pub kind: LightKind,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub power: f32,
    pub color: Color,
    /// Influence / falloff distance.
    pub radius: f32,
    pub soft_falloff: bool,
    pub shadow: bool,
    pub shadow_bias: f32,
    pub shadow_radius: f32,
    /// Spot cone half-angle in radians.
    pub angle: f32,
    /// Spot edge softness.
    pub penumbra: f32,
    pub ray_visibility: RayVisibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<AreaShape>,
}

impl LightRecord {
    /// A light of `kind` with a fresh id and the editor defaults.
    pub fn new(kind: LightKind) -> Self {
        let transform = LightTransform::default();
        Self {
            id: LightId::new(),
            name: String::new(),
            kind,
            position: transform.position,
            rotation: transform.rotation,
            scale: transform.scale,
            power: DEFAULT_POWER,
            color: Color::WHITE,
            radius: DEFAULT_RADIUS,
            soft_falloff: true,
            shadow: true,
            shadow_bias: DEFAULT_SHADOW_BIAS,
            shadow_radius: DEFAULT_SHADOW_RADIUS,
            angle: DEFAULT_SPOT_ANGLE,
            penumbra: DEFAULT_PENUMBRA,
            ray_visibility: RayVisibility::default(),
            shape: (kind == LightKind::Area).then_some(AreaShape::Rectangle),
        }
    }

    pub fn transform(&self) -> LightTransform {
        LightTransform {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    pub(crate) fn set_transform(&mut self, transform: LightTransform) {
        self.position = transform.position;
        self.rotation = transform.rotation;
        self.scale = transform.scale;
    }

    /// Rotation as a quaternion `[x, y, z, w]`, for attaching gizmos.
    pub fn rotation_quat(&self) -> [f32; 4] {
        quat_from_euler(self.rotation)
    }

    /// Returns the record with every invariant re-established.
    ///
    /// Non-finite scalars fall back to their defaults; everything else is
    /// clamped, floored or wrapped like a regular update would do.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.position = sanitize_vec3(&self.position, 0.0);
        self.rotation = wrap_euler(sanitize_vec3(&self.rotation, 0.0));
        self.scale = floor_vec3(sanitize_vec3(&self.scale, 1.0), MIN_SCALE);
        self.power = finite_or(self.power, DEFAULT_POWER).max(MIN_POWER);
        self.radius = finite_or(self.radius, DEFAULT_RADIUS).max(MIN_RADIUS);
        self.shadow_bias = finite_or(self.shadow_bias, DEFAULT_SHADOW_BIAS);
        self.shadow_radius = finite_or(self.shadow_radius, DEFAULT_SHADOW_RADIUS);
        self.angle = finite_or(self.angle, DEFAULT_SPOT_ANGLE).clamp(0.0, MAX_SPOT_ANGLE);
        self.penumbra = finite_or(self.penumbra, DEFAULT_PENUMBRA).clamp(0.0, 1.0);
        self.shape = match self.kind {
            LightKind::Area => Some(self.shape.unwrap_or_default()),
            _ => None,
        };
        self
    }

    /// Checks every per-record invariant.
    pub fn satisfies_invariants(&self) -> bool {
        let all_finite = |v: &[f32; 3]| v.iter().all(|c| c.is_finite());
        all_finite(&self.position)
            && all_finite(&self.rotation)
            && self.rotation.iter().all(|r| *r > -PI && *r <= PI)
            && all_finite(&self.scale)
            && self.scale.iter().all(|s| *s >= MIN_SCALE)
            && self.power.is_finite()
            && self.power >= MIN_POWER
            && self.radius.is_finite()
            && self.radius >= MIN_RADIUS
            && self.shadow_bias.is_finite()
            && self.shadow_radius.is_finite()
            && (0.0..=MAX_SPOT_ANGLE).contains(&self.angle)
            && (0.0..=1.0).contains(&self.penumbra)
            && self.shape.is_some() == (self.kind == LightKind::Area)
    }
}

impl Default for LightRecord {
    fn default() -> Self {
        Self::new(LightKind::Point)
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_for_point() {
        let light = LightRecord::new(LightKind::Point);
        assert_eq!(light.position, [0.0, 5.0, 0.0]);
        assert_eq!(light.rotation, [0.0; 3]);
        assert_eq!(light.scale, [1.0; 3]);
        assert_eq!(light.power, 1000.0);
        assert_eq!(light.color, Color::WHITE);
        assert_eq!(light.radius, 5.0);
        assert!(light.soft_falloff && light.shadow);
        assert_eq!(light.shadow_bias, -0.001);
        assert_eq!(light.shadow_radius, 1.0);
        assert_eq!(light.angle, FRAC_PI_3);
        assert_eq!(light.penumbra, 0.5);
        assert_eq!(light.ray_visibility, RayVisibility::default());
        assert_eq!(light.shape, None);
        assert!(light.name.is_empty());
        assert!(light.satisfies_invariants());
    }

    #[test]
    fn area_defaults_to_rectangle() {
        let light = LightRecord::new(LightKind::Area);
        assert_eq!(light.shape, Some(AreaShape::Rectangle));
    }

    #[test]
    fn fresh_ids_differ() {
        assert_ne!(LightRecord::new(LightKind::Spot).id, LightRecord::new(LightKind::Spot).id);
    }

    #[test]
    fn kind_keywords() {
        for kind in LightKind::ALL {
            assert_eq!(kind.as_str().parse::<LightKind>(), Ok(kind));
        }
        assert_eq!("SPOT".parse::<LightKind>(), Ok(LightKind::Spot));
        let err = "laser".parse::<LightKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown light kind \"laser\"");
    }

    #[test]
    fn shape_keywords() {
        assert_eq!("ellipse".parse::<AreaShape>(), Ok(AreaShape::Ellipse));
        assert!("square".parse::<AreaShape>().is_err());
    }

    #[test]
    fn color_parsing() {
        assert_eq!("#ffb74d".parse::<Color>(), Ok(Color::rgb(0xff, 0xb7, 0x4d)));
        assert_eq!("#FF5F6D".parse::<Color>(), Ok(Color::rgb(0xff, 0x5f, 0x6d)));
        assert_eq!("#fff".parse::<Color>(), Ok(Color::WHITE));
        assert!("ffffff".parse::<Color>().is_err());
        assert!("#ffff".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
        assert!("#ééé".parse::<Color>().is_err());
    }

    #[test]
    fn color_rejects_signed_digits() {
        assert!("#+f+f+f".parse::<Color>().is_err());
        assert!("#+ff".parse::<Color>().is_err());
        assert!("#-1-1-1".parse::<Color>().is_err());
    }

    #[test]
    fn color_display_is_lowercase_hex() {
        assert_eq!(Color::rgb(0x64, 0xB5, 0xF6).to_string(), "#64b5f6");
        assert_eq!(String::from(Color::WHITE), "#ffffff");
    }

    #[test]
    fn color_floats() {
        assert_eq!(Color::WHITE.to_f32_array(), [1.0; 3]);
        assert_eq!(Color::rgb(0, 0, 0).to_f32_array(), [0.0; 3]);
    }

    #[test]
    fn sanitized_repairs_everything() {
        let mut light = LightRecord::new(LightKind::Point);
        light.position = [f32::NAN, 1.0, 2.0];
        light.rotation = [4.0, f32::INFINITY, -PI];
        light.scale = [0.0, -3.0, 2.0];
        light.power = -5.0;
        light.radius = f32::NAN;
        light.angle = 9.0;
        light.penumbra = -1.0;
        light.shadow_bias = f32::NEG_INFINITY;
        light.shape = Some(AreaShape::Circle);
        assert!(!light.satisfies_invariants());

        let fixed = light.sanitized();
        assert!(fixed.satisfies_invariants());
        assert_eq!(fixed.position, [0.0, 1.0, 2.0]);
        assert_eq!(fixed.rotation[1], 0.0);
        assert_eq!(fixed.rotation[2], PI);
        assert_eq!(fixed.scale, [0.1, 0.1, 2.0]);
        assert_eq!(fixed.power, 0.0);
        assert_eq!(fixed.radius, DEFAULT_RADIUS);
        assert_eq!(fixed.angle, PI);
        assert_eq!(fixed.penumbra, 0.0);
        assert_eq!(fixed.shadow_bias, DEFAULT_SHADOW_BIAS);
        assert_eq!(fixed.shape, None);
    }

    #[test]
    fn sanitized_gives_area_a_shape() {
        let mut light = LightRecord::new(LightKind::Area);
        light.shape = None;
        assert_eq!(light.sanitized().shape, Some(AreaShape::Rectangle));
    }

    #[test]
    fn transform_round_trip() {
        let mut light = LightRecord::new(LightKind::Spot);
        let transform = LightTransform {
            position: [1.0, 2.0, 3.0],
            rotation: [0.1, 0.2, 0.3],
            scale: [2.0; 3],
        };
        light.set_transform(transform);
        assert_eq!(light.transform(), transform);
    }

    #[test]
    fn identity_rotation_quat() {
        let light = LightRecord::new(LightKind::Directional);
        assert_eq!(light.rotation_quat(), [0.0, 0.0, 0.0, 1.0]);
    }
}
