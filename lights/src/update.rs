//! Partial updates and their validation.
//!
//! An update names only the fields it changes. Applying one never fails:
//! malformed numbers are coerced to the nearest valid value, or dropped when
//! no sensible value exists.

use lumen_core::math::{floor_vec3, sanitize_vec3, wrap_euler};

use crate::record::{
    AreaShape, Color, LightKind, LightRecord, MAX_SPOT_ANGLE, MIN_POWER, MIN_RADIUS, MIN_SCALE,
};

bitflags::bitflags! {
    /// The set of fields a [`PropertyUpdate`] touches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropertyFields: u16 {
        const NAME = 1 << 0;
        const POWER = 1 << 1;
        const COLOR = 1 << 2;
        const RADIUS = 1 << 3;
        const SOFT_FALLOFF = 1 << 4;
        const SHADOW = 1 << 5;
        const SHADOW_BIAS = 1 << 6;
        const SHADOW_RADIUS = 1 << 7;
        const ANGLE = 1 << 8;
        const PENUMBRA = 1 << 9;
        const RAY_VISIBILITY = 1 << 10;
        const SHAPE = 1 << 11;
    }
}

/// New values for any of position, rotation and scale.
///
/// Components are taken as loose slices: input of the wrong length or with
/// non-finite entries is coerced rather than rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformUpdate {
    pub position: Option<Vec<f32>>,
    pub rotation: Option<Vec<f32>>,
    pub scale: Option<Vec<f32>>,
}

impl TransformUpdate {
    #[must_use]
    pub fn with_position(mut self, position: impl Into<Vec<f32>>) -> Self {
        self.position = Some(position.into());
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: impl Into<Vec<f32>>) -> Self {
        self.rotation = Some(rotation.into());
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: impl Into<Vec<f32>>) -> Self {
        self.scale = Some(scale.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.rotation.is_none() && self.scale.is_none()
    }

    /// Applies the update to `record`, returning whether anything changed.
    pub(crate) fn apply_to(&self, record: &mut LightRecord) -> bool {
        let before = record.transform();
        if let Some(input) = &self.position {
            record.position = coerce_vec3(record, "position", input, 0.0);
        }
        if let Some(input) = &self.rotation {
            record.rotation = wrap_euler(coerce_vec3(record, "rotation", input, 0.0));
        }
        if let Some(input) = &self.scale {
            record.scale = floor_vec3(coerce_vec3(record, "scale", input, 1.0), MIN_SCALE);
        }
        record.transform() != before
    }
}

fn coerce_vec3(record: &LightRecord, field: &str, input: &[f32], default: f32) -> [f32; 3] {
    let out = sanitize_vec3(input, default);
    if input.len() != 3 || input.iter().any(|c| !c.is_finite()) {
        log::warn!("light {}: {field} {input:?} coerced to {out:?}", record.id);
    }
    out
}

/// Per-flag changes to [`RayVisibility`](crate::RayVisibility).
///
/// Flags left as `None` keep the light's current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RayVisibilityUpdate {
    pub diffuse: Option<bool>,
    pub glossy: Option<bool>,
    pub transmission: Option<bool>,
    pub volume_scatter: Option<bool>,
}

/// New values for any subset of a light's properties.
///
/// ```ignore
/// registry.update_properties(id, &PropertyUpdate {
///     power: Some(1500.0),
///     shadow: Some(false),
///     ..Default::default()
/// });
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyUpdate {
    pub name: Option<String>,
    pub power: Option<f32>,
    pub color: Option<Color>,
    pub radius: Option<f32>,
    pub soft_falloff: Option<bool>,
    pub shadow: Option<bool>,
    pub shadow_bias: Option<f32>,
    pub shadow_radius: Option<f32>,
    pub angle: Option<f32>,
    pub penumbra: Option<f32>,
    pub ray_visibility: Option<RayVisibilityUpdate>,
    /// Only honoured for area lights.
    pub shape: Option<AreaShape>,
}

impl PropertyUpdate {
    /// The fields this update sets.
    pub fn fields(&self) -> PropertyFields {
        let mut fields = PropertyFields::empty();
        fields.set(PropertyFields::NAME, self.name.is_some());
        fields.set(PropertyFields::POWER, self.power.is_some());
        fields.set(PropertyFields::COLOR, self.color.is_some());
        fields.set(PropertyFields::RADIUS, self.radius.is_some());
        fields.set(PropertyFields::SOFT_FALLOFF, self.soft_falloff.is_some());
        fields.set(PropertyFields::SHADOW, self.shadow.is_some());
        fields.set(PropertyFields::SHADOW_BIAS, self.shadow_bias.is_some());
        fields.set(PropertyFields::SHADOW_RADIUS, self.shadow_radius.is_some());
        fields.set(PropertyFields::ANGLE, self.angle.is_some());
        fields.set(PropertyFields::PENUMBRA, self.penumbra.is_some());
        fields.set(PropertyFields::RAY_VISIBILITY, self.ray_visibility.is_some());
        fields.set(PropertyFields::SHAPE, self.shape.is_some());
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Applies the update to `record`, returning whether anything changed.
    pub(crate) fn apply_to(&self, record: &mut LightRecord) -> bool {
        let before = record.clone();
        let id = record.id;
        let finite = |field: &str, value: Option<f32>| match value {
            Some(v) if !v.is_finite() => {
                log::warn!("light {id}: ignoring non-finite {field} {v}");
                None
            }
            other => other,
        };

        if let Some(name) = &self.name {
            record.name.clone_from(name);
        }
        if let Some(power) = finite("power", self.power) {
            record.power = power.max(MIN_POWER);
        }
        if let Some(color) = self.color {
            record.color = color;
        }
        if let Some(radius) = finite("radius", self.radius) {
            record.radius = radius.max(MIN_RADIUS);
        }
        if let Some(soft_falloff) = self.soft_falloff {
            record.soft_falloff = soft_falloff;
        }
        if let Some(shadow) = self.shadow {
            record.shadow = shadow;
        }
        if let Some(bias) = finite("shadow bias", self.shadow_bias) {
            record.shadow_bias = bias;
        }
        if let Some(radius) = finite("shadow radius", self.shadow_radius) {
            record.shadow_radius = radius;
        }
        if let Some(angle) = finite("angle", self.angle) {
            record.angle = angle.clamp(0.0, MAX_SPOT_ANGLE);
        }
        if let Some(penumbra) = finite("penumbra", self.penumbra) {
            record.penumbra = penumbra.clamp(0.0, 1.0);
        }
        if let Some(rays) = self.ray_visibility {
            let current = &mut record.ray_visibility;
            current.diffuse = rays.diffuse.unwrap_or(current.diffuse);
            current.glossy = rays.glossy.unwrap_or(current.glossy);
            current.transmission = rays.transmission.unwrap_or(current.transmission);
            current.volume_scatter = rays.volume_scatter.unwrap_or(current.volume_scatter);
        }
        if let Some(shape) = self.shape {
            if record.kind == LightKind::Area {
                record.shape = Some(shape);
            } else {
                log::debug!("light {id}: shape ignored for {} light", record.kind);
            }
        }

        *record != before
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;
    use crate::record::RayVisibility;

    #[test]
    fn transform_fields_are_independent() {
        let mut light = LightRecord::new(LightKind::Point);
        let changed = TransformUpdate::default()
            .with_position([1.0, 2.0, 3.0])
            .apply_to(&mut light);
        assert!(changed);
        assert_eq!(light.position, [1.0, 2.0, 3.0]);
        assert_eq!(light.rotation, [0.0; 3]);
        assert_eq!(light.scale, [1.0; 3]);
    }

    #[test]
    fn empty_transform_changes_nothing() {
        let mut light = LightRecord::new(LightKind::Point);
        assert!(TransformUpdate::default().is_empty());
        assert!(!TransformUpdate::default().apply_to(&mut light));
    }

    #[test]
    fn wrong_length_uses_field_default() {
        let mut light = LightRecord::new(LightKind::Point);
        TransformUpdate::default()
            .with_position(vec![1.0])
            .with_rotation(Vec::new())
            .with_scale(vec![2.0, 2.0, 2.0, 2.0])
            .apply_to(&mut light);
        assert_eq!(light.position, [0.0; 3]);
        assert_eq!(light.rotation, [0.0; 3]);
        assert_eq!(light.scale, [1.0; 3]);
    }

    #[test]
    fn scale_is_floored() {
        let mut light = LightRecord::new(LightKind::Point);
        TransformUpdate::default()
            .with_scale([0.0, -1.0, f32::NAN])
            .apply_to(&mut light);
        assert_eq!(light.scale, [0.1, 0.1, 1.0]);
    }

    #[test]
    fn rotation_is_wrapped() {
        let mut light = LightRecord::new(LightKind::Point);
        TransformUpdate::default()
            .with_rotation([-PI, f32::INFINITY, 2.0 * PI + 0.5])
            .apply_to(&mut light);
        assert_eq!(light.rotation[0], PI);
        assert_eq!(light.rotation[1], 0.0);
        assert!((light.rotation[2] - 0.5).abs() < 1e-5);
    }

    #[test]
    fn power_floor_and_angle_clamp() {
        let mut light = LightRecord::new(LightKind::Spot);
        PropertyUpdate {
            power: Some(-50.0),
            angle: Some(10.0),
            penumbra: Some(3.0),
            radius: Some(0.0),
            ..Default::default()
        }
        .apply_to(&mut light);
        assert_eq!(light.power, 0.0);
        assert_eq!(light.angle, PI);
        assert_eq!(light.penumbra, 1.0);
        assert_eq!(light.radius, 0.1);
    }

    #[test]
    fn non_finite_numbers_are_ignored() {
        let mut light = LightRecord::new(LightKind::Spot);
        let changed = PropertyUpdate {
            power: Some(f32::NAN),
            shadow_bias: Some(f32::INFINITY),
            ..Default::default()
        }
        .apply_to(&mut light);
        assert!(!changed);
        assert_eq!(light.power, 1000.0);
        assert!(light.satisfies_invariants());
    }

    #[test]
    fn ray_visibility_merges_over_current() {
        let mut light = LightRecord::new(LightKind::Point);
        let update = |rays| PropertyUpdate {
            ray_visibility: Some(rays),
            ..Default::default()
        };
        update(RayVisibilityUpdate {
            glossy: Some(false),
            ..Default::default()
        })
        .apply_to(&mut light);
        update(RayVisibilityUpdate {
            diffuse: Some(false),
            ..Default::default()
        })
        .apply_to(&mut light);
        assert_eq!(
            light.ray_visibility,
            RayVisibility {
                diffuse: false,
                glossy: false,
                transmission: true,
                volume_scatter: true,
            }
        );
    }

    #[test]
    fn shape_only_for_area_lights() {
        let circle = PropertyUpdate {
            shape: Some(AreaShape::Circle),
            ..Default::default()
        };
        let mut area = LightRecord::new(LightKind::Area);
        assert!(circle.apply_to(&mut area));
        assert_eq!(area.shape, Some(AreaShape::Circle));

        let mut point = LightRecord::new(LightKind::Point);
        assert!(!circle.apply_to(&mut point));
        assert_eq!(point.shape, None);
    }

    #[test]
    fn name_color_and_flags() {
        let mut light = LightRecord::new(LightKind::Directional);
        PropertyUpdate {
            name: Some("Sun".into()),
            color: Some(Color::rgb(0xff, 0xc3, 0x71)),
            soft_falloff: Some(false),
            shadow: Some(false),
            shadow_radius: Some(3.0),
            ..Default::default()
        }
        .apply_to(&mut light);
        assert_eq!(light.name, "Sun");
        assert_eq!(light.color.to_string(), "#ffc371");
        assert!(!light.soft_falloff && !light.shadow);
        assert_eq!(light.shadow_radius, 3.0);
    }

    #[test]
    fn field_sets() {
        let update = PropertyUpdate {
            power: Some(1.0),
            color: Some(Color::WHITE),
            ..Default::default()
        };
        assert_eq!(update.fields(), PropertyFields::POWER | PropertyFields::COLOR);
        assert!(PropertyUpdate::default().is_empty());
    }
}
