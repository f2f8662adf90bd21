//! Values the side panel and light list are built from.

use std::f32::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use crate::record::{Color, LightRecord, UnknownVariant};
use crate::update::{PropertyUpdate, TransformUpdate};

/// List label: the light's name, or `"<kind> Light"` when unnamed.
pub fn display_name(light: &LightRecord) -> String {
    if light.name.is_empty() {
        format!("{} Light", light.kind)
    } else {
        light.name.clone()
    }
}

/// Slider bounds for one property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl PropertyRange {
    pub const POWER: Self = Self::new(0.0, 2000.0, 100.0);
    pub const RADIUS: Self = Self::new(0.1, 20.0, 0.1);
    /// Narrower than the stored range, which allows up to π.
    pub const ANGLE: Self = Self::new(0.1, FRAC_PI_2, 0.1);
    pub const PENUMBRA: Self = Self::new(0.0, 1.0, 0.1);
    pub const SHADOW_BIAS: Self = Self::new(-0.01, 0.0, 0.0001);
    pub const SHADOW_RADIUS: Self = Self::new(0.0, 10.0, 0.1);

    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    /// Clamps `value` into the slider range.
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

/// Quick-pick colors offered next to the color picker.
pub const COLOR_SWATCHES: [Color; 6] = [
    Color::rgb(0xff, 0x5f, 0x6d),
    Color::rgb(0xff, 0xc3, 0x71),
    Color::rgb(0xff, 0xff, 0xff),
    Color::rgb(0x64, 0xb5, 0xf6),
    Color::rgb(0x81, 0xc7, 0x84),
    Color::rgb(0xff, 0xb7, 0x4d),
];

pub const POWER_PRESETS: [f32; 5] = [100.0, 500.0, 1000.0, 1500.0, 2000.0];

pub const RADIUS_PRESETS: [f32; 5] = [1.0, 5.0, 10.0, 15.0, 20.0];

/// One-click color and power combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightingPreset {
    Warm,
    Cool,
    Bright,
    Dim,
}

impl LightingPreset {
    pub const ALL: [LightingPreset; 4] = [Self::Warm, Self::Cool, Self::Bright, Self::Dim];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warm => "warm",
            Self::Cool => "cool",
            Self::Bright => "bright",
            Self::Dim => "dim",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Warm => Color::rgb(0xff, 0xb7, 0x4d),
            Self::Cool => Color::rgb(0x64, 0xb5, 0xf6),
            Self::Bright => Color::WHITE,
            Self::Dim => Color::rgb(0xff, 0xf3, 0xe0),
        }
    }

    pub fn power(self) -> f32 {
        match self {
            Self::Warm | Self::Cool => 1000.0,
            Self::Bright => 2000.0,
            Self::Dim => 200.0,
        }
    }

    pub fn to_update(self) -> PropertyUpdate {
        PropertyUpdate {
            color: Some(self.color()),
            power: Some(self.power()),
            ..Default::default()
        }
    }
}

impl fmt::Display for LightingPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LightingPreset {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant {
                what: "lighting preset",
                value: s.to_owned(),
            })
    }
}

/// A row of the transform panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformField {
    Position,
    Rotation,
    Scale,
}

/// Builds the update for editing one axis of one transform row.
///
/// The other two axes keep the light's current values. Out-of-range axes
/// produce an empty update.
pub fn axis_edit(
    light: &LightRecord,
    field: TransformField,
    axis: usize,
    value: f32,
) -> TransformUpdate {
    let mut row = match field {
        TransformField::Position => light.position,
        TransformField::Rotation => light.rotation,
        TransformField::Scale => light.scale,
    };
    let Some(slot) = row.get_mut(axis) else {
        return TransformUpdate::default();
    };
    *slot = value;
    match field {
        TransformField::Position => TransformUpdate::default().with_position(row),
        TransformField::Rotation => TransformUpdate::default().with_rotation(row),
        TransformField::Scale => TransformUpdate::default().with_scale(row),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::record::LightKind;

    #[test]
    fn quick_pick_rows() {
        let swatches = COLOR_SWATCHES.map(|c| c.to_string());
        assert_eq!(
            swatches,
            ["#ff5f6d", "#ffc371", "#ffffff", "#64b5f6", "#81c784", "#ffb74d"]
        );
        assert_eq!(POWER_PRESETS, [100.0, 500.0, 1000.0, 1500.0, 2000.0]);
        assert_eq!(RADIUS_PRESETS, [1.0, 5.0, 10.0, 15.0, 20.0]);
    }

    #[test]
    fn quick_picks_fit_their_sliders() {
        for power in POWER_PRESETS {
            assert_eq!(PropertyRange::POWER.clamp(power), power);
        }
        for radius in RADIUS_PRESETS {
            assert_eq!(PropertyRange::RADIUS.clamp(radius), radius);
        }
    }

    #[test]
    fn display_name_falls_back_to_kind() {
        let mut light = LightRecord::new(LightKind::Directional);
        assert_eq!(display_name(&light), "directional Light");
        light.name = "Sun".into();
        assert_eq!(display_name(&light), "Sun");
    }

    #[rstest]
    #[case(LightingPreset::Warm, "#ffb74d", 1000.0)]
    #[case(LightingPreset::Cool, "#64b5f6", 1000.0)]
    #[case(LightingPreset::Bright, "#ffffff", 2000.0)]
    #[case(LightingPreset::Dim, "#fff3e0", 200.0)]
    fn presets(#[case] preset: LightingPreset, #[case] color: &str, #[case] power: f32) {
        let update = preset.to_update();
        assert_eq!(update.color.map(|c| c.to_string()).as_deref(), Some(color));
        assert_eq!(update.power, Some(power));
        assert_eq!(preset.as_str().parse::<LightingPreset>().unwrap(), preset);
    }

    #[test]
    fn preset_parse_is_case_insensitive() {
        assert_eq!("WARM".parse::<LightingPreset>().unwrap(), LightingPreset::Warm);
        assert!("neon".parse::<LightingPreset>().is_err());
    }

    #[test]
    fn ranges_clamp() {
        assert_eq!(PropertyRange::POWER.clamp(5000.0), 2000.0);
        assert_eq!(PropertyRange::ANGLE.clamp(0.0), 0.1);
        assert_eq!(PropertyRange::SHADOW_BIAS.clamp(0.5), 0.0);
    }

    #[test]
    fn axis_edit_keeps_other_axes() {
        let light = LightRecord::new(LightKind::Point);
        let update = axis_edit(&light, TransformField::Position, 0, 3.0);
        assert_eq!(update.position.as_deref(), Some(&[3.0, 5.0, 0.0][..]));
        assert!(update.rotation.is_none());

        assert!(axis_edit(&light, TransformField::Scale, 3, 1.0).is_empty());
    }
}
