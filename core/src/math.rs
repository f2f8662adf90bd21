//! Math type aliases and helper functions.
//!
//! Light records store plain `[f32; 3]` arrays. The helpers here coerce
//! arbitrary input into those arrays and convert between the Euler angles
//! kept in records and the quaternions produced by gizmos.

use std::f32::consts::{PI, TAU};

pub use nalgebra;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// Quaternion (f32). Stored as `[x, y, z, w]` in memory.
pub type Quat = nalgebra::Quaternion<f32>;

/// Wrap an angle in radians into the half-open range `(-π, π]`.
///
/// Non-finite input maps to `0.0`. Values already inside the range are
/// returned unchanged, so wrapping is idempotent bit-for-bit.
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    if angle > -PI && angle <= PI {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { PI } else { wrapped }
}

/// Coerce a slice into a 3-component vector.
///
/// A slice of the wrong length becomes `[default; 3]`; non-finite entries
/// are individually replaced by `default`.
pub fn sanitize_vec3(input: &[f32], default: f32) -> [f32; 3] {
    match input {
        [x, y, z] => [*x, *y, *z].map(|v| if v.is_finite() { v } else { default }),
        _ => [default; 3],
    }
}

/// Raise every component of `v` to at least `min`.
pub fn floor_vec3(v: [f32; 3], min: f32) -> [f32; 3] {
    v.map(|c| c.max(min))
}

/// Wrap every component of `v` with [`wrap_angle`].
pub fn wrap_euler(v: [f32; 3]) -> [f32; 3] {
    v.map(wrap_angle)
}

/// Build a quaternion from `[x, y, z, w]` components.
pub fn quat_from_array(a: [f32; 4]) -> Quat {
    Quat::new(a[3], a[0], a[1], a[2])
}

/// Convert a quaternion `[x, y, z, w]` to XYZ Euler angles `[x, y, z]`.
///
/// The angles satisfy `rotation = Rx(x) * Ry(y) * Rz(z)`, the order scene
/// renderers use for `rotation` fields. At gimbal lock (`|y| = π/2`) the
/// Z angle is folded into X and reported as `0`. Degenerate or non-finite
/// quaternions yield `[0, 0, 0]`.
pub fn euler_from_quat(q: [f32; 4]) -> [f32; 3] {
    if q.iter().any(|c| !c.is_finite()) {
        return [0.0; 3];
    }
    let quat = quat_from_array(q);
    if quat.norm() <= f32::EPSILON {
        return [0.0; 3];
    }
    let m = nalgebra::UnitQuaternion::from_quaternion(quat).to_rotation_matrix();
    let m = m.matrix();
    let m13 = m[(0, 2)].clamp(-1.0, 1.0);
    let y = m13.asin();
    if m13.abs() < 0.999_999_9 {
        let x = (-m[(1, 2)]).atan2(m[(2, 2)]);
        let z = (-m[(0, 1)]).atan2(m[(0, 0)]);
        [x, y, z]
    } else {
        let x = m[(2, 1)].atan2(m[(1, 1)]);
        [x, y, 0.0]
    }
}

/// Convert XYZ Euler angles `[x, y, z]` to a quaternion `[x, y, z, w]`.
pub fn quat_from_euler(e: [f32; 3]) -> [f32; 4] {
    use nalgebra::{UnitQuaternion, Vector3};
    let q = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), e[0])
        * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), e[1])
        * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), e[2]);
    [q.i, q.j, q.k, q.w]
}

/// Round `value` to the nearest multiple of `step`.
///
/// A non-positive or non-finite step disables snapping.
pub fn snap(value: f32, step: f32) -> f32 {
    if !step.is_finite() || step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(1.0, 1.0)]
    #[case(-1.0, -1.0)]
    #[case(PI, PI)]
    #[case(-PI, PI)]
    #[case(f32::NAN, 0.0)]
    #[case(f32::INFINITY, 0.0)]
    #[case(f32::NEG_INFINITY, 0.0)]
    fn wrap_angle_exact(#[case] input: f32, #[case] expected: f32) {
        assert_eq!(wrap_angle(input), expected);
    }

    #[rstest]
    #[case(4.0)]
    #[case(-4.0)]
    #[case(7.0)]
    #[case(-7.0)]
    #[case(100.0)]
    #[case(-1000.5)]
    #[case(3.0 * PI)]
    #[case(-3.0 * PI)]
    fn wrap_angle_lands_in_range(#[case] input: f32) {
        let wrapped = wrap_angle(input);
        assert!(wrapped > -PI && wrapped <= PI, "{input} -> {wrapped}");
        // Same direction modulo a full turn.
        assert!((wrapped.sin() - input.sin()).abs() < 1e-3);
        assert!((wrapped.cos() - input.cos()).abs() < 1e-3);
    }

    #[test]
    fn wrap_angle_is_idempotent() {
        for input in [4.0_f32, -4.0, 10.0, -10.0, 0.5] {
            let once = wrap_angle(input);
            assert_eq!(wrap_angle(once), once);
        }
    }

    #[test]
    fn sanitize_wrong_length() {
        assert_eq!(sanitize_vec3(&[], 1.0), [1.0; 3]);
        assert_eq!(sanitize_vec3(&[2.0, 3.0], 0.0), [0.0; 3]);
        assert_eq!(sanitize_vec3(&[1.0, 2.0, 3.0, 4.0], 0.0), [0.0; 3]);
    }

    #[test]
    fn sanitize_replaces_non_finite_entries() {
        assert_eq!(
            sanitize_vec3(&[f32::NAN, 2.0, f32::INFINITY], 1.0),
            [1.0, 2.0, 1.0]
        );
    }

    #[test]
    fn floor_raises_small_components() {
        assert_eq!(floor_vec3([0.0, -5.0, 2.0], 0.1), [0.1, 0.1, 2.0]);
    }

    #[test]
    fn euler_quat_round_trip() {
        let euler = [0.3, -0.2, 1.1];
        let back = euler_from_quat(quat_from_euler(euler));
        for (a, b) in euler.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    // Rx(0.3) * Ry(0.2) * Rz(0.1)
    const XYZ_QUAT: [f32; 4] = [0.153_439_3, 0.091_157_55, 0.064_071_35, 0.981_856_2];

    #[test]
    fn compound_rotation_decomposes_in_xyz_order() {
        let euler = euler_from_quat(XYZ_QUAT);
        for (a, b) in euler.iter().zip([0.3, 0.2, 0.1].iter()) {
            assert!((a - b).abs() < 1e-5, "{euler:?}");
        }
    }

    #[test]
    fn compound_rotation_composes_in_xyz_order() {
        let q = quat_from_euler([0.3, 0.2, 0.1]);
        for (a, b) in q.iter().zip(XYZ_QUAT.iter()) {
            assert!((a - b).abs() < 1e-5, "{q:?}");
        }
    }

    #[test]
    fn euler_from_degenerate_quat() {
        assert_eq!(euler_from_quat([0.0, 0.0, 0.0, 0.0]), [0.0; 3]);
        assert_eq!(euler_from_quat([f32::NAN, 0.0, 0.0, 1.0]), [0.0; 3]);
    }

    #[test]
    fn euler_from_identity() {
        assert_eq!(euler_from_quat([0.0, 0.0, 0.0, 1.0]), [0.0; 3]);
    }

    #[test]
    fn snap_rounds_to_step() {
        assert_eq!(snap(0.3, 0.25), 0.25);
        assert_eq!(snap(0.4, 0.25), 0.5);
        assert_eq!(snap(-0.13, 0.25), -0.25);
    }

    #[test]
    fn snap_disabled_for_bad_step() {
        assert_eq!(snap(0.3, 0.0), 0.3);
        assert_eq!(snap(0.3, -1.0), 0.3);
        assert_eq!(snap(0.3, f32::NAN), 0.3);
    }
}
