use nalgebra::{Unit, UnitQuaternion};

use super::{Vector3, TOLERANCE};

/// Returns the unit vector along `v`, or the zero vector if `v` is degenerate.
#[must_use]
pub fn normalize_or_zero(v: &Vector3) -> Vector3 {
    v.try_normalize(TOLERANCE).unwrap_or_else(Vector3::zeros)
}

/// Angle between two vectors in `[0, π]`.
///
/// Returns `0.0` when either vector has zero length, so degenerate inputs
/// classify as coincident directions instead of producing `NaN`.
#[must_use]
pub fn angle_between(a: &Vector3, b: &Vector3) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < TOLERANCE * TOLERANCE {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// Projection of `v` onto the line spanned by `onto`.
#[must_use]
pub fn project(v: &Vector3, onto: &Vector3) -> Vector3 {
    let len_sq = onto.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return Vector3::zeros();
    }
    onto * (v.dot(onto) / len_sq)
}

/// Component of `v` perpendicular to `normal`.
#[must_use]
pub fn reject(v: &Vector3, normal: &Vector3) -> Vector3 {
    v - project(v, normal)
}

/// Rotates `v` by `angle` radians about `axis` (right-hand rule).
///
/// A zero axis leaves `v` unchanged.
#[must_use]
pub fn rotate_about(v: &Vector3, axis: &Vector3, angle: f64) -> Vector3 {
    match Unit::try_new(*axis, TOLERANCE) {
        Some(axis) => UnitQuaternion::from_axis_angle(&axis, angle) * v,
        None => *v,
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn normalize_zero_stays_zero() {
        assert_eq!(normalize_or_zero(&Vector3::zeros()), Vector3::zeros());
        assert_relative_eq!(
            normalize_or_zero(&Vector3::new(0.0, 3.0, 4.0)),
            Vector3::new(0.0, 0.6, 0.8)
        );
    }

    #[test]
    fn angle_between_handles_extremes() {
        let x = Vector3::x();
        assert_relative_eq!(angle_between(&x, &Vector3::y()), FRAC_PI_2);
        assert_relative_eq!(angle_between(&x, &-x), PI);
        assert_relative_eq!(angle_between(&x, &(x * 5.0)), 0.0);
        assert_relative_eq!(angle_between(&x, &Vector3::zeros()), 0.0);
    }

    #[test]
    fn reject_removes_normal_component() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        let r = reject(&v, &Vector3::new(0.0, 0.0, 2.0));
        assert_relative_eq!(r, Vector3::new(1.0, 2.0, 0.0));
        assert_relative_eq!(reject(&v, &Vector3::zeros()), v);
    }

    #[test]
    fn rotate_quarter_turn_about_z() {
        let r = rotate_about(&Vector3::x(), &Vector3::new(0.0, 0.0, 7.0), FRAC_PI_2);
        assert_relative_eq!(r, Vector3::y(), epsilon = 1e-12);
        assert_eq!(rotate_about(&Vector3::x(), &Vector3::zeros(), 1.0), Vector3::x());
    }
}
