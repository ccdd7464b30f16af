use std::f64::consts::{PI, TAU};

use super::params::FoldNormals;
use crate::math::vector_3d::{angle_between, normalize_or_zero, reject, rotate_about};
use crate::math::{z_up, Vector3, TOLERANCE};

/// Shape of a cap corner once both edges are flattened onto the working
/// normal's plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerKind {
    /// The edges double back on each other. The corner does not move.
    Fold,
    /// The edges continue in a line.
    Straight,
    /// The corner points away from the cap interior.
    Convex,
    /// The corner points into the cap interior.
    Concave,
}

/// The normals available at a corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CornerNormals {
    /// Reference normals on both sides, with an optional axis used to pull
    /// apart faces folded onto each other.
    Pair {
        act: Vector3,
        prev: Vector3,
        rot_axis: Option<Vector3>,
    },
    /// A reference normal on one side only.
    Single(Vector3),
    /// No reference normal; the cap face's own normal, possibly zero.
    Face(Vector3),
}

/// Direction and scale of one corner's displacement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerVector {
    pub kind: CornerKind,
    /// Unit direction of travel (zero if none could be found).
    pub tangent: Vector3,
    /// Width multiplier keeping the active edge at distance `width`.
    pub factor_act: f64,
    /// Width multiplier keeping the previous edge at distance `width`.
    pub factor_prev: f64,
}

impl CornerVector {
    /// The smaller of the two factors.
    #[must_use]
    pub fn factor(&self) -> f64 {
        self.factor_act.min(self.factor_prev)
    }

    /// Displacement for a signed width. Zero when the factor is not finite.
    #[must_use]
    pub fn displacement(&self, width: f64) -> Vector3 {
        let factor = self.factor();
        if factor.is_finite() {
            self.tangent * (width * factor)
        } else {
            Vector3::zeros()
        }
    }
}

/// Normal used when the cap face itself is degenerate: global up with the
/// active edge projected out, or the Y axis if the edge is vertical.
fn fallback_normal(edge_act: &Vector3, threshold: f64) -> Vector3 {
    let up = z_up();
    let angle = angle_between(edge_act, &up);
    if threshold < angle && angle < PI - threshold {
        normalize_or_zero(&reject(&up, edge_act))
    } else {
        Vector3::y()
    }
}

fn inverse_sine(angle: f64) -> f64 {
    let sine = angle.sin();
    if sine.abs() < TOLERANCE {
        f64::INFINITY
    } else {
        1.0 / sine
    }
}

/// Working frame of a corner after normal resolution.
struct Frame {
    normal: Vector3,
    edge_act: Vector3,
    edge_prev: Vector3,
    /// Axis between two reference normals at a crease.
    crease: Option<Vector3>,
    /// Active normal before a fold rotation was applied.
    unrotated: Option<Vector3>,
}

fn resolve_frame(
    edge_act: Vector3,
    edge_prev: Vector3,
    normals: &CornerNormals,
    threshold: f64,
) -> Frame {
    let mut frame = Frame {
        normal: Vector3::zeros(),
        edge_act,
        edge_prev,
        crease: None,
        unrotated: None,
    };
    match *normals {
        CornerNormals::Pair {
            act,
            prev,
            rot_axis,
        } => {
            let act = normalize_or_zero(&act);
            let prev = normalize_or_zero(&prev);
            let angle = angle_between(&act, &prev);
            if threshold < angle && angle < PI - threshold {
                frame.normal = normalize_or_zero(&(act + prev));
                frame.crease = Some(normalize_or_zero(&act.cross(&prev)));
            } else if let (true, Some(axis)) = (angle > PI - threshold, rot_axis) {
                let turn = 2.0 * threshold;
                frame.edge_act = rotate_about(&edge_act, &axis, turn);
                frame.edge_prev = rotate_about(&edge_prev, &axis, -turn);
                let act_rot = rotate_about(&act, &axis, turn);
                let prev_rot = rotate_about(&prev, &axis, -turn);
                frame.normal = normalize_or_zero(&(act_rot + prev_rot));
                frame.unrotated = Some(act);
            } else {
                frame.normal = act;
            }
        }
        CornerNormals::Single(n) => frame.normal = normalize_or_zero(&n),
        CornerNormals::Face(n) => {
            frame.normal = match n.try_normalize(TOLERANCE) {
                Some(n) => n,
                None => fallback_normal(&edge_act, threshold),
            };
        }
    }
    frame
}

/// Computes the displacement of a cap corner.
///
/// `edge_act` runs from the corner to the next cap vertex and `edge_prev`
/// from the corner to the previous one. A positive width moves a convex
/// corner away from the cap interior. The factors make the displaced edges
/// lie exactly `width` away from the original edges.
#[must_use]
pub fn solve_corner(
    edge_act: &Vector3,
    edge_prev: &Vector3,
    normals: &CornerNormals,
    threshold: f64,
    fold_normals: FoldNormals,
) -> CornerVector {
    let act = normalize_or_zero(edge_act);
    let prev = normalize_or_zero(edge_prev);
    let frame = resolve_frame(act, prev, normals, threshold);
    let normal = frame.normal;

    let act2d = normalize_or_zero(&reject(&frame.edge_act, &normal));
    let prev2d = normalize_or_zero(&reject(&frame.edge_prev, &normal));
    let angle2d = angle_between(&act2d, &prev2d);

    let (kind, tangent, opening) = if angle2d < threshold {
        (CornerKind::Fold, act2d, TAU)
    } else if angle2d > PI - threshold {
        (CornerKind::Straight, act2d.cross(&normal), PI)
    } else if act2d.cross(&prev2d).dot(&normal) > 0.0 {
        (CornerKind::Convex, -(act2d + prev2d), angle2d)
    } else {
        (CornerKind::Concave, act2d + prev2d, TAU - angle2d)
    };
    let mut tangent = normalize_or_zero(&reject(&tangent, &normal));

    if let Some(mut crease) = frame.crease {
        if tangent.dot(&crease) < 0.0 {
            crease = -crease;
        }
        let angle_a = angle_between(&crease, &act2d);
        let angle_p = angle_between(&crease, &prev2d);
        if angle_a < threshold || angle_p < threshold || opening + angle_a + angle_p > TAU + threshold {
            // The crease axis falls outside the corner: bisect the 3d edges.
            tangent = if kind == CornerKind::Convex {
                normalize_or_zero(&-(act + prev))
            } else {
                normalize_or_zero(&(act + prev))
            };
        } else {
            tangent = crease;
        }
    }

    if let (FoldNormals::Original, Some(unrotated)) = (fold_normals, frame.unrotated) {
        tangent = normalize_or_zero(&reject(&tangent, &unrotated));
    }

    let (factor_act, factor_prev) = if kind == CornerKind::Fold {
        (0.0, 0.0)
    } else {
        (
            inverse_sine(angle_between(&tangent, &act)),
            inverse_sine(angle_between(&tangent, &prev)),
        )
    };

    CornerVector {
        kind,
        tangent,
        factor_act,
        factor_prev,
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::SQRT_2;

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    const THRESHOLD: f64 = 1.0e-4;

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    fn solve(act: Vector3, prev: Vector3, normals: CornerNormals) -> CornerVector {
        solve_corner(&act, &prev, &normals, THRESHOLD, FoldNormals::Rotated)
    }

    #[test]
    fn straight_corner_has_unit_factors() {
        let corner = solve(v(2.0, 0.0, 0.0), v(-0.5, 0.0, 0.0), CornerNormals::Face(Vector3::z()));
        assert_eq!(corner.kind, CornerKind::Straight);
        assert_relative_eq!(corner.tangent, v(0.0, -1.0, 0.0));
        assert_relative_eq!(corner.factor_act, 1.0);
        assert_relative_eq!(corner.factor_prev, 1.0);
    }

    #[test]
    fn fold_corner_does_not_move() {
        let corner = solve(v(1.0, 0.0, 0.0), v(3.0, 0.0, 0.0), CornerNormals::Face(Vector3::z()));
        assert_eq!(corner.kind, CornerKind::Fold);
        assert_eq!(corner.factor_act, 0.0);
        assert_eq!(corner.factor_prev, 0.0);
        assert_eq!(corner.displacement(10.0), Vector3::zeros());
    }

    #[test]
    fn right_angle_convex_corner() {
        let corner = solve(v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0), CornerNormals::Face(Vector3::z()));
        assert_eq!(corner.kind, CornerKind::Convex);
        assert_relative_eq!(corner.tangent, v(-1.0, -1.0, 0.0) / SQRT_2);
        assert_relative_eq!(corner.factor(), SQRT_2);
        assert_relative_eq!(corner.displacement(0.25), v(-0.25, -0.25, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn right_angle_concave_corner() {
        let corner = solve(v(0.0, 1.0, 0.0), v(1.0, 0.0, 0.0), CornerNormals::Face(Vector3::z()));
        assert_eq!(corner.kind, CornerKind::Concave);
        assert_relative_eq!(corner.tangent, v(1.0, 1.0, 0.0) / SQRT_2);
        assert_relative_eq!(corner.displacement(0.5), v(0.5, 0.5, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn degenerate_face_normal_falls_back_to_up() {
        let corner = solve(v(1.0, 0.0, 0.0), v(-1.0, 0.0, 0.0), CornerNormals::Face(Vector3::zeros()));
        assert_eq!(corner.kind, CornerKind::Straight);
        assert_relative_eq!(corner.tangent, v(0.0, -1.0, 0.0));

        // Vertical edges cannot use up, so Y is used instead.
        let corner = solve(v(0.0, 0.0, 1.0), v(0.0, 0.0, -1.0), CornerNormals::Face(Vector3::zeros()));
        assert_eq!(corner.kind, CornerKind::Straight);
        assert_relative_eq!(corner.tangent, v(-1.0, 0.0, 0.0));
    }

    #[test]
    fn single_normal_is_used_directly() {
        let corner = solve(v(1.0, 0.0, 0.0), v(-1.0, 0.0, 0.0), CornerNormals::Single(v(0.0, 0.0, -3.0)));
        assert_relative_eq!(corner.tangent, v(0.0, 1.0, 0.0));
    }

    #[test]
    fn crease_corner_slides_along_crease() {
        // The chain climbs the front face (-Y) and continues over the top (+Z).
        let corner = solve(
            v(0.0, 1.0, 0.0),
            v(0.0, 0.0, -1.0),
            CornerNormals::Pair {
                act: Vector3::z(),
                prev: -Vector3::y(),
                rot_axis: None,
            },
        );
        assert_eq!(corner.kind, CornerKind::Straight);
        assert_relative_eq!(corner.tangent, Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(corner.factor_act, 1.0, epsilon = 1e-12);
        assert_relative_eq!(corner.factor_prev, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn antiparallel_normals_without_axis_use_active_normal() {
        let corner = solve(
            v(1.0, 0.0, 0.0),
            v(0.0, 1.0, 0.0),
            CornerNormals::Pair {
                act: Vector3::z(),
                prev: -Vector3::z(),
                rot_axis: None,
            },
        );
        assert_eq!(corner.kind, CornerKind::Convex);
        assert_relative_eq!(corner.tangent, v(-1.0, -1.0, 0.0) / SQRT_2);
    }

    #[test]
    fn folded_faces_are_rotated_apart() {
        let normals = CornerNormals::Pair {
            act: Vector3::z(),
            prev: -Vector3::z(),
            rot_axis: Some(v(4.0, 0.0, 0.0)),
        };
        let act = v(1.0, 0.0, 0.0);
        let prev = v(0.0, 1.0, 0.0);

        let rotated = solve_corner(&act, &prev, &normals, THRESHOLD, FoldNormals::Rotated);
        assert_eq!(rotated.kind, CornerKind::Concave);
        assert_relative_eq!(rotated.tangent.norm(), 1.0, epsilon = 1e-12);
        assert!(rotated.factor().is_finite());

        let original = solve_corner(&act, &prev, &normals, THRESHOLD, FoldNormals::Original);
        assert_eq!(original.kind, CornerKind::Concave);
        assert_abs_diff_eq!(original.tangent.dot(&Vector3::z()), 0.0, epsilon = 1e-12);
        assert_relative_eq!(original.tangent, Vector3::x(), epsilon = 1e-6);
    }

    #[test]
    fn tangent_parallel_to_edge_gives_no_displacement() {
        let corner = CornerVector {
            kind: CornerKind::Straight,
            tangent: Vector3::x(),
            factor_act: f64::INFINITY,
            factor_prev: f64::INFINITY,
        };
        assert_eq!(corner.displacement(1.0), Vector3::zeros());
    }
}
