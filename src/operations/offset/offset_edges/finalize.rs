use std::collections::BTreeMap;
use std::f64::consts::PI;

use tracing::debug;

use super::chain::ChainEdges;
use super::corner::{solve_corner, CornerKind, CornerNormals};
use super::params::{GeometryMode, OffsetEdgesParams};
use super::side_geometry::SideGeometry;
use crate::error::Result;
use crate::math::vector_3d::{angle_between, normalize_or_zero, reject};
use crate::math::{z_up, Vector3, TOLERANCE};
use crate::operations::modification::{Delete, DeleteContext};
use crate::topology::{LoopId, MeshStore, VertexId};

/// Walk direction when skipping degenerate cap edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    Forward,
    Backward,
}

/// Length of a loop's edge, measured perpendicular to `normal` if given.
fn visible_length(store: &MeshStore, l: LoopId, normal: Option<&Vector3>) -> Result<f64> {
    let length = store.edge_length(store.loop_data(l)?.edge())?;
    match normal {
        Some(n) if length > TOLERANCE => {
            let edge = store.loop_point(l)? - store.loop_point(store.loop_next(l)?)?;
            Ok(reject(&edge, n).norm())
        }
        _ => Ok(length),
    }
}

/// First loop from `start` whose edge has visible length, going at most once
/// around the face. Returns `start` if every edge is degenerate.
fn skip_zero_length(
    store: &MeshStore,
    start: LoopId,
    normal: Option<&Vector3>,
    walk: Walk,
) -> Result<LoopId> {
    let limit = store.face(store.loop_data(start)?.face())?.len();
    let mut current = start;
    for _ in 0..limit {
        if visible_length(store, current, normal)? > TOLERANCE {
            return Ok(current);
        }
        current = match walk {
            Walk::Forward => store.loop_next(current)?,
            Walk::Backward => store.loop_prev(current)?,
        };
    }
    Ok(start)
}

/// Axis about which folded reference normals are pulled apart: an
/// unselected surface edge at the original vertex lying across `normal`.
fn fold_axis(
    store: &MeshStore,
    geometry: &SideGeometry,
    chain: &ChainEdges,
    offset_vert: VertexId,
    normal: &Vector3,
    threshold: f64,
) -> Result<Option<Vector3>> {
    let Some(&orig) = geometry.originals.get(offset_vert) else {
        return Ok(None);
    };
    let normal = normalize_or_zero(normal);
    for e in store.vertex_edges(orig)? {
        let edge = store.edge(e)?;
        if chain.edge_set.contains(&e)
            || geometry.side_edges.contains(&e)
            || edge.select
            || edge.hide
        {
            continue;
        }
        let [a, b] = edge.verts();
        let Some(dir) = (store.point(a)? - store.point(b)?).try_normalize(TOLERANCE) else {
            continue;
        };
        if dir.dot(&normal).abs() < threshold {
            return Ok(Some(dir));
        }
    }
    Ok(None)
}

fn follow_face_normals(
    store: &MeshStore,
    geometry: &SideGeometry,
    chain: &ChainEdges,
    act: LoopId,
    prev: LoopId,
    cap_normal: Vector3,
    threshold: f64,
) -> Result<CornerNormals> {
    let n_act = geometry.reference_normals.get(act).copied();
    let n_prev = geometry.reference_normals.get(prev).copied();
    Ok(match (n_act, n_prev) {
        (Some(act_normal), Some(prev_normal)) => {
            let rot_axis = if angle_between(&act_normal, &prev_normal) > PI - threshold {
                let vert = store.loop_data(act)?.vert();
                fold_axis(store, geometry, chain, vert, &act_normal, threshold)?
            } else {
                None
            };
            CornerNormals::Pair {
                act: act_normal,
                prev: prev_normal,
                rot_axis,
            }
        }
        (Some(n), None) | (None, Some(n)) => CornerNormals::Single(n),
        (None, None) => CornerNormals::Face(cap_normal),
    })
}

/// Moves every cap vertex by its corner displacement.
///
/// All displacements of a cap are computed before any vertex moves.
///
/// # Errors
///
/// Returns an error if the cap topology is inconsistent.
pub(super) fn displace(
    store: &mut MeshStore,
    geometry: &SideGeometry,
    chain: &ChainEdges,
    params: &OffsetEdgesParams,
    follow_faces: bool,
) -> Result<()> {
    let width = params.signed_width();
    let threshold = params.angle_threshold;
    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();

    for &cap in &geometry.caps {
        let cap_normal = store.face(cap)?.normal();
        let projection = if follow_faces { None } else { Some(&cap_normal) };

        let mut moves = Vec::new();
        for l in store.face_loops(cap)? {
            let act = skip_zero_length(store, l, projection, Walk::Forward)?;
            let prev = skip_zero_length(store, store.loop_prev(l)?, projection, Walk::Backward)?;

            let edge_act = store.loop_point(store.loop_next(act)?)? - store.loop_point(act)?;
            let edge_prev = store.loop_point(prev)? - store.loop_point(store.loop_next(prev)?)?;
            let normals = if follow_faces {
                follow_face_normals(store, geometry, chain, act, prev, cap_normal, threshold)?
            } else {
                CornerNormals::Face(cap_normal)
            };

            let corner = solve_corner(&edge_act, &edge_prev, &normals, threshold, params.fold_normals);
            let kind = match corner.kind {
                CornerKind::Fold => "fold",
                CornerKind::Straight => "straight",
                CornerKind::Convex => "convex",
                CornerKind::Concave => "concave",
            };
            *kinds.entry(kind).or_default() += 1;
            moves.push((store.loop_data(l)?.vert(), corner.displacement(width)));
        }

        for (v, delta) in moves {
            store.vertex_mut(v)?.point += delta;
        }
    }

    debug!(?kinds, width, follow_faces, "displaced cap corners");
    Ok(())
}

/// Turns each side face to agree with the reference normal of its cap
/// corner, or with global up.
fn orient_side_faces(store: &mut MeshStore, geometry: &SideGeometry) -> Result<()> {
    let mut targets = Vec::new();
    for &cap in &geometry.caps {
        for l in store.face_loops(cap)? {
            let side_face = store.loop_data(store.radial_next(l)?)?.face();
            let direction = geometry.reference_normals.get(l).copied().unwrap_or_else(z_up);
            targets.push((side_face, direction));
        }
    }
    for (face, direction) in targets {
        if store.face(face)?.normal().dot(&direction) < 0.0 {
            store.flip_face(face)?;
        }
    }
    Ok(())
}

/// Shapes the result for the requested mode and removes all temporary
/// geometry.
///
/// # Errors
///
/// Returns an error if a deletion fails.
pub(super) fn clean_up(
    store: &mut MeshStore,
    geometry: &SideGeometry,
    chain: &mut ChainEdges,
    mode: GeometryMode,
) -> Result<()> {
    store.normal_update()?;

    if mode == GeometryMode::Extrude {
        orient_side_faces(store, geometry)?;
    }

    Delete::new(DeleteContext::Only)
        .faces(geometry.caps.iter().copied())
        .execute(store)?;

    match mode {
        GeometryMode::Extrude => {}
        GeometryMode::Offset => {
            Delete::new(DeleteContext::Cascade)
                .edges(geometry.side_edges.iter().copied())
                .faces(geometry.side_faces.iter().copied())
                .execute(store)?;
        }
        GeometryMode::Move => {
            for (offset, &orig) in &geometry.originals {
                let point = store.point(offset)?;
                store.vertex_mut(orig)?.point = point;
            }
            Delete::new(DeleteContext::Cascade)
                .edges(geometry.side_edges.iter().copied())
                .faces(geometry.side_faces.iter().copied())
                .edges(geometry.offset_edges.iter().copied())
                .verts(geometry.offset_verts.iter().copied())
                .execute(store)?;
            for v in &geometry.offset_verts {
                chain.extended.remove(v);
            }
        }
    }

    Delete::new(DeleteContext::Cascade)
        .verts(chain.extended.iter().copied())
        .execute(store)?;
    store.normal_update()?;

    debug!(?mode, extended = chain.extended.len(), "cleaned up temporary geometry");
    Ok(())
}
