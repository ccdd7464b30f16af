use std::collections::BTreeSet;

use slotmap::SecondaryMap;
use tracing::debug;

use super::chain::ChainEdges;
use crate::error::Result;
use crate::math::{z_up, Vector3, TOLERANCE};
use crate::operations::creation::EdgeloopFill;
use crate::operations::modification::RecalcFaceNormals;
use crate::operations::shaping::ExtrudeEdgeOnly;
use crate::topology::{EdgeId, FaceId, LoopId, MeshStore, VertexId};

/// The ribbon extruded from the chain, plus the cap faces filling the
/// offset boundary.
#[derive(Debug, Clone)]
pub(super) struct SideGeometry {
    pub offset_verts: Vec<VertexId>,
    pub offset_edges: Vec<EdgeId>,
    pub side_faces: Vec<FaceId>,
    /// Edges joining each original vertex to its offset copy.
    pub side_edges: Vec<EdgeId>,
    /// Offset vertex to the original vertex it was copied from.
    pub originals: SecondaryMap<VertexId, VertexId>,
    pub caps: Vec<FaceId>,
    /// Surface normal next to the original edge behind each cap corner.
    pub reference_normals: SecondaryMap<LoopId, Vector3>,
}

/// Flips a cap so it faces the same way as the surface around its chain.
fn orient_cap(
    store: &mut MeshStore,
    cap: FaceId,
    originals: &SecondaryMap<VertexId, VertexId>,
    side: &BTreeSet<FaceId>,
) -> Result<()> {
    let mut reference = z_up();
    for v in store.face_vertices(cap)? {
        let Some(&orig) = originals.get(v) else {
            continue;
        };
        let normal = store.vertex_normal(orig, side)?;
        if normal.norm() > TOLERANCE {
            reference = normal;
            break;
        }
    }
    if store.face(cap)?.normal().dot(&reference) < 0.0 {
        store.flip_face(cap)?;
    }
    Ok(())
}

/// Reference normal for one cap corner.
///
/// The corner's edge is an offset edge; across it lies a side face whose
/// opposite edge is the original chain edge. Faces on that edge that are
/// real surface (not side faces, not hidden, not degenerate) contribute: a
/// selected one wins outright, otherwise their normals are averaged.
fn reference_normal(
    store: &MeshStore,
    cap_loop: LoopId,
    side: &BTreeSet<FaceId>,
) -> Result<Option<Vector3>> {
    let side_loop = store.radial_next(cap_loop)?;
    let across = store.loop_next(store.loop_next(side_loop)?)?;
    let original_edge = store.loop_data(across)?.edge();

    let mut sum = Vector3::zeros();
    let mut count = 0;
    for f in store.edge_faces(original_edge)? {
        let face = store.face(f)?;
        if side.contains(&f) || face.hide || face.normal().norm() < TOLERANCE {
            continue;
        }
        if face.select {
            return Ok(Some(face.normal()));
        }
        sum += face.normal();
        count += 1;
    }
    if count == 0 {
        return Ok(None);
    }
    Ok(sum.try_normalize(TOLERANCE))
}

/// Extrudes the chain into a ribbon and caps its offset boundary.
///
/// Offset copies of extended vertices are added to `chain.extended`.
///
/// # Errors
///
/// Returns an error if extrusion or filling fails.
pub(super) fn build(store: &mut MeshStore, chain: &mut ChainEdges) -> Result<SideGeometry> {
    let ribbon = ExtrudeEdgeOnly::new(chain.edges.clone()).execute(store)?;
    RecalcFaceNormals::new(ribbon.faces.clone()).execute(store)?;
    for &f in &ribbon.faces {
        store.select_face(f)?;
    }
    let side: BTreeSet<FaceId> = ribbon.faces.iter().copied().collect();
    let offset_set: BTreeSet<VertexId> = ribbon.verts.iter().copied().collect();

    let mut side_edges = Vec::new();
    let mut seen = BTreeSet::new();
    for &e in &ribbon.edges {
        let Some(&side_loop) = store.edge(e)?.loops().first() else {
            continue;
        };
        let data = *store.loop_data(side_loop)?;
        for l in [data.next(), data.prev()] {
            let edge = store.loop_data(l)?.edge();
            if seen.insert(edge) {
                side_edges.push(edge);
            }
        }
    }

    let mut originals = SecondaryMap::new();
    for &e in &side_edges {
        let [a, b] = store.edge(e)?.verts();
        let (offset, orig) = if offset_set.contains(&a) { (a, b) } else { (b, a) };
        originals.insert(offset, orig);
        if chain.extended.contains(&orig) {
            chain.extended.insert(offset);
        }
    }

    let caps = EdgeloopFill::new(ribbon.edges.clone()).execute(store)?;
    let mut reference_normals = SecondaryMap::new();
    for &cap in &caps {
        orient_cap(store, cap, &originals, &side)?;
        // Flipping re-binds loops to edges, so references are taken after.
        for l in store.face_loops(cap)? {
            if let Some(normal) = reference_normal(store, l, &side)? {
                reference_normals.insert(l, normal);
            }
        }
    }

    debug!(
        offset_verts = ribbon.verts.len(),
        side_faces = ribbon.faces.len(),
        caps = caps.len(),
        references = reference_normals.len(),
        "built side geometry"
    );
    Ok(SideGeometry {
        offset_verts: ribbon.verts,
        offset_edges: ribbon.edges,
        side_faces: ribbon.faces,
        side_edges,
        originals,
        caps,
        reference_normals,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::SQRT_2;

    use approx::assert_relative_eq;

    use super::super::chain;
    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::{MakeGrid, MakeWire};

    fn build_from_selection(store: &mut MeshStore) -> (ChainEdges, SideGeometry) {
        let selection = chain::collect(store).unwrap();
        let mut chain_edges = chain::bridge(store, selection).unwrap();
        let geometry = build(store, &mut chain_edges).unwrap();
        (chain_edges, geometry)
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn square_around_face_gets_one_cap() {
        let mut store = MeshStore::new();
        let grid = MakeGrid::new(1, 1, |c, r| Point3::new(c as f64, r as f64, 0.0))
            .execute(&mut store)
            .unwrap();
        for id in store.edges().map(|(id, _)| id).collect::<Vec<_>>() {
            store.edge_mut(id).unwrap().select = true;
        }

        let (chain_edges, geometry) = build_from_selection(&mut store);
        assert!(chain_edges.extended.is_empty());
        assert_eq!(geometry.offset_verts.len(), 4);
        assert_eq!(geometry.side_edges.len(), 4);
        assert_eq!(geometry.caps.len(), 1);

        let cap = geometry.caps[0];
        assert_relative_eq!(store.face(cap).unwrap().normal(), Vector3::z());
        for &v in &geometry.offset_verts {
            let orig = geometry.originals[v];
            assert_eq!(store.point(v).unwrap(), store.point(orig).unwrap());
        }
        for l in store.face_loops(cap).unwrap() {
            assert_relative_eq!(geometry.reference_normals[l], Vector3::z());
        }
        assert!(geometry
            .side_faces
            .iter()
            .all(|&f| store.face(f).unwrap().select));
        assert!(!store.face(grid.faces[0][0]).unwrap().select);
    }

    #[test]
    fn loose_loop_cap_faces_up() {
        let mut store = MeshStore::new();
        let wire = MakeWire::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
            ],
            true,
        )
        .execute(&mut store)
        .unwrap();
        for &e in &wire.edges {
            store.edge_mut(e).unwrap().select = true;
        }

        let (_, geometry) = build_from_selection(&mut store);
        assert_relative_eq!(store.face(geometry.caps[0]).unwrap().normal(), Vector3::z());
        assert!(geometry.reference_normals.is_empty());
    }

    #[test]
    fn extended_copies_are_tracked() {
        let mut store = MeshStore::new();
        let wire = MakeWire::new(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)], false)
            .execute(&mut store)
            .unwrap();
        store.edge_mut(wire.edges[0]).unwrap().select = true;

        let (chain_edges, geometry) = build_from_selection(&mut store);
        assert_eq!(chain_edges.extended.len(), 4);
        for (offset, &orig) in &geometry.originals {
            assert_eq!(
                chain_edges.extended.contains(&offset),
                chain_edges.extended.contains(&orig)
            );
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn bent_strip(store: &mut MeshStore, select_right: bool) -> Vector3 {
        let grid = MakeGrid::new(2, 1, |c, r| {
            Point3::new(c as f64, r as f64, if c == 2 { 1.0 } else { 0.0 })
        })
        .execute(store)
        .unwrap();
        let middle = store
            .edge_between(grid.verts[0][1], grid.verts[1][1])
            .unwrap()
            .unwrap();
        store.edge_mut(middle).unwrap().select = true;
        store.face_mut(grid.faces[0][1]).unwrap().select = select_right;
        store.face(grid.faces[0][1]).unwrap().normal()
    }

    #[test]
    fn selected_neighbour_wins() {
        let mut store = MeshStore::new();
        let right = bent_strip(&mut store, true);
        assert_relative_eq!(right, Vector3::new(-1.0, 0.0, 1.0) / SQRT_2);

        let (_, geometry) = build_from_selection(&mut store);
        let refs: Vec<Vector3> = geometry.reference_normals.values().copied().collect();
        assert_eq!(refs.len(), 1);
        assert_relative_eq!(refs[0], right, epsilon = 1e-12);
    }

    #[test]
    fn unselected_neighbours_are_averaged() {
        let mut store = MeshStore::new();
        let right = bent_strip(&mut store, false);

        let (_, geometry) = build_from_selection(&mut store);
        let refs: Vec<Vector3> = geometry.reference_normals.values().copied().collect();
        assert_eq!(refs.len(), 1);
        assert_relative_eq!(refs[0], (right + Vector3::z()).normalize(), epsilon = 1e-12);
    }

    #[test]
    fn hidden_neighbour_is_ignored() {
        let mut store = MeshStore::new();
        bent_strip(&mut store, true);
        let right = store
            .faces()
            .find(|(_, f)| f.select)
            .map(|(id, _)| id)
            .unwrap();
        store.face_mut(right).unwrap().hide = true;

        let (_, geometry) = build_from_selection(&mut store);
        let refs: Vec<Vector3> = geometry.reference_normals.values().copied().collect();
        assert_eq!(refs.len(), 1);
        assert_relative_eq!(refs[0], Vector3::z(), epsilon = 1e-12);
    }
}
