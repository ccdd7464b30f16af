use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::error::Result;
use crate::math::polygon_3d::centroid;
use crate::math::TOLERANCE;
use crate::topology::{EdgeId, FaceId, MeshStore};

/// Makes the winding of a set of faces consistent.
///
/// Faces are grouped into components connected through edges shared by
/// exactly two faces of the set. Within each component the face farthest
/// from the component centre is turned to face away from it (when its normal
/// is usable), and the rest are flipped to agree with their neighbours.
pub struct RecalcFaceNormals {
    faces: Vec<FaceId>,
}

impl RecalcFaceNormals {
    /// Creates a new `RecalcFaceNormals` operation.
    #[must_use]
    pub fn new(faces: Vec<FaceId>) -> Self {
        Self { faces }
    }

    /// Executes the operation, flipping faces in place.
    ///
    /// # Errors
    ///
    /// Returns an error if a face is not found.
    pub fn execute(&self, store: &mut MeshStore) -> Result<()> {
        let set: BTreeSet<FaceId> = self.faces.iter().copied().collect();
        for &f in &set {
            store.update_face_normal(f)?;
        }

        let mut by_edge: BTreeMap<EdgeId, Vec<FaceId>> = BTreeMap::new();
        for &f in &set {
            for l in store.face_loops(f)? {
                by_edge.entry(store.loop_data(l)?.edge()).or_default().push(f);
            }
        }

        let mut visited = BTreeSet::new();
        for &seed in &self.faces {
            if visited.contains(&seed) {
                continue;
            }
            let component = collect_component(store, seed, &set, &by_edge)?;
            orient_seed(store, &component)?;

            let mut queue = VecDeque::from([component[0]]);
            visited.insert(component[0]);
            while let Some(f) = queue.pop_front() {
                for l in store.face_loops(f)? {
                    let data = *store.loop_data(l)?;
                    let Some(g) = manifold_neighbour(&by_edge, data.edge(), f) else {
                        continue;
                    };
                    if !visited.insert(g) {
                        continue;
                    }
                    // Neighbours must run through the shared edge in opposite directions.
                    let g_loop = store
                        .edge(data.edge())?
                        .loops()
                        .iter()
                        .copied()
                        .find(|&gl| store.loop_data(gl).is_ok_and(|d| d.face() == g));
                    if let Some(gl) = g_loop {
                        if store.loop_data(gl)?.vert() == data.vert() {
                            store.flip_face(g)?;
                        }
                    }
                    queue.push_back(g);
                }
            }
        }
        Ok(())
    }
}

fn manifold_neighbour(
    by_edge: &BTreeMap<EdgeId, Vec<FaceId>>,
    edge: EdgeId,
    face: FaceId,
) -> Option<FaceId> {
    match by_edge.get(&edge).map(Vec::as_slice) {
        Some(&[a, b]) if a == face => Some(b),
        Some(&[a, b]) if b == face => Some(a),
        _ => None,
    }
}

/// Connected faces reachable from `seed`, with the outermost face first.
fn collect_component(
    store: &MeshStore,
    seed: FaceId,
    set: &BTreeSet<FaceId>,
    by_edge: &BTreeMap<EdgeId, Vec<FaceId>>,
) -> Result<Vec<FaceId>> {
    let mut component = vec![seed];
    let mut seen = BTreeSet::from([seed]);
    let mut i = 0;
    while i < component.len() {
        let f = component[i];
        for l in store.face_loops(f)? {
            if let Some(g) = manifold_neighbour(by_edge, store.loop_data(l)?.edge(), f) {
                if set.contains(&g) && seen.insert(g) {
                    component.push(g);
                }
            }
        }
        i += 1;
    }

    let centres = component
        .iter()
        .map(|&f| store.face_points(f).map(|pts| centroid(&pts)))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let middle = centroid(&centres);
    let outermost = centres
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| (*a - middle).norm().total_cmp(&(*b - middle).norm()))
        .map_or(0, |(i, _)| i);
    component.swap(0, outermost);
    Ok(component)
}

fn orient_seed(store: &mut MeshStore, component: &[FaceId]) -> Result<()> {
    let seed = component[0];
    let centres = component
        .iter()
        .map(|&f| store.face_points(f).map(|pts| centroid(&pts)))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let outward = centres[0] - centroid(&centres);
    let normal = store.face(seed)?.normal();
    if normal.norm() > TOLERANCE && outward.norm() > TOLERANCE && normal.dot(&outward) < 0.0 {
        store.flip_face(seed)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::{Point3, Vector3};

    #[test]
    fn flips_inconsistent_neighbour() {
        let mut store = MeshStore::new();
        let v: Vec<_> = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ]
        .into_iter()
        .map(|p| store.add_vertex(p))
        .collect();
        let a = store.add_face(&[v[0], v[1], v[2], v[3]]).unwrap();
        // Same direction through the shared edge v1-v2: inconsistent.
        let b = store.add_face(&[v[1], v[2], v[5], v[4]]).unwrap();
        assert_relative_eq!(store.face(b).unwrap().normal(), -Vector3::z());

        RecalcFaceNormals::new(vec![a, b]).execute(&mut store).unwrap();
        let na = store.face(a).unwrap().normal();
        let nb = store.face(b).unwrap().normal();
        assert_relative_eq!(na, nb);
    }

    #[test]
    fn closed_box_faces_outward() {
        let mut store = MeshStore::new();
        let c: Vec<_> = (0..8)
            .map(|i| {
                let x = f64::from(i & 1);
                let y = f64::from((i >> 1) & 1);
                let z = f64::from((i >> 2) & 1);
                store.add_vertex(Point3::new(x, y, z))
            })
            .collect();
        // Deliberately mixed windings.
        let faces = vec![
            store.add_face(&[c[0], c[1], c[3], c[2]]).unwrap(),
            store.add_face(&[c[4], c[5], c[7], c[6]]).unwrap(),
            store.add_face(&[c[0], c[1], c[5], c[4]]).unwrap(),
            store.add_face(&[c[2], c[3], c[7], c[6]]).unwrap(),
            store.add_face(&[c[0], c[2], c[6], c[4]]).unwrap(),
            store.add_face(&[c[1], c[3], c[7], c[5]]).unwrap(),
        ];

        RecalcFaceNormals::new(faces.clone()).execute(&mut store).unwrap();
        let centre = Point3::new(0.5, 0.5, 0.5);
        for f in faces {
            let pts = store.face_points(f).unwrap();
            let outward = centroid(&pts) - centre;
            assert!(store.face(f).unwrap().normal().dot(&outward) > 0.0);
        }
    }
}
