use std::collections::{BTreeMap, BTreeSet};

use crate::error::{OperationError, Result};
use crate::topology::{EdgeId, FaceId, MeshStore, VertexId};

/// Fills every closed loop of the given edges with one n-gon.
///
/// Each new face traverses its first edge opposite to the face already
/// using that edge (if any), so it winds consistently with its neighbour.
pub struct EdgeloopFill {
    edges: Vec<EdgeId>,
}

impl EdgeloopFill {
    /// Creates a new `EdgeloopFill` operation.
    #[must_use]
    pub fn new(edges: Vec<EdgeId>) -> Self {
        Self { edges }
    }

    /// Executes the fill, returning one face per loop in input order.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::Failed`] if the edges do not form disjoint
    /// closed loops (some vertex has other than two of the edges), before
    /// creating any face.
    pub fn execute(&self, store: &mut MeshStore) -> Result<Vec<FaceId>> {
        let mut edges = Vec::with_capacity(self.edges.len());
        let mut seen = BTreeSet::new();
        for &e in &self.edges {
            if seen.insert(e) {
                edges.push(e);
            }
        }

        let mut incident: BTreeMap<VertexId, Vec<EdgeId>> = BTreeMap::new();
        for &e in &edges {
            for v in store.edge(e)?.verts() {
                incident.entry(v).or_default().push(e);
            }
        }
        if incident.values().any(|es| es.len() != 2) {
            return Err(OperationError::Failed(
                "edge loop fill needs closed, non-branching loops".into(),
            )
            .into());
        }

        let mut cycles = Vec::new();
        let mut visited = BTreeSet::new();
        for &first in &edges {
            if !visited.insert(first) {
                continue;
            }
            let [a, b] = store.edge(first)?.verts();
            let against_existing = match store.edge(first)?.loops().first() {
                Some(&l) => store.loop_data(l)?.vert() == a,
                None => false,
            };
            let (start, mut current) = if against_existing { (b, a) } else { (a, b) };

            let mut verts = vec![start];
            let mut prev_edge = first;
            while current != start {
                if verts.len() > edges.len() {
                    return Err(OperationError::Failed("edge loop does not close".into()).into());
                }
                verts.push(current);
                let next_edge = incident[&current]
                    .iter()
                    .copied()
                    .find(|&e| e != prev_edge)
                    .ok_or_else(|| OperationError::Failed("edge loop does not close".into()))?;
                visited.insert(next_edge);
                current = store.other_vertex(next_edge, current)?;
                prev_edge = next_edge;
            }
            cycles.push(verts);
        }

        let mut faces = Vec::with_capacity(cycles.len());
        for verts in cycles {
            faces.push(store.add_face(&verts)?);
        }
        Ok(faces)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::{Point3, Vector3};
    use crate::operations::creation::MakeWire;

    fn square(store: &mut MeshStore, offset: f64) -> Vec<EdgeId> {
        MakeWire::new(
            vec![
                Point3::new(offset, 0.0, 0.0),
                Point3::new(offset + 1.0, 0.0, 0.0),
                Point3::new(offset + 1.0, 1.0, 0.0),
                Point3::new(offset, 1.0, 0.0),
            ],
            true,
        )
        .execute(store)
        .unwrap()
        .edges
    }

    #[test]
    fn fills_each_loop() {
        let mut store = MeshStore::new();
        let mut edges = square(&mut store, 0.0);
        edges.extend(square(&mut store, 3.0));

        let faces = EdgeloopFill::new(edges).execute(&mut store).unwrap();
        assert_eq!(faces.len(), 2);
        for face in faces {
            assert_eq!(store.face(face).unwrap().len(), 4);
            assert_relative_eq!(store.face(face).unwrap().normal(), Vector3::z());
        }
    }

    #[test]
    fn winds_against_existing_face() {
        let mut store = MeshStore::new();
        let edges = square(&mut store, 0.0);
        let first = EdgeloopFill::new(edges.clone()).execute(&mut store).unwrap()[0];
        let second = EdgeloopFill::new(edges).execute(&mut store).unwrap()[0];

        let n1 = store.face(first).unwrap().normal();
        let n2 = store.face(second).unwrap().normal();
        assert_relative_eq!(n1, -n2);
    }

    #[test]
    fn open_chain_is_rejected_without_mutation() {
        let mut store = MeshStore::new();
        let wire = MakeWire::new(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0)],
            false,
        )
        .execute(&mut store)
        .unwrap();

        assert!(EdgeloopFill::new(wire.edges).execute(&mut store).is_err());
        assert_eq!(store.face_count(), 0);
    }
}
