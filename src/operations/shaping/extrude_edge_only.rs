use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::topology::{EdgeId, FaceId, MeshStore, VertexId};

/// New geometry created by [`ExtrudeEdgeOnly`].
#[derive(Debug, Clone, Default)]
pub struct ExtrudedEdges {
    /// Duplicated vertices, in order of first appearance in the input edges.
    pub verts: Vec<VertexId>,
    /// Duplicated edges, one per input edge, in input order.
    pub edges: Vec<EdgeId>,
    /// Side quads joining each input edge to its duplicate, in input order.
    pub faces: Vec<FaceId>,
}

/// Extrudes edges without moving them: every vertex is duplicated in place,
/// every edge gets a parallel duplicate and a quad joining the two.
///
/// The original edges stay attached to their faces. A side quad traverses
/// its original edge opposite to the face already using it, so it winds
/// consistently with that face.
pub struct ExtrudeEdgeOnly {
    edges: Vec<EdgeId>,
}

impl ExtrudeEdgeOnly {
    /// Creates a new `ExtrudeEdgeOnly` operation.
    #[must_use]
    pub fn new(edges: Vec<EdgeId>) -> Self {
        Self { edges }
    }

    /// Executes the extrusion.
    ///
    /// # Errors
    ///
    /// Returns an error if an input edge is not found (before any mutation).
    pub fn execute(&self, store: &mut MeshStore) -> Result<ExtrudedEdges> {
        let mut edges = Vec::with_capacity(self.edges.len());
        let mut seen = BTreeSet::new();
        let mut originals = Vec::new();
        for &e in &self.edges {
            let verts = store.edge(e)?.verts();
            if seen.insert(e) {
                edges.push(e);
                for v in verts {
                    if !originals.contains(&v) {
                        originals.push(v);
                    }
                }
            }
        }

        let mut out = ExtrudedEdges::default();
        let mut duplicate: BTreeMap<VertexId, VertexId> = BTreeMap::new();
        for &v in &originals {
            let point = store.point(v)?;
            let copy = store.add_vertex(point);
            duplicate.insert(v, copy);
            out.verts.push(copy);
        }

        for e in edges {
            let [a, b] = store.edge(e)?.verts();
            let (a2, b2) = (duplicate[&a], duplicate[&b]);
            let runs_forward = match store.edge(e)?.loops().first() {
                Some(&l) => store.loop_data(l)?.vert() == a,
                None => false,
            };
            let quad = if runs_forward {
                [b, a, a2, b2]
            } else {
                [a, b, b2, a2]
            };
            out.faces.push(store.add_face(&quad)?);
            out.edges.push(store.ensure_edge(a2, b2)?);
        }
        Ok(out)
    }
}
