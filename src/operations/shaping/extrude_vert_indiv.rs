use crate::error::Result;
use crate::topology::{EdgeId, MeshStore, VertexId};

/// New geometry created by [`ExtrudeVertIndiv`].
#[derive(Debug, Clone, Default)]
pub struct ExtrudedVerts {
    /// One new vertex per input vertex, in input order.
    pub verts: Vec<VertexId>,
    /// The edge joining each input vertex to its new vertex, in input order.
    pub edges: Vec<EdgeId>,
}

/// Extrudes vertices individually: each gets a coincident new vertex
/// connected to it by a new edge.
pub struct ExtrudeVertIndiv {
    verts: Vec<VertexId>,
}

impl ExtrudeVertIndiv {
    /// Creates a new `ExtrudeVertIndiv` operation.
    #[must_use]
    pub fn new(verts: Vec<VertexId>) -> Self {
        Self { verts }
    }

    /// Executes the extrusion.
    ///
    /// # Errors
    ///
    /// Returns an error if an input vertex is not found (before any mutation).
    pub fn execute(&self, store: &mut MeshStore) -> Result<ExtrudedVerts> {
        let points = self
            .verts
            .iter()
            .map(|&v| store.point(v))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut out = ExtrudedVerts::default();
        for (&v, point) in self.verts.iter().zip(points) {
            let new = store.add_vertex(point);
            out.edges.push(store.add_edge(v, new)?);
            out.verts.push(new);
        }
        Ok(out)
    }
}
