use crate::error::{OperationError, Result};
use crate::math::Point3;
use crate::topology::{EdgeId, MeshStore, VertexId};

/// Vertices and edges produced by [`MakeWire`].
#[derive(Debug, Clone)]
pub struct Wire {
    /// New vertices in point order.
    pub verts: Vec<VertexId>,
    /// New edges; edge `i` joins vertex `i` and `i + 1` (wrapping when closed).
    pub edges: Vec<EdgeId>,
}

/// Creates a chain of loose edges from a sequence of 3D points.
pub struct MakeWire {
    points: Vec<Point3>,
    close: bool,
}

impl MakeWire {
    /// Creates a new `MakeWire` operation.
    #[must_use]
    pub fn new(points: Vec<Point3>, close: bool) -> Self {
        Self { points, close }
    }

    /// Executes the operation, creating the wire in the mesh store.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if fewer than two points are
    /// given, or fewer than three for a closed wire.
    pub fn execute(&self, store: &mut MeshStore) -> Result<Wire> {
        let min = if self.close { 3 } else { 2 };
        if self.points.len() < min {
            return Err(OperationError::InvalidInput(format!(
                "a wire needs at least {min} points"
            ))
            .into());
        }

        let verts: Vec<VertexId> = self.points.iter().map(|&p| store.add_vertex(p)).collect();
        let n = verts.len();
        let count = if self.close { n } else { n - 1 };
        let mut edges = Vec::with_capacity(count);
        for i in 0..count {
            edges.push(store.add_edge(verts[i], verts[(i + 1) % n])?);
        }
        Ok(Wire { verts, edges })
    }
}
