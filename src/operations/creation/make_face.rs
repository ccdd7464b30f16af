use crate::error::Result;
use crate::topology::{FaceId, MeshStore, VertexId};

/// Creates a face over existing vertices, adding any missing boundary edges.
pub struct MakeFace {
    verts: Vec<VertexId>,
}

impl MakeFace {
    /// Creates a new `MakeFace` operation.
    #[must_use]
    pub fn new(verts: Vec<VertexId>) -> Self {
        Self { verts }
    }

    /// Executes the operation, creating the face in the mesh store.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than three distinct vertices are given or a
    /// vertex is not found.
    pub fn execute(&self, store: &mut MeshStore) -> Result<FaceId> {
        Ok(store.add_face(&self.verts)?)
    }
}
