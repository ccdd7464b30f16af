use super::edge::EdgeId;
use super::face::FaceId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a face corner (loop) in the mesh store.
    pub struct LoopId;
}

/// A face corner: binds a vertex, the edge leaving it inside the face, and
/// the face itself.
///
/// `next` / `prev` walk the face boundary; the edge runs from `vert` to the
/// vertex of `next`.
#[derive(Debug, Clone, Copy)]
pub struct LoopData {
    pub(crate) vert: VertexId,
    pub(crate) edge: EdgeId,
    pub(crate) face: FaceId,
    pub(crate) next: LoopId,
    pub(crate) prev: LoopId,
}

impl LoopData {
    /// Vertex at this corner.
    #[must_use]
    pub fn vert(&self) -> VertexId {
        self.vert
    }

    /// Edge from this corner's vertex to the next corner's vertex.
    #[must_use]
    pub fn edge(&self) -> EdgeId {
        self.edge
    }

    /// Owning face.
    #[must_use]
    pub fn face(&self) -> FaceId {
        self.face
    }

    /// Next corner in the face cycle.
    #[must_use]
    pub fn next(&self) -> LoopId {
        self.next
    }

    /// Previous corner in the face cycle.
    #[must_use]
    pub fn prev(&self) -> LoopId {
        self.prev
    }
}
