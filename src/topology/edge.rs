use super::loops::LoopId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the mesh store.
    pub struct EdgeId;
}

/// Data associated with a mesh edge.
///
/// An edge joins exactly two distinct vertices. Every face using the edge
/// contributes one loop to the edge's radial list.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub(crate) verts: [VertexId; 2],
    /// Selection flag.
    pub select: bool,
    /// Hidden edges are ignored by surface queries.
    pub hide: bool,
    pub(crate) loops: Vec<LoopId>,
}

impl EdgeData {
    pub(crate) fn new(a: VertexId, b: VertexId) -> Self {
        Self {
            verts: [a, b],
            select: false,
            hide: false,
            loops: Vec::new(),
        }
    }

    /// The two endpoint vertices.
    #[must_use]
    pub fn verts(&self) -> [VertexId; 2] {
        self.verts
    }

    /// Face corners using this edge, in radial order.
    #[must_use]
    pub fn loops(&self) -> &[LoopId] {
        &self.loops
    }

    /// Returns `true` if `vertex` is one of the endpoints.
    #[must_use]
    pub fn has_vertex(&self, vertex: VertexId) -> bool {
        self.verts.contains(&vertex)
    }
}
