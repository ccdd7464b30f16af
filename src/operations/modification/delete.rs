use std::collections::BTreeSet;

use crate::error::Result;
use crate::topology::{EdgeId, FaceId, MeshStore, VertexId};

/// How far a deletion reaches beyond the named elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteContext {
    /// Remove the named elements and whatever would dangle without them
    /// (faces of a removed edge, edges of a removed vertex).
    #[default]
    Only,
    /// Like [`Only`](Self::Only), and additionally remove vertices the
    /// deletion left without any edge.
    Cascade,
}

/// Deletes a set of vertices, edges and faces.
///
/// Elements that are already gone (for instance removed as a consequence of
/// deleting another named element) are skipped.
#[derive(Debug, Clone, Default)]
pub struct Delete {
    verts: Vec<VertexId>,
    edges: Vec<EdgeId>,
    faces: Vec<FaceId>,
    context: DeleteContext,
}

impl Delete {
    /// Creates an empty `Delete` operation with the given context.
    #[must_use]
    pub fn new(context: DeleteContext) -> Self {
        Self {
            context,
            ..Self::default()
        }
    }

    /// Adds vertices to delete.
    #[must_use]
    pub fn verts(mut self, verts: impl IntoIterator<Item = VertexId>) -> Self {
        self.verts.extend(verts);
        self
    }

    /// Adds edges to delete.
    #[must_use]
    pub fn edges(mut self, edges: impl IntoIterator<Item = EdgeId>) -> Self {
        self.edges.extend(edges);
        self
    }

    /// Adds faces to delete.
    #[must_use]
    pub fn faces(mut self, faces: impl IntoIterator<Item = FaceId>) -> Self {
        self.faces.extend(faces);
        self
    }

    /// Executes the deletion.
    ///
    /// # Errors
    ///
    /// Returns an error if the store's adjacency is inconsistent.
    pub fn execute(&self, store: &mut MeshStore) -> Result<()> {
        let mut candidates = BTreeSet::new();
        if self.context == DeleteContext::Cascade {
            for &e in self.edges.iter().filter(|&&e| store.contains_edge(e)) {
                candidates.extend(store.edge(e)?.verts());
            }
            for &v in self.verts.iter().filter(|&&v| store.contains_vertex(v)) {
                for e in store.vertex_edges(v)? {
                    candidates.insert(store.other_vertex(e, v)?);
                }
            }
        }

        for &f in &self.faces {
            if store.contains_face(f) {
                store.remove_face(f)?;
            }
        }
        for &e in &self.edges {
            if store.contains_edge(e) {
                store.remove_edge(e)?;
            }
        }
        for &v in &self.verts {
            if store.contains_vertex(v) {
                store.remove_vertex(v)?;
            }
        }

        for v in candidates {
            if store.contains_vertex(v) && store.vertex(v)?.edges().is_empty() {
                store.remove_vertex(v)?;
            }
        }
        Ok(())
    }
}
